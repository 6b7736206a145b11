//! Core library for weathercache.
//!
//! Polls OpenWeatherMap on a fixed schedule, keeps the latest temperature,
//! humidity and sunrise/sunset times in memory, persists the last good payload
//! for restarts and serves everything over a small HTTP API.
//!
//! - [`sensor`]: hysteresis-gated sensor values with change subscribers
//! - [`store`]: the persisted payload file
//! - [`provider`]: OpenWeatherMap client and payload decoding
//! - [`scheduler`]: fixed-interval, non-reentrant ticks
//! - [`station`]: the cache itself, tying the above together
//! - [`http`]: `GET`/`POST /weatherStation`
//! - [`config`], [`notify`], [`models`]: configuration, warning sink, data types

pub mod config;
pub mod http;
pub mod models;
pub mod notify;
pub mod provider;
pub mod scheduler;
pub mod sensor;
pub mod station;
pub mod store;

pub use config::Config;
pub use models::{Daylight, Freshness, OverrideRequest, Snapshot, SnapshotView};
pub use notify::{Notifier, TracingNotifier};
pub use scheduler::{Scheduler, TickOutcome};
pub use sensor::{SensorValue, ValueChange};
pub use station::{StationError, WeatherStation};
pub use store::PersistenceStore;
