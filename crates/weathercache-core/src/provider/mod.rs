//! Weather provider module.
//!
//! This module provides the `OwmClient` for fetching current conditions from
//! OpenWeatherMap and the typed decoding of its responses into a `Reading`.
//!
//! The request is parameterized by latitude, longitude and API key. Only
//! `sys.sunrise`, `sys.sunset`, `main.temp` and `main.humidity` are used.

pub mod client;
pub mod error;
pub mod payload;

pub use client::{FetchedPayload, OwmClient};
pub use error::ProviderError;
pub use payload::{epoch_to_local, Reading};
