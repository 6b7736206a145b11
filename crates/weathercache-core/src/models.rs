//! Data models for the weather station cache.
//!
//! - `Snapshot`: the immutable bundle of current readings published to readers
//! - `Freshness`: where the current readings came from
//! - `Daylight`: sunrise/sunset pair
//! - `SnapshotView`, `OverrideRequest`: HTTP API representations

use chrono::{DateTime, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Format used to render time-of-day values.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Where the cached readings came from.
///
/// Only ever moves toward `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Freshness {
    /// Nothing persisted and nothing fetched yet.
    Uninitialized,
    /// Restored from disk after a restart, never confirmed by the provider.
    PersistedStale,
    /// Set by a successful fetch or a manual override.
    Fresh,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub last_fetched: Option<DateTime<Local>>,
    pub freshness: Freshness,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            sunrise: NaiveTime::MIN,
            sunset: NaiveTime::MIN,
            last_fetched: None,
            freshness: Freshness::Uninitialized,
        }
    }
}

impl Snapshot {
    pub fn daylight(&self) -> Daylight {
        Daylight::new(self.sunrise, self.sunset)
    }

    pub fn view(&self) -> SnapshotView {
        SnapshotView::from(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Daylight {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

impl Daylight {
    pub fn new(sunrise: NaiveTime, sunset: NaiveTime) -> Self {
        Self { sunrise, sunset }
    }

    /// Whether `time` lies between sunrise (inclusive) and sunset (exclusive).
    ///
    /// Handles a sunset that falls before sunrise on the clock, which happens
    /// when local time is far from the provider's location.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.sunrise <= self.sunset {
            time >= self.sunrise && time < self.sunset
        } else {
            time >= self.sunrise || time < self.sunset
        }
    }
}

/// JSON shape returned by `GET /weatherStation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    pub temperature: f64,
    pub humidity: f64,
    pub last_fetched: Option<DateTime<Local>>,
    pub sunrise: String,
    pub sunset: String,
}

impl From<&Snapshot> for SnapshotView {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            last_fetched: snapshot.last_fetched,
            sunrise: format_time_of_day(snapshot.sunrise),
            sunset: format_time_of_day(snapshot.sunset),
        }
    }
}

/// JSON body accepted by `POST /weatherStation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub sunrise: String,
    pub sunset: String,
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_OF_DAY_FORMAT).to_string()
}

/// Parse `HH:MM:SS`, `HH:MM:SS.fff` or `HH:MM`.
///
/// Fractional seconds are accepted but truncated; persisted payloads only
/// carry whole seconds.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
        .and_then(|time| time.with_nanosecond(0))
}
