//! Typed decoding of OpenWeatherMap "current weather" payloads.
//!
//! Only the fields the station needs are decoded. A payload missing any of
//! them is rejected as a whole; nothing is applied partially.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ProviderError;

#[derive(Debug, Deserialize)]
struct OwmResponse {
    sys: OwmSys,
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

/// Values extracted from one provider payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

impl Reading {
    /// Decode a raw provider payload.
    pub fn from_payload(payload: &Value) -> Result<Self, ProviderError> {
        let response = OwmResponse::deserialize(payload)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if !response.main.temp.is_finite() || !response.main.humidity.is_finite() {
            return Err(ProviderError::Parse(
                "temperature and humidity must be finite numbers".to_string(),
            ));
        }

        Ok(Self {
            temperature: response.main.temp,
            humidity: response.main.humidity,
            sunrise: epoch_to_local(response.sys.sunrise)?.time(),
            sunset: epoch_to_local(response.sys.sunset)?.time(),
        })
    }

    /// Build a payload in provider format carrying this reading.
    ///
    /// Sunrise and sunset are anchored to `date` in local time so that loading
    /// the payload back yields the same time-of-day values. Sub-second
    /// precision is not kept.
    pub fn to_payload(&self, date: NaiveDate) -> Value {
        json!({
            "sys": {
                "sunrise": local_epoch(date, self.sunrise),
                "sunset": local_epoch(date, self.sunset),
            },
            "main": {
                "temp": self.temperature,
                "humidity": self.humidity,
            },
        })
    }
}

/// Convert Unix epoch seconds (UTC) to a local date-time.
pub fn epoch_to_local(seconds: i64) -> Result<DateTime<Local>, ProviderError> {
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or(ProviderError::InvalidTimestamp(seconds))
}

fn local_epoch(date: NaiveDate, time: NaiveTime) -> i64 {
    // A time inside a DST gap does not exist on `date`; the neighbouring days
    // are never transition days, so anchor it there instead.
    [Some(date), date.pred_opt(), date.succ_opt()]
        .into_iter()
        .flatten()
        .find_map(|day| Local.from_local_datetime(&day.and_time(time)).earliest())
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| date.and_time(time).and_utc().timestamp())
}
