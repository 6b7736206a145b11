//! The weather station cache.
//!
//! `WeatherStation` owns the temperature and humidity sensor values, the
//! sunrise/sunset times and the freshness stamp. All three update paths
//! (scheduled fetch, startup restore, manual override) go through one lock
//! that covers "persist, update values, stamp freshness, publish snapshot",
//! so readers of [`WeatherStation::snapshot`] never see a torn state.
//!
//! The outbound request itself runs outside the lock; only its result is
//! applied under it.

pub mod error;

pub use error::StationError;

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{parse_time_of_day, Daylight, Freshness, OverrideRequest, Snapshot};
use crate::notify::Notifier;
use crate::provider::{OwmClient, Reading};
use crate::sensor::{SensorValue, ValueChange};
use crate::store::PersistenceStore;

/// Source name used for published warnings.
pub const NOTIFICATION_SOURCE: &str = "WeatherStation";

#[derive(Debug)]
struct StationState {
    temperature: SensorValue,
    humidity: SensorValue,
}

pub struct WeatherStation {
    provider: OwmClient,
    store: PersistenceStore,
    notifier: Arc<dyn Notifier>,
    state: Mutex<StationState>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl WeatherStation {
    pub fn new(provider: OwmClient, store: PersistenceStore, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::default());
        Self {
            provider,
            store,
            notifier,
            state: Mutex::new(StationState {
                temperature: SensorValue::default(),
                humidity: SensorValue::default(),
            }),
            snapshot_tx,
        }
    }

    /// Replace the change thresholds. Only meaningful before any update.
    pub fn with_thresholds(mut self, temperature: f64, humidity: f64) -> Self {
        let state = self.state.get_mut();
        state.temperature = SensorValue::new(temperature);
        state.humidity = SensorValue::new(humidity);
        self
    }

    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> anyhow::Result<Self> {
        let provider = OwmClient::new(&config.provider)?;
        let store = PersistenceStore::new(config.data_dir()?);
        Ok(Self::new(provider, store, notifier)
            .with_thresholds(config.temperature_threshold, config.humidity_threshold))
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        *self.snapshot_tx.borrow()
    }

    /// Watch every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn freshness(&self) -> Freshness {
        self.snapshot().freshness
    }

    pub fn daylight(&self) -> Daylight {
        self.snapshot().daylight()
    }

    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    pub async fn on_temperature_change<F>(&self, callback: F)
    where
        F: Fn(ValueChange) + Send + Sync + 'static,
    {
        self.state.lock().await.temperature.subscribe(callback);
    }

    pub async fn on_humidity_change<F>(&self, callback: F)
    where
        F: Fn(ValueChange) + Send + Sync + 'static,
    {
        self.state.lock().await.humidity.subscribe(callback);
    }

    /// Seed the station from the persisted payload.
    ///
    /// Applies the values without stamping `last_fetched`. Failures are
    /// published as warnings and returned; the station is left untouched.
    pub async fn restore(&self) -> Result<Freshness, StationError> {
        let payload = match self.store.load() {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(self.freshness()),
            Err(e) => {
                self.warn(&format!("Could not load persisted weather values. {:#}", e));
                return Err(e.into());
            }
        };

        let reading = match Reading::from_payload(&payload) {
            Ok(reading) => reading,
            Err(e) => {
                self.warn(&format!("Persisted weather values are invalid. {}", e));
                return Err(e.into());
            }
        };

        let mut state = self.state.lock().await;
        if self.freshness() == Freshness::Fresh {
            debug!("Station already fresh, ignoring persisted values");
            return Ok(Freshness::Fresh);
        }

        let snapshot = self.apply(&mut state, &reading, None);
        info!(
            temperature = snapshot.temperature,
            humidity = snapshot.humidity,
            "Restored persisted weather values"
        );
        Ok(snapshot.freshness)
    }

    /// Fetch from the provider, persist the payload and apply it.
    pub async fn refresh(&self) -> Result<Snapshot, StationError> {
        let fetched = self.provider.fetch().await?;

        let mut state = self.state.lock().await;
        self.store.save(&fetched.raw)?;
        let snapshot = self.apply(&mut state, &fetched.reading, Some(Local::now()));

        info!(
            temperature = snapshot.temperature,
            humidity = snapshot.humidity,
            "Fetched weather data"
        );
        Ok(snapshot)
    }

    /// Scheduled update: refresh and report any failure as a warning.
    pub async fn update(&self) {
        if let Err(e) = self.refresh().await {
            self.warn(&format!("Could not fetch weather information. {:#}", e));
        }
    }

    /// Apply a manual override as if it had been fetched.
    pub async fn apply_override(&self, request: &OverrideRequest) -> Result<Snapshot, StationError> {
        let reading = Self::validate_override(request)?;
        let now = Local::now();
        let payload = reading.to_payload(now.date_naive());

        let mut state = self.state.lock().await;
        self.store.save(&payload)?;
        let snapshot = self.apply(&mut state, &reading, Some(now));

        info!(
            temperature = snapshot.temperature,
            humidity = snapshot.humidity,
            "Applied manual weather override"
        );
        Ok(snapshot)
    }

    fn validate_override(request: &OverrideRequest) -> Result<Reading, StationError> {
        if !request.temperature.is_finite() {
            return Err(StationError::InvalidOverride(
                "temperature must be a finite number".to_string(),
            ));
        }
        if !request.humidity.is_finite() {
            return Err(StationError::InvalidOverride(
                "humidity must be a finite number".to_string(),
            ));
        }
        let sunrise = parse_time_of_day(&request.sunrise).ok_or_else(|| {
            StationError::InvalidOverride(format!("invalid sunrise: {:?}", request.sunrise))
        })?;
        let sunset = parse_time_of_day(&request.sunset).ok_or_else(|| {
            StationError::InvalidOverride(format!("invalid sunset: {:?}", request.sunset))
        })?;

        Ok(Reading {
            temperature: request.temperature,
            humidity: request.humidity,
            sunrise,
            sunset,
        })
    }

    /// Update sensor values and publish a new snapshot. Caller holds the lock.
    fn apply(
        &self,
        state: &mut StationState,
        reading: &Reading,
        fetched_at: Option<DateTime<Local>>,
    ) -> Snapshot {
        state.temperature.update_value(reading.temperature);
        state.humidity.update_value(reading.humidity);

        let previous = self.snapshot();
        let freshness = if fetched_at.is_some() {
            Freshness::Fresh
        } else {
            Freshness::PersistedStale
        };

        let snapshot = Snapshot {
            temperature: state.temperature.value(),
            humidity: state.humidity.value(),
            sunrise: reading.sunrise,
            sunset: reading.sunset,
            last_fetched: fetched_at.or(previous.last_fetched),
            freshness: freshness.max(previous.freshness),
        };
        self.snapshot_tx.send_replace(snapshot);
        snapshot
    }

    fn warn(&self, message: &str) {
        self.notifier.publish_warning(NOTIFICATION_SOURCE, message);
    }
}
