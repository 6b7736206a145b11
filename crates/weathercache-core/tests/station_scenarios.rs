//! End-to-end scenarios against a mocked OpenWeatherMap endpoint.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use futures::FutureExt;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use weathercache_core::config::ProviderConfig;
use weathercache_core::models::format_time_of_day;
use weathercache_core::notify::RecordingNotifier;
use weathercache_core::provider::OwmClient;
use weathercache_core::scheduler::Job;
use weathercache_core::{Freshness, PersistenceStore, Scheduler, TickOutcome, WeatherStation};

const WEATHER_PATH: &str = "/data/2.5/weather";

fn provider_payload() -> Value {
    json!({
        "coord": { "lon": 8.68, "lat": 50.11 },
        "weather": [{ "id": 800, "main": "Clear" }],
        "main": { "temp": 21.5, "humidity": 40, "pressure": 1012 },
        "sys": { "sunrise": 1500000000, "sunset": 1500030000 },
        "name": "Frankfurt"
    })
}

fn station_for(
    server: &MockServer,
    dir: &std::path::Path,
    notifier: Arc<RecordingNotifier>,
) -> Arc<WeatherStation> {
    let config = ProviderConfig {
        base_url: format!("{}{}", server.uri(), WEATHER_PATH),
        latitude: 50.11,
        longitude: 8.68,
        api_key: "test-key".to_string(),
        request_timeout_secs: 5,
    };
    Arc::new(WeatherStation::new(
        OwmClient::new(&config).unwrap(),
        PersistenceStore::new(dir),
        notifier,
    ))
}

#[tokio::test]
async fn test_fetch_populates_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_payload()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let station = station_for(&server, dir.path(), Arc::new(RecordingNotifier::new()));
    station.refresh().await.unwrap();

    let view = station.snapshot().view();
    assert_eq!(view.temperature, 21.5);
    assert_eq!(view.humidity, 40.0);
    assert!(view.last_fetched.is_some());
    assert_eq!(
        view.sunrise,
        format_time_of_day(Local.timestamp_opt(1500000000, 0).unwrap().time())
    );
    assert_eq!(
        view.sunset,
        format_time_of_day(Local.timestamp_opt(1500030000, 0).unwrap().time())
    );
    assert_eq!(station.freshness(), Freshness::Fresh);

    // The raw payload is persisted verbatim.
    let persisted = station.store().load().unwrap().unwrap();
    assert_eq!(persisted, provider_payload());
}

#[tokio::test]
async fn test_failed_fetch_preserves_previous_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_payload()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let station = station_for(&server, dir.path(), notifier.clone());

    station.update().await;
    let before = station.snapshot();
    let persisted_before = station.store().load().unwrap();

    station.update().await;
    assert_eq!(station.snapshot(), before);
    assert_eq!(station.store().load().unwrap(), persisted_before);

    let warnings = notifier.notifications();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("503"));
}

#[tokio::test]
async fn test_malformed_response_is_rejected_as_a_whole() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": { "temp": 30.0, "humidity": 10 },
            "sys": { "sunrise": 1500000000 }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let station = station_for(&server, dir.path(), notifier.clone());

    station.update().await;
    assert_eq!(station.snapshot().temperature, 0.0);
    assert_eq!(station.freshness(), Freshness::Uninitialized);
    assert!(station.store().load().unwrap().is_none());
    assert_eq!(notifier.notifications().len(), 1);
}

#[tokio::test]
async fn test_restart_restores_stale_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_payload()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let first = station_for(&server, dir.path(), Arc::new(RecordingNotifier::new()));
    let fetched = first.refresh().await.unwrap();

    let restarted = station_for(&server, dir.path(), Arc::new(RecordingNotifier::new()));
    assert_eq!(restarted.freshness(), Freshness::Uninitialized);
    assert_eq!(restarted.restore().await.unwrap(), Freshness::PersistedStale);

    let restored = restarted.snapshot();
    assert!((restored.temperature - fetched.temperature).abs() < 1e-9);
    assert!((restored.humidity - fetched.humidity).abs() < 1e-9);
    assert_eq!(restored.sunrise, fetched.sunrise);
    assert_eq!(restored.sunset, fetched.sunset);
    assert!(restored.last_fetched.is_none());

    restarted.refresh().await.unwrap();
    assert_eq!(restarted.freshness(), Freshness::Fresh);
}

#[tokio::test]
async fn test_tick_during_in_flight_fetch_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_payload())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let station = station_for(&server, dir.path(), Arc::new(RecordingNotifier::new()));
    let scheduler = Scheduler::new(Duration::from_secs(150));

    let first_station = station.clone();
    let first = scheduler.try_tick(move || async move { first_station.update().await });

    let second_station = station.clone();
    let second = scheduler.try_tick(move || async move { second_station.update().await });
    assert!(second.is_skipped());
    assert_eq!(station.freshness(), Freshness::Uninitialized);

    match first {
        TickOutcome::Started(handle) => handle.await.unwrap(),
        TickOutcome::Skipped => panic!("first tick should start"),
    }
    assert_eq!(station.freshness(), Freshness::Fresh);
    server.verify().await;
}

#[tokio::test]
async fn test_scheduler_drives_periodic_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_payload()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let station = station_for(&server, dir.path(), Arc::new(RecordingNotifier::new()));
    let mut snapshots = station.subscribe();

    let job_station = station.clone();
    let job: Job = Arc::new(move || {
        let station = job_station.clone();
        async move { station.update().await }.boxed()
    });
    let handle = Scheduler::new(Duration::from_millis(50)).spawn(job);

    tokio::time::timeout(Duration::from_secs(5), snapshots.changed())
        .await
        .expect("scheduler never published a snapshot")
        .unwrap();
    handle.abort();

    assert_eq!(station.snapshot().temperature, 21.5);
    assert!(server.received_requests().await.unwrap().len() >= 1);
}
