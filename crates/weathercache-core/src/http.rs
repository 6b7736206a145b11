//! HTTP API for the weather station.
//!
//! - `GET /weatherStation`: current snapshot
//! - `POST /weatherStation`: manual override of all values

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::models::{OverrideRequest, SnapshotView};
use crate::station::{StationError, WeatherStation};

pub const WEATHER_STATION_PATH: &str = "/weatherStation";

pub fn router(station: Arc<WeatherStation>) -> Router {
    Router::new()
        .route(
            WEATHER_STATION_PATH,
            get(get_weather_station).post(post_weather_station),
        )
        .with_state(station)
}

async fn get_weather_station(State(station): State<Arc<WeatherStation>>) -> Json<SnapshotView> {
    debug!("Weather station snapshot requested");
    Json(station.snapshot().view())
}

async fn post_weather_station(
    State(station): State<Arc<WeatherStation>>,
    body: Result<Json<OverrideRequest>, JsonRejection>,
) -> Result<StatusCode, StationError> {
    let Json(request) =
        body.map_err(|rejection| StationError::InvalidOverride(rejection.body_text()))?;

    station.apply_override(&request).await?;
    Ok(StatusCode::NO_CONTENT)
}

impl IntoResponse for StationError {
    fn into_response(self) -> Response {
        let status = match &self {
            StationError::InvalidOverride(_) => StatusCode::BAD_REQUEST,
            StationError::Provider(_) => StatusCode::BAD_GATEWAY,
            StationError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            let detail = format!("{:#}", self);
            error!(error = %detail, "Weather station request failed");
        } else {
            warn!(error = %self, "Rejected weather station request");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
