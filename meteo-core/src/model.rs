use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of every outward-facing service call.
///
/// `Ok(data)` carries the payload; `Err` carries one of the small set of
/// failure kinds the API layer knows how to turn into a status code.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure taxonomy shared by all provider adapters.
///
/// Network errors, timeouts and malformed payloads all collapse into
/// [`ServiceError::TemporaryFailure`]: from the caller's point of view they
/// are equally retryable. Adapters never let an underlying error escape this
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The upstream provider had no matching data.
    #[error("no matching data found upstream")]
    NotFound,
    /// Transient upstream failure: non-2xx response, network error, timeout
    /// or a payload that could not be parsed.
    #[error("temporary failure talking to the upstream provider")]
    TemporaryFailure,
    /// Anything that does not fit the taxonomy. Maps to HTTP 500.
    #[error("unexpected service error")]
    Unknown,
}

/// A city record as assigned by the external geocoding provider.
///
/// `city_id` is the provider's identifier, not ours; it is the primary key
/// when the city is cached locally for favorites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoCity {
    pub city_id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub state: Option<String>,
    pub country_code: Option<String>,
}

impl GeoCity {
    /// Basic sanity check on an externally supplied record.
    pub fn is_valid(&self) -> bool {
        self.city_id > 0
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A coordinate pair for forecast lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of forecast data, zipped out of the provider's parallel arrays.
/// Produced fresh per request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: DateTime<Utc>,
    pub max_temp: f64,
    pub min_temp: f64,
    pub weather_code: i32,
    pub rain_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub days: Vec<ForecastDay>,
}
