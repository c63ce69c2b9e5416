use crate::model::{ForecastResponse, GeoCity, GeoLocation, ServiceResult};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod forecast;
pub mod geocoding;

pub use forecast::OpenMeteoForecast;
pub use geocoding::OpenMeteoGeocoding;

/// Upstream calls that run longer than this are a `TemporaryFailure`, not a
/// hung request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Free-text city search against the external geocoding provider.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    /// Returns the matching cities in upstream order, or a typed error.
    /// Never fails with anything outside the [`crate::ServiceError`] taxonomy.
    async fn search(&self, city_name: &str) -> ServiceResult<Vec<GeoCity>>;
}

/// Multi-day forecast lookup by coordinates.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn get_forecast(
        &self,
        location: GeoLocation,
        day_limit: u32,
        timezone: &str,
    ) -> ServiceResult<ForecastResponse>;
}

/// Best-effort single-field country-code lookup.
///
/// Deliberately simpler than the other adapters: callers treat the result as
/// optional enrichment, so there is no error taxonomy and no retry.
#[async_trait]
pub trait CountryCodeProvider: Send + Sync + Debug {
    async fn iso_code(&self, city_name: &str) -> Option<String>;
}

/// Shared HTTP client for provider adapters, with a bounded timeout.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}
