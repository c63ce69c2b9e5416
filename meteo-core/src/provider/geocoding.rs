use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::model::{GeoCity, ServiceError, ServiceResult};

use super::{CountryCodeProvider, SearchProvider, http_client};

/// Adapter over the Open-Meteo geocoding API.
///
/// Serves both the free-text city search and the best-effort ISO country
/// code lookup. The upstream payload is treated as loose JSON: the shape
/// varies per record, so mandatory fields are checked per entry and
/// everything else is optional.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoding {
    http: Client,
    base_url: String,
}

impl OpenMeteoGeocoding {
    pub fn new(base_url: String) -> Result<Self> {
        Self::with_timeout(base_url, super::REQUEST_TIMEOUT)
    }

    /// Same adapter with an explicit request timeout.
    pub fn with_timeout(base_url: String, timeout: std::time::Duration) -> Result<Self> {
        let http = http_client(timeout).context("Failed to build geocoding HTTP client")?;
        Ok(Self { http, base_url })
    }

    async fn fetch_payload(&self, city_name: &str, count: Option<u32>) -> Result<Fetched> {
        let mut query: Vec<(&str, String)> = vec![
            ("name", city_name.to_owned()),
            ("language", "en".to_owned()),
            ("format", "json".to_owned()),
        ];
        if let Some(count) = count {
            query.push(("count", count.to_string()));
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .context("Failed to send request to the geocoding provider")?;

        let status = res.status();
        if !status.is_success() {
            return Ok(Fetched::UpstreamStatus(status));
        }

        let payload: Value = res
            .json()
            .await
            .context("Failed to parse geocoding response as JSON")?;

        Ok(Fetched::Payload(payload))
    }
}

enum Fetched {
    Payload(Value),
    UpstreamStatus(StatusCode),
}

#[async_trait]
impl SearchProvider for OpenMeteoGeocoding {
    async fn search(&self, city_name: &str) -> ServiceResult<Vec<GeoCity>> {
        let payload = match self.fetch_payload(city_name, None).await {
            Ok(Fetched::Payload(payload)) => payload,
            Ok(Fetched::UpstreamStatus(status)) => {
                warn!(%status, city_name, "geocoding provider returned non-success status");
                return Err(ServiceError::TemporaryFailure);
            }
            Err(error) => {
                // Network error, timeout or malformed body; details stay
                // server-side, the caller only sees the taxonomy.
                error!(error = %error, city_name, "city search failed");
                return Err(ServiceError::TemporaryFailure);
            }
        };

        let Some(results) = payload.get("results").and_then(Value::as_array) else {
            return Err(ServiceError::NotFound);
        };

        // Entries missing a mandatory field are skipped silently: partial
        // upstream garbage must not fail the whole request.
        let cities: Vec<GeoCity> = results.iter().filter_map(parse_city).collect();

        if cities.is_empty() {
            Err(ServiceError::NotFound)
        } else {
            Ok(cities)
        }
    }
}

#[async_trait]
impl CountryCodeProvider for OpenMeteoGeocoding {
    async fn iso_code(&self, city_name: &str) -> Option<String> {
        let payload = match self.fetch_payload(city_name, Some(1)).await {
            Ok(Fetched::Payload(payload)) => payload,
            Ok(Fetched::UpstreamStatus(status)) => {
                debug!(%status, city_name, "country code lookup got non-success status");
                return None;
            }
            Err(error) => {
                debug!(error = %error, city_name, "country code lookup failed");
                return None;
            }
        };

        payload
            .get("results")?
            .as_array()?
            .first()?
            .get("country_code")?
            .as_str()
            .map(str::to_owned)
    }
}

/// Maps one upstream search entry to a [`GeoCity`].
///
/// `id`, `latitude` and `longitude` are mandatory; `None` means the entry is
/// dropped. The remaining fields fall back to empty/absent.
fn parse_city(entry: &Value) -> Option<GeoCity> {
    let city_id = entry.get("id")?.as_i64()?;
    let latitude = entry.get("latitude")?.as_f64()?;
    let longitude = entry.get("longitude")?.as_f64()?;

    Some(GeoCity {
        city_id,
        name: text(entry, "name").unwrap_or_default(),
        latitude,
        longitude,
        country: text(entry, "country").unwrap_or_default(),
        state: text(entry, "admin1"),
        country_code: text(entry, "country_code"),
    })
}

fn text(entry: &Value, key: &str) -> Option<String> {
    entry.get(key)?.as_str().map(str::to_owned)
}
