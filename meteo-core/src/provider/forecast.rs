use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};

use crate::model::{ForecastDay, ForecastResponse, GeoLocation, ServiceError, ServiceResult};

use super::{ForecastProvider, http_client};

/// Adapter over the Open-Meteo forecast API.
///
/// The provider returns same-length parallel arrays keyed by day index;
/// this adapter zips them positionally into one record per day.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    base_url: String,
}

impl OpenMeteoForecast {
    pub fn new(base_url: String) -> Result<Self> {
        Self::with_timeout(base_url, super::REQUEST_TIMEOUT)
    }

    /// Same adapter with an explicit request timeout.
    pub fn with_timeout(base_url: String, timeout: std::time::Duration) -> Result<Self> {
        let http = http_client(timeout).context("Failed to build forecast HTTP client")?;
        Ok(Self { http, base_url })
    }

    async fn fetch_daily(
        &self,
        location: GeoLocation,
        day_limit: u32,
        timezone: &str,
    ) -> Result<Fetched> {
        // Float `Display` in Rust is locale-invariant, so the coordinates
        // can never pick up a `,` decimal separator. The timezone value is
        // percent-encoded by reqwest ("Asia/Singapore" -> "Asia%2FSingapore").
        let query = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min,rain_sum".to_owned(),
            ),
            ("timezone", timezone.to_owned()),
            ("forecast_days", day_limit.to_string()),
            ("format", "json".to_owned()),
            ("timeformat", "unixtime".to_owned()),
        ];

        let res = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .context("Failed to send request to the forecast provider")?;

        let status = res.status();
        if !status.is_success() {
            return Ok(Fetched::UpstreamStatus(status));
        }

        let payload: ForecastPayload = res
            .json()
            .await
            .context("Failed to parse forecast response as JSON")?;

        Ok(Fetched::Daily(payload.daily))
    }
}

enum Fetched {
    Daily(DailyBlock),
    UpstreamStatus(reqwest::StatusCode),
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<i64>,
    #[serde(rename = "temperature_2m_max")]
    max_temps: Vec<f64>,
    #[serde(rename = "temperature_2m_min")]
    min_temps: Vec<f64>,
    #[serde(rename = "weather_code")]
    codes: Vec<i32>,
    #[serde(rename = "rain_sum")]
    rain_sums: Vec<f64>,
}

#[async_trait]
impl ForecastProvider for OpenMeteoForecast {
    async fn get_forecast(
        &self,
        location: GeoLocation,
        day_limit: u32,
        timezone: &str,
    ) -> ServiceResult<ForecastResponse> {
        let daily = match self.fetch_daily(location, day_limit, timezone).await {
            Ok(Fetched::Daily(daily)) => daily,
            Ok(Fetched::UpstreamStatus(status)) => {
                warn!(
                    %status,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "forecast provider returned non-success status"
                );
                return Err(ServiceError::TemporaryFailure);
            }
            Err(error) => {
                error!(
                    error = %error,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "forecast fetch failed"
                );
                return Err(ServiceError::TemporaryFailure);
            }
        };

        if daily.time.is_empty() {
            return Err(ServiceError::NotFound);
        }

        match zip_days(&daily) {
            Ok(mut days) => {
                // The provider is asked for `day_limit` days; if it sends
                // more anyway, the surplus is dropped rather than served.
                days.truncate(day_limit as usize);
                Ok(ForecastResponse { days })
            }
            Err(error) => {
                error!(
                    error = %error,
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "forecast payload arrays are inconsistent"
                );
                Err(ServiceError::TemporaryFailure)
            }
        }
    }
}

/// Zips the parallel daily arrays into one record per day.
///
/// Iteration is capped at the `time` array length; any other array running
/// short means the payload is misaligned and the whole response is a fault.
/// Truncating instead would pair values with the wrong days.
fn zip_days(daily: &DailyBlock) -> Result<Vec<ForecastDay>> {
    let len = daily.time.len();
    for (name, actual) in [
        ("temperature_2m_max", daily.max_temps.len()),
        ("temperature_2m_min", daily.min_temps.len()),
        ("weather_code", daily.codes.len()),
        ("rain_sum", daily.rain_sums.len()),
    ] {
        if actual < len {
            return Err(anyhow!(
                "daily array '{name}' has {actual} entries, expected {len}"
            ));
        }
    }

    let mut days = Vec::with_capacity(len);
    for i in 0..len {
        days.push(ForecastDay {
            date: unix_to_utc(daily.time[i])
                .ok_or_else(|| anyhow!("timestamp {} is out of range", daily.time[i]))?,
            max_temp: daily.max_temps[i],
            min_temp: daily.min_temps[i],
            weather_code: daily.codes[i],
            rain_sum: daily.rain_sums[i],
        });
    }
    Ok(days)
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
