use std::sync::Arc;

use anyhow::Result;
use meteo_core::provider::{
    CountryCodeProvider, ForecastProvider, OpenMeteoForecast, OpenMeteoGeocoding, SearchProvider,
};
use sqlx::SqlitePool;

use crate::auth::JwtKeys;
use crate::config::{AppConfig, WeatherConfig};

/// Shared per-process state handed to every handler.
///
/// Providers are trait objects so tests can swap in stubs.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub search: Arc<dyn SearchProvider>,
    pub forecast: Arc<dyn ForecastProvider>,
    pub country: Arc<dyn CountryCodeProvider>,
    pub weather: WeatherConfig,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Wire the real Open-Meteo adapters from config.
    pub fn from_config(config: &AppConfig, pool: SqlitePool) -> Result<Self> {
        let geocoding = Arc::new(OpenMeteoGeocoding::new(config.weather.search_url.clone())?);
        let forecast = Arc::new(OpenMeteoForecast::new(config.weather.forecast_url.clone())?);

        Ok(Self {
            pool,
            search: geocoding.clone(),
            forecast,
            country: geocoding,
            weather: config.weather.clone(),
            jwt: JwtKeys::new(&config.jwt),
        })
    }
}
