//! Core library for the meteo service.
//!
//! This crate defines:
//! - Shared domain models (cities, forecast days, the service result envelope)
//! - Adapters over the external geocoding and forecast providers
//! - The static weather-code lookup tables
//!
//! It is used by `meteo-server`, but can also be reused by other binaries or
//! services.

pub mod codes;
pub mod model;
pub mod provider;

pub use model::{ForecastDay, ForecastResponse, GeoCity, GeoLocation, ServiceError, ServiceResult};
pub use provider::{
    CountryCodeProvider, ForecastProvider, OpenMeteoForecast, OpenMeteoGeocoding, SearchProvider,
};
