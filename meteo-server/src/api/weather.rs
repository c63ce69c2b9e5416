//! Forecast, city search and country-code endpoints.

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use meteo_core::model::{ForecastResponse, GeoCity, GeoLocation, ServiceError, ServiceResult};
use meteo_core::codes;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// One forecast day as served to clients, with the weather code already
/// resolved to its human text and icon.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastDayDto {
    date: DateTime<Utc>,
    max_temp: f64,
    min_temp: f64,
    weather_code: i32,
    rain_sum: f64,
    summary: &'static str,
    icon: &'static str,
}

#[derive(Debug, Serialize)]
struct ForecastDto {
    days: Vec<ForecastDayDto>,
}

impl From<ForecastResponse> for ForecastDto {
    fn from(response: ForecastResponse) -> Self {
        let days = response
            .days
            .into_iter()
            .map(|day| ForecastDayDto {
                date: day.date,
                max_temp: day.max_temp,
                min_temp: day.min_temp,
                weather_code: day.weather_code,
                rain_sum: day.rain_sum,
                summary: codes::summary(day.weather_code),
                icon: codes::icon(day.weather_code),
            })
            .collect();
        Self { days }
    }
}

#[get("/api/Weather/Forecast")]
pub async fn forecast(
    state: web::Data<AppState>,
    query: web::Query<ForecastQuery>,
) -> HttpResponse {
    let location = GeoLocation { latitude: query.latitude, longitude: query.longitude };

    let result = state
        .forecast
        .get_forecast(location, state.weather.forecast_day_limit, &state.weather.timezone)
        .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(ForecastDto::from(response)),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(json!({
            "message": "We could not find any weather report for the given location."
        })),
        Err(ServiceError::TemporaryFailure) => HttpResponse::ServiceUnavailable().json(json!({
            "message": "We could not fetch the weather report at the moment. Please try again later."
        })),
        Err(ServiceError::Unknown) => HttpResponse::InternalServerError().json(json!({
            "message": "An unexpected error occurred."
        })),
    }
}

fn city_search_response(city_name: &str, result: ServiceResult<Vec<GeoCity>>) -> HttpResponse {
    match result {
        Ok(cities) => HttpResponse::Ok().json(cities),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(json!({
            "message": format!("No cities found matching '{city_name}'.")
        })),
        Err(ServiceError::TemporaryFailure) => HttpResponse::ServiceUnavailable().json(json!({
            "message": "We could not fetch city information at the moment. Please try again later."
        })),
        Err(ServiceError::Unknown) => HttpResponse::InternalServerError().json(json!({
            "message": "An unexpected error occurred."
        })),
    }
}

#[get("/api/Weather/SearchCity/{cityName}")]
pub async fn search_city(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let city_name = path.into_inner();
    city_search_response(&city_name, state.search.search(&city_name).await)
}

/// Same search under a dedicated path; clients read `countryCode` off the
/// returned entries.
#[get("/api/Weather/SearchCountryCode/{cityName}")]
pub async fn search_country_code(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let city_name = path.into_inner();
    city_search_response(&city_name, state.search.search(&city_name).await)
}

/// Best-effort ISO code lookup; a miss is a 200 with `null`.
#[get("/ISOCountrycode/{city}")]
pub async fn iso_country_code(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let city = path.into_inner();
    HttpResponse::Ok().json(state.country.iso_code(&city).await)
}
