//! Favorite-city endpoints.
//!
//! Read is open to any authenticated user; add and remove require an
//! elevated role, enforced by the favorites manager.

use actix_web::{HttpResponse, delete, get, post, web};
use meteo_core::GeoCity;
use serde_json::json;

use crate::auth::AuthUser;
use crate::favorites::{self, FavoriteError};
use crate::state::AppState;

fn error_response(error: &FavoriteError) -> HttpResponse {
    let body = json!({ "message": error.to_string() });
    match error {
        FavoriteError::Forbidden => HttpResponse::Forbidden().json(body),
        FavoriteError::LimitExceeded(_) | FavoriteError::DuplicateFavorite(_) => {
            HttpResponse::BadRequest().json(body)
        }
        FavoriteError::NotFound => HttpResponse::NotFound().json(body),
        FavoriteError::Internal => HttpResponse::InternalServerError().json(body),
    }
}

#[get("/api/Favorites")]
pub async fn list_favorites(state: web::Data<AppState>, user: AuthUser) -> HttpResponse {
    match favorites::list(&state.pool, &user.0.sub).await {
        Ok(cities) => HttpResponse::Ok().json(cities),
        Err(error) => error_response(&error),
    }
}

#[post("/api/Favorites")]
pub async fn add_favorite(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<GeoCity>,
) -> HttpResponse {
    if !body.is_valid() {
        return HttpResponse::BadRequest().json(json!({
            "message": "City id must be positive and coordinates within range."
        }));
    }

    let result = favorites::add(
        &state.pool,
        &user.0.sub,
        &user.0.roles(),
        state.weather.favorite_limit,
        &body,
    )
    .await;

    match result {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(error) => error_response(&error),
    }
}

#[delete("/api/Favorites/{cityId}")]
pub async fn remove_favorite(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<i64>,
) -> HttpResponse {
    let city_id = path.into_inner();

    match favorites::remove(&state.pool, &user.0.sub, &user.0.roles(), city_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(error) => error_response(&error),
    }
}
