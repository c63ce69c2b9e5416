//! Favorites manager: per-user favorite cities with a cardinality cap.
//!
//! Mutations run inside one transaction so the limit check, the city upsert,
//! the duplicate check and the insert are atomic under concurrent
//! double-submission from the same user. The `(user_id, city_id)` UNIQUE
//! constraint backstops the duplicate check.

use meteo_core::GeoCity;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::error;

use crate::auth::Role;

/// Failure modes of the favorites operations.
///
/// A distinct taxonomy from the provider adapters': these failures are
/// authorization and business-rule driven, not network driven.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoriteError {
    #[error("Only Super Users can modify favorites.")]
    Forbidden,
    #[error("You have reached the limit of {0} favorite cities.")]
    LimitExceeded(i64),
    #[error("City \"{0}\" already in favorites.")]
    DuplicateFavorite(String),
    #[error("Favorite not found.")]
    NotFound,
    #[error("An unexpected error occurred.")]
    Internal,
}

fn internal(context: &'static str, error: sqlx::Error) -> FavoriteError {
    // Full detail stays server-side; the client sees a generic failure.
    error!(error = %error, context, "favorites store operation failed");
    FavoriteError::Internal
}

/// Favorite cities of a user, joined with the cached city records. Unordered.
pub async fn list(pool: &SqlitePool, user_id: &str) -> Result<Vec<GeoCity>, FavoriteError> {
    #[derive(sqlx::FromRow)]
    struct CityRow {
        city_id: i64,
        name: String,
        latitude: f64,
        longitude: f64,
        country: String,
        state: Option<String>,
        country_code: Option<String>,
    }

    let rows = sqlx::query_as::<_, CityRow>(
        "SELECT c.city_id, c.name, c.latitude, c.longitude, c.country, c.state, c.country_code
         FROM favorite_cities f
         JOIN geo_cities c ON c.city_id = f.city_id
         WHERE f.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| internal("list favorites", e))?;

    Ok(rows
        .into_iter()
        .map(|row| GeoCity {
            city_id: row.city_id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            country: row.country,
            state: row.state,
            country_code: row.country_code,
        })
        .collect())
}

/// Add a favorite, registering the city locally if it is not yet known.
pub async fn add(
    pool: &SqlitePool,
    user_id: &str,
    roles: &[Role],
    limit: i64,
    city: &GeoCity,
) -> Result<(), FavoriteError> {
    if !roles.iter().any(Role::is_elevated) {
        return Err(FavoriteError::Forbidden);
    }

    let mut tx = pool.begin().await.map_err(|e| internal("begin add favorite", e))?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM favorite_cities WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| internal("count favorites", e))?;
    if count >= limit {
        return Err(FavoriteError::LimitExceeded(limit));
    }

    // A favorite must never reference an unknown city.
    sqlx::query(
        "INSERT INTO geo_cities (city_id, name, latitude, longitude, country, state, country_code)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (city_id) DO NOTHING",
    )
    .bind(city.city_id)
    .bind(&city.name)
    .bind(city.latitude)
    .bind(city.longitude)
    .bind(&city.country)
    .bind(&city.state)
    .bind(&city.country_code)
    .execute(&mut *tx)
    .await
    .map_err(|e| internal("upsert city", e))?;

    let insert = sqlx::query("INSERT INTO favorite_cities (user_id, city_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(city.city_id)
        .execute(&mut *tx)
        .await;

    match insert {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(FavoriteError::DuplicateFavorite(city.name.clone()));
        }
        Err(e) => return Err(internal("insert favorite", e)),
    }

    tx.commit().await.map_err(|e| internal("commit add favorite", e))?;
    Ok(())
}

/// Remove a favorite by city id.
pub async fn remove(
    pool: &SqlitePool,
    user_id: &str,
    roles: &[Role],
    city_id: i64,
) -> Result<(), FavoriteError> {
    if !roles.iter().any(Role::is_elevated) {
        return Err(FavoriteError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM favorite_cities WHERE user_id = ? AND city_id = ?")
        .bind(user_id)
        .bind(city_id)
        .execute(pool)
        .await
        .map_err(|e| internal("delete favorite", e))?;

    if result.rows_affected() == 0 {
        return Err(FavoriteError::NotFound);
    }
    Ok(())
}
