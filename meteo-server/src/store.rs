//! SQLite-backed store for users, roles, cached cities and favorites.
//!
//! Schema is created idempotently at startup. The `(user_id, city_id)`
//! uniqueness of favorites is a real constraint, not just an existence
//! check before insert.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::auth::Role;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_roles (
    user_id TEXT NOT NULL REFERENCES users(id),
    role    TEXT NOT NULL,
    UNIQUE (user_id, role)
);

CREATE TABLE IF NOT EXISTS geo_cities (
    city_id      INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    latitude     REAL NOT NULL,
    longitude    REAL NOT NULL,
    country      TEXT NOT NULL,
    state        TEXT,
    country_code TEXT
);

CREATE TABLE IF NOT EXISTS favorite_cities (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES users(id),
    city_id INTEGER NOT NULL REFERENCES geo_cities(city_id),
    UNIQUE (user_id, city_id)
);
"#;

/// Open (creating if needed) the database and ensure the schema exists.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL: {url}"))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to open the database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests and throwaway runs.
///
/// Capped at one connection: every pooled connection to `:memory:` would
/// otherwise see its own empty database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open the in-memory database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .context("Failed to create the database schema")?;
    Ok(())
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<UserRecord>> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT id, email, password_hash, first_name, last_name FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn insert_user(pool: &SqlitePool, user: &UserRecord) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .execute(pool)
    .await?;
    Ok(())
}

/// Grant a role, ignoring a re-grant of one the user already holds.
pub async fn grant_role(pool: &SqlitePool, user_id: &str, role: Role) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn user_roles(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<Role>> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    // Rows written by this process always parse; anything else is skipped.
    Ok(names.iter().filter_map(|name| Role::parse(name)).collect())
}
