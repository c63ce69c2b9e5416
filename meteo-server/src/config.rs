use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{env, fs, path::Path};

/// Top-level configuration, loaded from a TOML file.
///
/// Secrets (JWT signing key, admin bootstrap credentials) can be supplied or
/// overridden through `METEO_JWT_SECRET`, `METEO_ADMIN_EMAIL` and
/// `METEO_ADMIN_PASSWORD` so they stay out of the config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:8080".to_owned() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://meteo.db".to_owned() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint.
    pub search_url: String,
    /// Daily forecast endpoint.
    pub forecast_url: String,
    /// Days of forecast requested upstream.
    pub forecast_day_limit: u32,
    /// Maximum favorite cities per user.
    pub favorite_limit: i64,
    /// IANA timezone passed to the forecast provider; "auto" lets the
    /// provider resolve it from the coordinates.
    pub timezone: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            search_url: "https://geocoding-api.open-meteo.com/v1/search".to_owned(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_owned(),
            forecast_day_limit: 5,
            favorite_limit: 5,
            timezone: "auto".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Token validity window in hours.
    pub token_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "meteo-server".to_owned(),
            audience: "meteo-clients".to_owned(),
            token_hours: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    /// Load config from disk, apply environment overrides, validate.
    ///
    /// A missing file is not an error: defaults plus environment variables
    /// are enough for a development run.
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = env::var("METEO_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Ok(email) = env::var("METEO_ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Ok(password) = env::var("METEO_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.jwt.secret.is_empty() {
            bail!(
                "JWT secret is not configured.\n\
                 Hint: set [jwt].secret in the config file or the METEO_JWT_SECRET variable."
            );
        }
        if self.admin.email.is_empty() || self.admin.password.is_empty() {
            bail!(
                "Admin email or password not configured.\n\
                 Hint: set [admin] in the config file or METEO_ADMIN_EMAIL / METEO_ADMIN_PASSWORD."
            );
        }
        Ok(())
    }
}
