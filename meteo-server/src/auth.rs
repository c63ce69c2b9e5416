//! Roles, password hashing and bearer-token handling.

use actix_web::error::ErrorUnauthorized;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::state::AppState;
use crate::store::UserRecord;

/// The full set of user roles, declared once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Lowest level, basic access.
    SimpleUser,
    /// Mid-level, elevated privileges (may manage favorites).
    SuperUser,
    /// Highest level, owner privileges.
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SimpleUser => "SimpleUser",
            Role::SuperUser => "SuperUser",
            Role::Administrator => "Administrator",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "SimpleUser" => Some(Role::SimpleUser),
            "SuperUser" => Some(Role::SuperUser),
            "Administrator" => Some(Role::Administrator),
            _ => None,
        }
    }

    /// SuperUser and Administrator may mutate favorites and mint SuperUsers.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::SuperUser | Role::Administrator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// User email.
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique token id.
    pub jti: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn roles(&self) -> Vec<Role> {
        self.roles.iter().filter_map(|r| Role::parse(r)).collect()
    }

    pub fn has_elevated_role(&self) -> bool {
        self.roles().iter().any(Role::is_elevated)
    }
}

/// HS256 signing/verification keys plus the validation rules
/// (issuer, audience, lifetime, signature).
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    validity: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&cfg.issuer]);
        validation.set_audience(&[&cfg.audience]);

        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            validity: Duration::hours(cfg.token_hours),
        }
    }

    /// Issue a token for a user; returns the token and its expiry instant.
    pub fn issue(&self, user: &UserRecord, roles: &[Role]) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires = now + self.validity;

        let claims = Claims {
            sub: user.id.clone(),
            name: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            jti: Uuid::new_v4().to_string(),
            roles: roles.iter().map(|r| r.as_str().to_owned()).collect(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .context("Failed to sign the bearer token")?;
        Ok((token, expires))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .context("Bearer token rejected")?;
        Ok(data.claims)
    }
}

/// Authenticated principal, extracted from the `Authorization: Bearer` header.
///
/// Use `Option<AuthUser>` on endpoints open to anonymous callers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_claims(req).map(AuthUser))
    }
}

fn extract_claims(req: &HttpRequest) -> Result<Claims, actix_web::Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ErrorUnauthorized("unauthorised"))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("missing bearer token"))?;

    state
        .jwt
        .verify(token)
        .map_err(|_| ErrorUnauthorized("invalid bearer token"))
}

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash the password")
}

/// Constant-time-ish verification; a malformed stored hash counts as a miss.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
