//! Registration and login endpoints.

use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::error;
use uuid::Uuid;

use crate::auth::{self, AuthUser, Role};
use crate::state::AppState;
use crate::store::{self, UserRecord};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    role_assigned: &'static str,
    message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    expiration: DateTime<Utc>,
    role: Option<String>,
    first_name: String,
    last_name: String,
}

type FieldErrors = BTreeMap<&'static str, Vec<String>>;

fn validate(req: &RegisterRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if req.first_name.trim().is_empty() {
        errors.entry("firstName").or_default().push("Please provide first name".to_owned());
    }
    if req.last_name.trim().is_empty() {
        errors.entry("lastName").or_default().push("Please provide last name".to_owned());
    }
    if req.email.trim().is_empty() {
        errors.entry("email").or_default().push("Please provide user email".to_owned());
    } else if !req.email.contains('@') {
        errors.entry("email").or_default().push("Email address is not valid".to_owned());
    }
    if req.password.is_empty() {
        errors.entry("password").or_default().push("Please provide user password".to_owned());
    } else if req.password.len() < MIN_PASSWORD_LEN {
        errors.entry("password").or_default().push(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }

    errors
}

fn validation_problem(errors: FieldErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "title": "Registration failed",
        "status": 400,
        "errors": errors,
    }))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "message": "An unexpected error occurred." }))
}

#[post("/api/Auth/Register")]
pub async fn register(
    state: web::Data<AppState>,
    caller: Option<AuthUser>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse {
    let mut errors = validate(&body);

    if errors.is_empty() {
        match store::find_user_by_email(&state.pool, &body.email).await {
            Ok(Some(_)) => {
                errors.entry("email").or_default().push("Email is already registered".to_owned());
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "registration lookup failed");
                return internal_error();
            }
        }
    }
    if !errors.is_empty() {
        return validation_problem(errors);
    }

    // Default assignment is always the lowest role; only a caller whose own
    // claims already carry an elevating role may mint another SuperUser.
    // Anything else is silently downgraded.
    let mut assigned = Role::SimpleUser;
    if let Some(AuthUser(claims)) = &caller {
        if body.role.as_deref() == Some(Role::SuperUser.as_str()) && claims.has_elevated_role() {
            assigned = Role::SuperUser;
        }
    }

    let password_hash = match auth::hash_password(&body.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "password hashing failed");
            return internal_error();
        }
    };

    let user = UserRecord {
        id: Uuid::new_v4().to_string(),
        email: body.email.clone(),
        password_hash,
        first_name: body.first_name.clone(),
        last_name: body.last_name.clone(),
    };

    let stored = async {
        store::insert_user(&state.pool, &user).await?;
        store::grant_role(&state.pool, &user.id, assigned).await
    }
    .await;
    if let Err(e) = stored {
        error!(error = %e, "storing the new user failed");
        return internal_error();
    }

    HttpResponse::Ok().json(RegisterResponse {
        role_assigned: assigned.as_str(),
        message: "User registered successfully",
    })
}

#[post("/api/Auth/Login")]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> HttpResponse {
    let user = match store::find_user_by_email(&state.pool, &body.email).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "login lookup failed");
            return internal_error();
        }
    };

    let Some(user) = user else {
        return HttpResponse::Unauthorized().finish();
    };
    if !auth::verify_password(&body.password, &user.password_hash) {
        return HttpResponse::Unauthorized().finish();
    }

    let roles = match store::user_roles(&state.pool, &user.id).await {
        Ok(roles) => roles,
        Err(e) => {
            error!(error = %e, "role lookup failed");
            return internal_error();
        }
    };

    match state.jwt.issue(&user, &roles) {
        Ok((token, expiration)) => HttpResponse::Ok().json(LoginResponse {
            token,
            expiration,
            role: roles.first().map(|r| r.as_str().to_owned()),
            first_name: user.first_name,
            last_name: user.last_name,
        }),
        Err(e) => {
            error!(error = %e, "token signing failed");
            internal_error()
        }
    }
}
