//! API surface tests: every endpoint against an in-memory database and
//! stubbed providers, so only this crate's behavior is under test.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use meteo_core::model::{
    ForecastDay, ForecastResponse, GeoCity, GeoLocation, ServiceError, ServiceResult,
};
use meteo_core::provider::{CountryCodeProvider, ForecastProvider, SearchProvider};
use meteo_server::auth::{JwtKeys, Role};
use meteo_server::config::{JwtConfig, WeatherConfig};
use meteo_server::state::AppState;
use meteo_server::store::{self, UserRecord};
use meteo_server::{api, auth, bootstrap};

#[derive(Debug)]
struct StubSearch(ServiceResult<Vec<GeoCity>>);

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, _city_name: &str) -> ServiceResult<Vec<GeoCity>> {
        self.0.clone()
    }
}

#[derive(Debug)]
struct StubForecast(ServiceResult<ForecastResponse>);

#[async_trait]
impl ForecastProvider for StubForecast {
    async fn get_forecast(
        &self,
        _location: GeoLocation,
        _day_limit: u32,
        _timezone: &str,
    ) -> ServiceResult<ForecastResponse> {
        self.0.clone()
    }
}

#[derive(Debug)]
struct StubCountry(Option<String>);

#[async_trait]
impl CountryCodeProvider for StubCountry {
    async fn iso_code(&self, _city_name: &str) -> Option<String> {
        self.0.clone()
    }
}

fn sample_city(city_id: i64, name: &str) -> GeoCity {
    GeoCity {
        city_id,
        name: name.to_owned(),
        latitude: 48.85,
        longitude: 2.35,
        country: "France".to_owned(),
        state: Some("Ile-de-France".to_owned()),
        country_code: Some("FR".to_owned()),
    }
}

fn sample_forecast() -> ForecastResponse {
    ForecastResponse {
        days: vec![ForecastDay {
            date: chrono::DateTime::from_timestamp(1_700_000_000, 0).expect("in range"),
            max_temp: 11.2,
            min_temp: 4.1,
            weather_code: 95,
            rain_sum: 0.4,
        }],
    }
}

struct StateBuilder {
    search: StubSearch,
    forecast: StubForecast,
    country: StubCountry,
    favorite_limit: i64,
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self {
            search: StubSearch(Ok(vec![sample_city(1, "Paris")])),
            forecast: StubForecast(Ok(sample_forecast())),
            country: StubCountry(Some("FR".to_owned())),
            favorite_limit: 5,
        }
    }
}

impl StateBuilder {
    async fn build(self) -> web::Data<AppState> {
        let pool = store::connect_in_memory().await.expect("in-memory db");
        let weather =
            WeatherConfig { favorite_limit: self.favorite_limit, ..WeatherConfig::default() };

        web::Data::new(AppState {
            pool,
            search: Arc::new(self.search),
            forecast: Arc::new(self.forecast),
            country: Arc::new(self.country),
            weather,
            jwt: JwtKeys::new(&JwtConfig {
                secret: "integration-test-secret".to_owned(),
                ..JwtConfig::default()
            }),
        })
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(api::configure)).await
    };
}

/// Create a user directly in the store and return a bearer token for them.
async fn login_as(state: &web::Data<AppState>, email: &str, roles: &[Role]) -> String {
    let user = UserRecord {
        id: format!("id-{email}"),
        email: email.to_owned(),
        password_hash: auth::hash_password("password1").expect("hash"),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
    };
    store::insert_user(&state.pool, &user).await.expect("insert user");
    for role in roles {
        store::grant_role(&state.pool, &user.id, *role).await.expect("grant role");
    }

    let (token, _) = state.jwt.issue(&user, roles).expect("token");
    token
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

// --- auth ---------------------------------------------------------------

#[actix_web::test]
async fn register_defaults_to_simple_user() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .set_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "hunter2!",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["roleAssigned"], "SimpleUser");
    assert_eq!(body["message"], "User registered successfully");
}

#[actix_web::test]
async fn register_validation_errors_are_field_keyed() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .set_json(json!({ "firstName": "", "lastName": "Tester", "email": "bad", "password": "x" }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["title"], "Registration failed");
    assert!(body["errors"]["firstName"].is_array());
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
    assert!(body["errors"]["lastName"].is_null());
}

#[actix_web::test]
async fn registering_the_same_email_twice_fails() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let payload = json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "password": "hunter2!",
    });

    let first = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .set_json(payload.clone())
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

    let second = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, second).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"]["email"][0].as_str().expect("message").contains("already registered"));
}

#[actix_web::test]
async fn anonymous_super_user_request_is_silently_downgraded() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .set_json(json!({
            "firstName": "Mallory",
            "lastName": "Intruder",
            "email": "mallory@example.com",
            "password": "hunter2!",
            "role": "SuperUser",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["roleAssigned"], "SimpleUser");
}

#[actix_web::test]
async fn simple_user_cannot_mint_a_super_user() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    let token = login_as(&state, "plain@example.com", &[Role::SimpleUser]).await;

    let req = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .insert_header(bearer(&token))
        .set_json(json!({
            "firstName": "Friend",
            "lastName": "OfPlain",
            "email": "friend@example.com",
            "password": "hunter2!",
            "role": "SuperUser",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["roleAssigned"], "SimpleUser");
}

#[actix_web::test]
async fn elevated_caller_may_mint_a_super_user() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    let token = login_as(&state, "root@example.com", &[Role::Administrator]).await;

    let req = test::TestRequest::post()
        .uri("/api/Auth/Register")
        .insert_header(bearer(&token))
        .set_json(json!({
            "firstName": "Super",
            "lastName": "Visor",
            "email": "super@example.com",
            "password": "hunter2!",
            "role": "SuperUser",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["roleAssigned"], "SuperUser");
}

#[actix_web::test]
async fn login_round_trip_issues_a_working_token() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    bootstrap::ensure_admin(
        &state.pool,
        &meteo_server::config::AdminConfig {
            email: "admin@example.com".to_owned(),
            password: "top-secret".to_owned(),
        },
    )
    .await
    .expect("seeded");

    let req = test::TestRequest::post()
        .uri("/api/Auth/Login")
        .set_json(json!({ "email": "admin@example.com", "password": "top-secret" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["role"], "Administrator");
    assert_eq!(body["firstName"], "Admin");
    let token = body["token"].as_str().expect("token").to_owned();

    let req = test::TestRequest::get()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    login_as(&state, "ada@example.com", &[Role::SimpleUser]).await;

    let wrong_password = test::TestRequest::post()
        .uri("/api/Auth/Login")
        .set_json(json!({ "email": "ada@example.com", "password": "wrong" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, wrong_password).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let unknown_user = test::TestRequest::post()
        .uri("/api/Auth/Login")
        .set_json(json!({ "email": "nobody@example.com", "password": "wrong" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, unknown_user).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

// --- weather ------------------------------------------------------------

#[actix_web::test]
async fn forecast_days_carry_summary_and_icon() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/Weather/Forecast?latitude=48.85&longitude=2.35")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["days"].as_array().expect("days").len(), 1);
    assert_eq!(body["days"][0]["weatherCode"], 95);
    assert_eq!(body["days"][0]["summary"], "Thunderstorm");
    assert_eq!(body["days"][0]["date"], "2023-11-14T22:13:20Z");
}

#[actix_web::test]
async fn forecast_error_kinds_map_to_statuses() {
    for (error, status) in [
        (ServiceError::NotFound, StatusCode::NOT_FOUND),
        (ServiceError::TemporaryFailure, StatusCode::SERVICE_UNAVAILABLE),
        (ServiceError::Unknown, StatusCode::INTERNAL_SERVER_ERROR),
    ] {
        let state = StateBuilder {
            forecast: StubForecast(Err(error)),
            ..StateBuilder::default()
        }
        .build()
        .await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/Weather/Forecast?latitude=0&longitude=0")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), status);
    }
}

#[actix_web::test]
async fn search_city_returns_the_provider_hits() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/Weather/SearchCity/Paris").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body[0]["cityId"], 1);
    assert_eq!(body[0]["name"], "Paris");
}

#[actix_web::test]
async fn search_city_error_kinds_map_to_statuses() {
    for (error, status) in [
        (ServiceError::NotFound, StatusCode::NOT_FOUND),
        (ServiceError::TemporaryFailure, StatusCode::SERVICE_UNAVAILABLE),
    ] {
        let state = StateBuilder {
            search: StubSearch(Err(error)),
            ..StateBuilder::default()
        }
        .build()
        .await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/Weather/SearchCity/Nowhere").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), status);

        let req = test::TestRequest::get()
            .uri("/api/Weather/SearchCountryCode/Nowhere")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), status);
    }
}

#[actix_web::test]
async fn iso_country_code_is_best_effort() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/ISOCountrycode/Paris").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!("FR"));

    let state = StateBuilder { country: StubCountry(None), ..StateBuilder::default() }
        .build()
        .await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/ISOCountrycode/Atlantis").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body.is_null());
}

// --- favorites ----------------------------------------------------------

#[actix_web::test]
async fn favorites_require_a_bearer_token() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);

    for req in [
        test::TestRequest::get().uri("/api/Favorites").to_request(),
        test::TestRequest::post()
            .uri("/api/Favorites")
            .set_json(sample_city(1, "Paris"))
            .to_request(),
        test::TestRequest::delete().uri("/api/Favorites/1").to_request(),
    ] {
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn simple_user_may_list_but_not_mutate() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    let token = login_as(&state, "plain@example.com", &[Role::SimpleUser]).await;

    let req = test::TestRequest::get()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .set_json(sample_city(1, "Paris"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri("/api/Favorites/1")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn super_user_add_list_remove_cycle() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    let token = login_as(&state, "super@example.com", &[Role::SuperUser]).await;

    let req = test::TestRequest::post()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .set_json(sample_city(10, "Paris"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().expect("list").len(), 1);
    assert_eq!(body[0]["cityId"], 10);
    assert_eq!(body[0]["countryCode"], "FR");

    let req = test::TestRequest::delete()
        .uri("/api/Favorites/10")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri("/api/Favorites/10")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn duplicate_and_limit_violations_are_bad_requests() {
    let state = StateBuilder { favorite_limit: 2, ..StateBuilder::default() }.build().await;
    let app = app!(state);
    let token = login_as(&state, "super@example.com", &[Role::SuperUser]).await;

    let add = |city: GeoCity, token: String| {
        test::TestRequest::post()
            .uri("/api/Favorites")
            .insert_header(bearer(&token))
            .set_json(city)
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, add(sample_city(1, "Paris"), token.clone())).await.status(),
        StatusCode::OK
    );

    let res = test::call_service(&app, add(sample_city(1, "Paris"), token.clone())).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["message"].as_str().expect("message").contains("already in favorites"));

    assert_eq!(
        test::call_service(&app, add(sample_city(2, "Lyon"), token.clone())).await.status(),
        StatusCode::OK
    );

    let res = test::call_service(&app, add(sample_city(3, "Nice"), token)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["message"].as_str().expect("message").contains("limit of 2"));
}

#[actix_web::test]
async fn invalid_city_payload_is_rejected_before_the_store() {
    let state = StateBuilder::default().build().await;
    let app = app!(state);
    let token = login_as(&state, "super@example.com", &[Role::SuperUser]).await;

    let req = test::TestRequest::post()
        .uri("/api/Favorites")
        .insert_header(bearer(&token))
        .set_json(sample_city(0, "NoId"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
