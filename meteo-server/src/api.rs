//! HTTP handlers.
//!
//! Each endpoint translates its service-layer error taxonomy into a status
//! code with a single match; no handler lets an internal error reach the
//! client verbatim.

use actix_web::web;

pub mod auth;
pub mod favorites;
pub mod weather;

/// Register every route on an actix app; shared by the binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(weather::forecast)
        .service(weather::search_city)
        .service(weather::search_country_code)
        .service(weather::iso_country_code)
        .service(favorites::list_favorites)
        .service(favorites::add_favorite)
        .service(favorites::remove_favorite);
}
