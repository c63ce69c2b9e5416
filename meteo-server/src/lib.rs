//! HTTP API for weather lookup and favorite-city management.
//!
//! This crate wires the `meteo-core` provider adapters behind an actix-web
//! surface, adds JWT-based authentication and a SQLite-backed favorites
//! store, and seeds an administrator account on startup.

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod favorites;
pub mod state;
pub mod store;
