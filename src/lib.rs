//! SwagTrackr API Library
//!
//! Core functionality for the SwagTrackr inventory tracker: a SQLite-backed
//! item store shared by the HTTP JSON API and the CLI.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub inventory: services::inventory::InventoryService,
}

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    handlers::items::items_router()
}

/// Assembles the full application router: liveness, health, and the v1 API.
///
/// Middleware (tracing, CORS) is layered on top by the server binary so tests
/// can drive the bare router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "swagtrackr-api up" }))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}
