//! School administration backend and resource client.
//!
//! The server exposes uniform CRUD endpoints for every school entity over
//! SQLite. The [`client`] module talks to those endpoints and keeps a
//! status-tracked cache per entity, and [`view`] turns a cached list into a
//! searchable, sortable page.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod view;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use models::{Category, Discount, Division, House, Reason, StockItem, Teacher, Visitor};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .merge(api::resource_routes::<Teacher>())
        .merge(api::resource_routes::<StockItem>())
        .merge(api::resource_routes::<Division>())
        .merge(api::resource_routes::<Discount>())
        .merge(api::resource_routes::<Visitor>())
        .merge(api::resource_routes::<Category>())
        .merge(api::resource_routes::<Reason>())
        .merge(api::resource_routes::<House>());

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
