//! Stair pricing and cut-sheet service.
//!
//! Prices staircase specifications against the board pricing catalog and turns
//! stored configurations into shop cut lists.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod routes;
pub mod shop;

use config::EngineConfig;
use db::Store;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub engine: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, engine: EngineConfig) -> Self {
        Self {
            store,
            engine: Arc::new(engine),
        }
    }
}

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(routes::health::router())
        .merge(pricing::router())
        .merge(shop::router())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
