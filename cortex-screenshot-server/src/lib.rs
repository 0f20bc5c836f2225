//! HTTP front for the simulator screenshot action.

pub mod api;
pub mod types;

use axum::{routing::get, Router};
use cortex::{ActionRegistry, BridgeConfig, ConfigError, Dispatcher, Executor};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Dispatcher over the HTTP surface of the registry.
pub fn http_dispatcher(config: BridgeConfig) -> Result<Dispatcher, ConfigError> {
    let registry = ActionRegistry::http_surface(&config)?;
    Ok(Dispatcher::new(registry, Executor::new(config)))
}

pub fn build_router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/screenshot", get(api::screenshot))
        .route("/health", get(api::health))
        .route("/hello", get(api::hello))
        .fallback(api::not_found)
        .with_state(dispatcher)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
