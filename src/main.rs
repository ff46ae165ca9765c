//! Greetings API
//!
//! A small REST service exposing CRUD over greeting records persisted as a JSON document.

mod api;
mod config;
mod errors;
mod models;
mod service;
mod store;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use errors::{AppError, ErrorResponse};
use service::GreetingService;
use store::JsonFileStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GreetingService>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting Greetings API");
    tracing::info!("Data path: {:?}", config.data_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.is_development() {
        tracing::warn!("Development mode: internal error detail is returned to clients");
    }

    // Initialize the backing store before serving anything
    let store = JsonFileStore::open(&config.data_path)?;
    tracing::info!("Greeting store ready at {:?}", store.path());
    let service = Arc::new(GreetingService::new(Arc::new(store)));

    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server is running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Panics become the same JSON 500 envelope as any other internal failure
    let include_detail = state.config.is_development();
    let catch_panic = CatchPanicLayer::custom(move |payload: Box<dyn std::any::Any + Send>| {
        errors::panic_response(payload, include_detail)
    });

    // API routes. Unsupported methods on a known path answer like an unknown route.
    let api_routes = Router::new()
        .route(
            "/greetings",
            get(api::list_greetings)
                .post(api::create_greeting)
                .fallback(route_not_found),
        )
        .route(
            "/greetings/{id}",
            get(api::get_greeting)
                .put(api::update_greeting)
                .delete(api::delete_greeting)
                .fallback(route_not_found),
        );

    Router::new()
        .route("/", get(welcome).fallback(route_not_found))
        .route("/health", get(health_check).fallback(route_not_found))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(catch_panic)
                .layer(cors),
        )
        .with_state(state)
}

/// API welcome document.
async fn welcome() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Hello World API!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "greetings": "/api/greetings",
            "methods": ["GET", "POST", "PUT", "DELETE"]
        }
    }))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Fallback for unmatched routes.
async fn route_not_found() -> impl IntoResponse {
    let error = AppError::NotFound("Route not found".to_string());
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&error, false)))
}
