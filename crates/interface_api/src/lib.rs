//! HTTP API Layer
//!
//! This crate provides the REST API for the claims compliance core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Claim processing, validation and audit review
//! - **Middleware**: JWT authentication and request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! Every `/api/v1` route needs a bearer token; the token's role is what the
//! claim pipeline authorizes.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pipeline, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use claims_pipeline::ClaimPipeline;

use crate::config::ApiConfig;
use crate::handlers::{audit, claims, health};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClaimPipeline>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pipeline` - Claim pipeline serving every request
/// * `config` - API configuration
pub fn create_router(pipeline: Arc<ClaimPipeline>, config: ApiConfig) -> Router {
    let state = AppState { pipeline, config };

    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(health::health_check));

    let claims_routes = Router::new()
        .route("/process", post(claims::process_claim))
        .route("/validate", post(claims::validate_claim));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .route("/audit", get(audit::list_entries))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
