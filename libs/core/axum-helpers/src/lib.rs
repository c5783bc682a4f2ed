//! # Axum Helpers
//!
//! Shared building blocks for the workspace's Axum services.
//!
//! - **[`errors`]**: `AppError`, the `ErrorResponse` body and `ErrorCode`s
//! - **[`http`]**: CORS and security header middleware
//! - **[`server`]**: router assembly with OpenAPI docs, health/readiness, graceful shutdown
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &config, config.shutdown_timeout, async {}).await?;
//! ```

pub mod errors;
pub mod http;
pub mod server;

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_postgres,
    create_production_app, create_router, health_router, run_health_checks,
    shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, default_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse, error_response};
