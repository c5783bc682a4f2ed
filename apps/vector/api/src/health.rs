//! Readiness probe pinging both stores.

use axum::{
    Router,
    extract::State,
    response::Response,
    routing::get,
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_vector::{MetadataRepository, VectorIndexRepository, VectorService};

/// Router exposing `GET /ready`; 503 if either store fails its ping.
pub fn ready_router<I, M>(service: VectorService<I, M>) -> Router
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    Router::new()
        .route("/ready", get(ready_handler::<I, M>))
        .with_state(service)
}

async fn ready_handler<I, M>(State(service): State<VectorService<I, M>>) -> Response
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "vector_index",
            Box::pin(async {
                service
                    .ping_index()
                    .await
                    .map_err(|e| format!("Vector index ping failed: {}", e))
            }),
        ),
        (
            "metadata_store",
            Box::pin(async {
                service
                    .ping_metadata()
                    .await
                    .map_err(|e| format!("Metadata store ping failed: {}", e))
            }),
        ),
    ];

    run_health_checks(checks).await
}
