pub mod event;
pub mod payload;
mod rest;

use axum::{
    Router,
    routing::{get, post},
};
use axum_helpers::ErrorResponse;
use axum_helpers::errors::handlers::method_not_allowed;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{SearchHit, SearchRequest, StoreOutcome, VectorRecord};
use crate::repository::{MetadataRepository, VectorIndexRepository};
use crate::service::VectorService;

pub use payload::{SearchQueryParams, SearchResponse, StoreVectorRequest, StoreVectorResponse};
pub use rest::*;

/// OpenAPI documentation for the vector API
#[derive(OpenApi)]
#[openapi(
    paths(
        rest::store_vector,
        rest::search_by_query,
        rest::search_vectors,
        rest::get_vector,
        rest::repair_vector,
    ),
    components(
        schemas(
            StoreVectorRequest, StoreVectorResponse,
            SearchRequest, SearchResponse, SearchHit,
            VectorRecord, StoreOutcome, ErrorResponse
        )
    ),
    tags(
        (name = "vectors", description = "Vector storage and similarity search")
    )
)]
pub struct VectorApiDoc;

/// Vector routes, to be nested under `/api`.
///
/// Unsupported verbs on a known path answer 405 with the standard error body.
pub fn router<I, M>(service: VectorService<I, M>) -> Router
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/vectors",
            post(rest::store_vector::<I, M>)
                .get(rest::search_by_query::<I, M>)
                .fallback(method_not_allowed),
        )
        .route(
            "/vectors/search",
            post(rest::search_vectors::<I, M>).fallback(method_not_allowed),
        )
        .route(
            "/vectors/{id}",
            get(rest::get_vector::<I, M>).fallback(method_not_allowed),
        )
        .route(
            "/vectors/{id}/repair",
            post(rest::repair_vector::<I, M>).fallback(method_not_allowed),
        )
        .with_state(shared_service)
}
