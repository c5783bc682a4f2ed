//! REST handlers for vector operations

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use axum_helpers::{AppError, ErrorResponse};
use serde_json::json;
use std::sync::Arc;

use super::payload::{SearchQueryParams, SearchResponse, StoreVectorRequest, StoreVectorResponse};
use crate::models::{SearchRequest, StoreOutcome, VectorRecord};
use crate::repository::{MetadataRepository, VectorIndexRepository};
use crate::service::VectorService;

type SharedService<I, M> = State<Arc<VectorService<I, M>>>;

/// Store a vector and its metadata
#[utoipa::path(
    post,
    path = "/vectors",
    tag = "vectors",
    request_body = StoreVectorRequest,
    responses(
        (status = 200, description = "Vector stored in both stores", body = StoreVectorResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Store failed or was only partially applied", body = ErrorResponse)
    )
)]
pub async fn store_vector<I, M>(
    State(service): SharedService<I, M>,
    payload: Result<Json<StoreVectorRequest>, JsonRejection>,
) -> Result<Json<StoreVectorResponse>, AppError>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let Json(request) = payload?;
    let record = request.into_record()?;
    let id = record.id.clone();

    match service.store(record).await? {
        StoreOutcome::Stored => Ok(Json(StoreVectorResponse::stored(id))),
        StoreOutcome::PartiallyStored {
            index_ok,
            metadata_ok,
        } => Err(AppError::PartialWrite {
            message: format!("Vector '{}' was indexed but its metadata was not stored", id),
            details: json!({
                "id": id,
                "index_ok": index_ok,
                "metadata_ok": metadata_ok,
            }),
        }),
        StoreOutcome::Rejected => Err(AppError::StoreUnavailable(format!(
            "vector index rejected '{}'",
            id
        ))),
    }
}

/// Search with a query-string encoded vector
#[utoipa::path(
    get,
    path = "/vectors",
    tag = "vectors",
    params(SearchQueryParams),
    responses(
        (status = 200, description = "Nearest neighbours, most similar first", body = SearchResponse),
        (status = 400, description = "Missing or malformed vector, or k out of range", body = ErrorResponse)
    )
)]
pub async fn search_by_query<I, M>(
    State(service): SharedService<I, M>,
    params: Result<Query<SearchQueryParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let Query(params) = params?;
    let results = service.search(params.into_request()?).await?;
    Ok(Json(SearchResponse { results }))
}

/// Search with a JSON body
#[utoipa::path(
    post,
    path = "/vectors/search",
    tag = "vectors",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Nearest neighbours, most similar first", body = SearchResponse),
        (status = 400, description = "Invalid request or k out of range", body = ErrorResponse)
    )
)]
pub async fn search_vectors<I, M>(
    State(service): SharedService<I, M>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, AppError>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let Json(request) = payload?;
    let results = service.search(request).await?;
    Ok(Json(SearchResponse { results }))
}

/// Get a vector by id
#[utoipa::path(
    get,
    path = "/vectors/{id}",
    tag = "vectors",
    params(("id" = String, Path, description = "Vector id")),
    responses(
        (status = 200, description = "Vector with merged metadata", body = VectorRecord),
        (status = 404, description = "Not in the vector index", body = ErrorResponse),
        (status = 500, description = "Vector index unavailable", body = ErrorResponse)
    )
)]
pub async fn get_vector<I, M>(
    State(service): SharedService<I, M>,
    Path(id): Path<String>,
) -> Result<Json<VectorRecord>, AppError>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let record = service.get(&id).await?;
    Ok(Json(record))
}

/// Rewrite a vector's metadata row from the index copy
#[utoipa::path(
    post,
    path = "/vectors/{id}/repair",
    tag = "vectors",
    params(("id" = String, Path, description = "Vector id")),
    responses(
        (status = 200, description = "Metadata rewritten", body = VectorRecord),
        (status = 404, description = "Not in the vector index", body = ErrorResponse),
        (status = 500, description = "A store is unavailable", body = ErrorResponse)
    )
)]
pub async fn repair_vector<I, M>(
    State(service): SharedService<I, M>,
    Path(id): Path<String>,
) -> Result<Json<VectorRecord>, AppError>
where
    I: VectorIndexRepository + 'static,
    M: MetadataRepository + 'static,
{
    let record = service.repair_metadata(&id).await?;
    Ok(Json(record))
}
