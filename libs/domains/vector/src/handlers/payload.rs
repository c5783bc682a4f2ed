//! Request and response bodies shared by the REST and event transports.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{VectorError, VectorResult};
use crate::models::{DEFAULT_K, Metadata, SearchHit, SearchRequest, VectorRecord};

pub const MISSING_STORE_FIELDS: &str = "Missing required fields: id and vector";
pub const MISSING_SEARCH_VECTOR: &str = "Missing required parameter: vector";
pub const INVALID_SEARCH_PARAMS: &str = "Invalid vector format or k parameter";
pub const STORED_MESSAGE: &str = "Vector stored successfully";

/// Body of a store request. `vector` is accepted as an alias of `embedding`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StoreVectorRequest {
    #[schema(example = "doc-1")]
    pub id: Option<String>,
    #[serde(alias = "vector")]
    pub embedding: Option<Vec<f32>>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

impl StoreVectorRequest {
    pub fn into_record(self) -> VectorResult<VectorRecord> {
        match (self.id, self.embedding) {
            (Some(id), Some(embedding)) => {
                Ok(VectorRecord::new(id, embedding).with_metadata(self.metadata.unwrap_or_default()))
            }
            _ => Err(VectorError::Validation(MISSING_STORE_FIELDS.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreVectorResponse {
    pub id: String,
    pub message: String,
}

impl StoreVectorResponse {
    pub fn stored(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: STORED_MESSAGE.to_string(),
        }
    }
}

/// Query-string form of a search: `?vector=[0.1,0.2]&k=5`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQueryParams {
    /// JSON-encoded array of numbers
    #[serde(alias = "vector")]
    #[param(example = "[0.1,0.2,0.3]")]
    pub embedding: Option<String>,
    /// Number of results, defaults to 10
    pub k: Option<String>,
}

impl SearchQueryParams {
    /// Parses the encoded values; range checks are left to the service.
    pub fn into_request(self) -> VectorResult<SearchRequest> {
        let raw = self
            .embedding
            .ok_or_else(|| VectorError::Validation(MISSING_SEARCH_VECTOR.to_string()))?;

        let embedding: Vec<f32> = serde_json::from_str(&raw)
            .map_err(|_| VectorError::Validation(INVALID_SEARCH_PARAMS.to_string()))?;

        let k = match self.k {
            Some(k) => k
                .trim()
                .parse::<u32>()
                .map_err(|_| VectorError::Validation(INVALID_SEARCH_PARAMS.to_string()))?,
            None => DEFAULT_K,
        };

        Ok(SearchRequest::new(embedding, k))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}
