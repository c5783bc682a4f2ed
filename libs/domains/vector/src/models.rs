use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Free-form JSON object attached to a vector.
pub type Metadata = serde_json::Map<String, Value>;

pub const DEFAULT_K: u32 = 10;
pub const MAX_K: u32 = 100;
/// Matches the metadata table's `VARCHAR(255)` key.
pub const MAX_ID_LEN: u64 = 255;

/// Similarity function used by the index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
    Manhattan,
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" | "cosinesimil" => Ok(Self::Cosine),
            "euclidean" | "euclid" | "l2" => Ok(Self::Euclidean),
            "dot" | "dot_product" | "dotproduct" => Ok(Self::DotProduct),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            other => Err(format!("unknown distance metric '{}'", other)),
        }
    }
}

/// One stored vector. `id` is shared by both stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct VectorRecord {
    #[validate(length(min = 1, max = 255, message = "id must be 1 to 255 characters"))]
    pub id: String,

    #[validate(
        length(min = 1, message = "embedding must not be empty"),
        custom(function = "finite_components")
    )]
    pub embedding: Vec<f32>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// k-nearest-neighbour query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct SearchRequest {
    #[validate(
        length(min = 1, message = "embedding must not be empty"),
        custom(function = "finite_components")
    )]
    pub embedding: Vec<f32>,

    /// Number of neighbours to return, 1..=100. Out-of-range values are rejected, never clamped.
    #[validate(range(min = 1, max = 100, message = "k must be between 1 and 100"))]
    #[serde(default = "default_k")]
    #[schema(default = 10, minimum = 1, maximum = 100)]
    pub k: u32,
}

impl SearchRequest {
    pub fn new(embedding: Vec<f32>, k: u32) -> Self {
        Self { embedding, k }
    }
}

fn default_k() -> u32 {
    DEFAULT_K
}

/// A single search result, ordered as returned by the index store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub id: String,
    /// Higher is more similar; range depends on the index's distance metric
    pub score: f32,
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

/// Result of a dual-store write.
///
/// The index is always written first and metadata only after it succeeds,
/// so there is never metadata without a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreOutcome {
    /// Both stores accepted the write
    Stored,
    /// The index accepted the write but the metadata store did not; no rollback is attempted
    PartiallyStored { index_ok: bool, metadata_ok: bool },
    /// The index write failed and the metadata store was not touched
    Rejected,
}

impl StoreOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StoreOutcome::Stored)
    }

    pub fn index_written(&self) -> bool {
        match self {
            StoreOutcome::Stored => true,
            StoreOutcome::PartiallyStored { index_ok, .. } => *index_ok,
            StoreOutcome::Rejected => false,
        }
    }

    pub fn metadata_written(&self) -> bool {
        match self {
            StoreOutcome::Stored => true,
            StoreOutcome::PartiallyStored { metadata_ok, .. } => *metadata_ok,
            StoreOutcome::Rejected => false,
        }
    }
}

#[allow(clippy::ptr_arg)]
fn finite_components(values: &Vec<f32>) -> Result<(), ValidationError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::new("non_finite")
            .with_message("embedding values must be finite numbers".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_distance_metric_from_str() {
        assert_eq!("cosine".parse::<DistanceMetric>(), Ok(DistanceMetric::Cosine));
        assert_eq!("Euclid".parse::<DistanceMetric>(), Ok(DistanceMetric::Euclidean));
        assert_eq!("dot".parse::<DistanceMetric>(), Ok(DistanceMetric::DotProduct));
        assert!("hamming".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_vector_record_metadata_defaults_to_empty() {
        let record: VectorRecord =
            serde_json::from_value(json!({"id": "v1", "embedding": [0.1, 0.2]})).unwrap();
        assert!(record.metadata.is_empty());
        assert_eq!(record.dimension(), 2);
    }

    #[test]
    fn test_search_request_k_defaults_to_ten() {
        let request: SearchRequest = serde_json::from_value(json!({"embedding": [1.0]})).unwrap();
        assert_eq!(request.k, DEFAULT_K);
    }

    #[test]
    fn test_store_outcome_flags() {
        assert!(StoreOutcome::Stored.is_success());

        let partial = StoreOutcome::PartiallyStored {
            index_ok: true,
            metadata_ok: false,
        };
        assert!(!partial.is_success());
        assert!(partial.index_written());
        assert!(!partial.metadata_written());

        assert!(!StoreOutcome::Rejected.index_written());
        assert!(!StoreOutcome::Rejected.metadata_written());
    }

    #[test]
    fn test_store_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(StoreOutcome::PartiallyStored {
            index_ok: true,
            metadata_ok: false,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"status": "partially_stored", "index_ok": true, "metadata_ok": false})
        );
    }
}
