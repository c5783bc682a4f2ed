use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};

use crate::models::DistanceMetric;

/// Shape of the vector collection, shared by every index implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorConfig {
    pub collection: String,
    pub dimension: usize,
    pub distance: DistanceMetric,
    /// HNSW tuning for newly created collections; `None` keeps the server defaults
    pub hnsw: Option<HnswConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnswConfig {
    pub m: u64,
    pub ef_construct: u64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construct: 100,
        }
    }
}

impl VectorConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            collection: "vectors".to_string(),
            dimension: 1536,
            distance: DistanceMetric::Cosine,
            hnsw: Some(HnswConfig::default()),
        }
    }
}

impl FromEnv for VectorConfig {
    /// - QDRANT_COLLECTION: defaults to `vectors`
    /// - VECTOR_DIMENSION: defaults to 1536
    /// - VECTOR_DISTANCE: `cosine` (default), `euclidean`, `dot`, `manhattan`
    /// - VECTOR_HNSW_M / VECTOR_HNSW_EF_CONSTRUCT: default 16 / 100
    fn from_env() -> Result<Self, ConfigError> {
        let dimension: usize = env_parse_or("VECTOR_DIMENSION", 1536)?;
        if dimension == 0 {
            return Err(ConfigError::ParseError {
                key: "VECTOR_DIMENSION".to_string(),
                details: "dimension must be greater than zero".to_string(),
            });
        }

        let hnsw = HnswConfig {
            m: env_parse_or("VECTOR_HNSW_M", 16)?,
            ef_construct: env_parse_or("VECTOR_HNSW_EF_CONSTRUCT", 100)?,
        };

        Ok(Self {
            collection: env_or_default("QDRANT_COLLECTION", "vectors"),
            dimension,
            distance: env_parse_or("VECTOR_DISTANCE", DistanceMetric::Cosine)?,
            hnsw: Some(hnsw),
        })
    }
}
