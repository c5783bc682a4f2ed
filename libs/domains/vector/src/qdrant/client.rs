use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
    value::Kind,
};
use uuid::Uuid;

use super::QdrantConfig;
use super::convert::{json_to_qdrant, payload_to_map, qdrant_to_json};
use crate::config::VectorConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{DistanceMetric, Metadata, SearchHit, VectorRecord};
use crate::repository::VectorIndexRepository;

const ID_FIELD: &str = "id";
const METADATA_FIELD: &str = "metadata";
const EMBEDDING_FIELD: &str = "embedding";

/// Qdrant-backed vector index over a single collection.
///
/// Qdrant only accepts UUID or integer point ids, so caller ids are mapped to
/// UUIDv5 and the original id is kept in the payload next to the metadata.
/// The payload also carries the embedding as given, since cosine collections
/// store the point vector normalized.
pub struct QdrantVectorIndex {
    client: Qdrant,
    config: VectorConfig,
}

impl QdrantVectorIndex {
    pub fn new(qdrant: QdrantConfig, config: VectorConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&qdrant.url);

        if let Some(api_key) = qdrant.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(qdrant.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    /// Creates the collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> VectorResult<()> {
        let name = &self.config.collection;

        if self.client.collection_exists(name.as_str()).await? {
            tracing::debug!(collection = %name, "Qdrant collection already exists");
            return Ok(());
        }

        let mut builder = CreateCollectionBuilder::new(name.as_str()).vectors_config(
            VectorParamsBuilder::new(
                self.config.dimension as u64,
                to_qdrant_distance(self.config.distance),
            ),
        );

        if let Some(hnsw) = &self.config.hnsw {
            let hnsw_config = qdrant::HnswConfigDiff {
                m: Some(hnsw.m),
                ef_construct: Some(hnsw.ef_construct),
                ..Default::default()
            };
            builder = builder.hnsw_config(hnsw_config);
        }

        self.client.create_collection(builder).await?;

        tracing::info!(
            collection = %name,
            dimension = self.config.dimension,
            distance = ?self.config.distance,
            "Created Qdrant collection"
        );
        Ok(())
    }

    fn check_dimension(&self, embedding: &[f32]) -> VectorResult<()> {
        if embedding.len() != self.config.dimension {
            return Err(VectorError::Validation(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding.len(),
                self.config.dimension
            )));
        }
        Ok(())
    }
}

fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Euclidean => Distance::Euclid,
        DistanceMetric::DotProduct => Distance::Dot,
        DistanceMetric::Manhattan => Distance::Manhattan,
    }
}

/// Deterministic point id for a caller id.
pub fn point_id(id: &str) -> PointId {
    PointId::from(Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()).to_string())
}

fn encode_payload(
    id: &str,
    embedding: &[f32],
    metadata: Metadata,
) -> HashMap<String, QdrantValue> {
    let embedding = qdrant::ListValue {
        values: embedding
            .iter()
            .map(|&x| QdrantValue {
                kind: Some(Kind::DoubleValue(f64::from(x))),
            })
            .collect(),
    };

    HashMap::from([
        (ID_FIELD.to_string(), QdrantValue::from(id.to_string())),
        (
            EMBEDDING_FIELD.to_string(),
            QdrantValue {
                kind: Some(Kind::ListValue(embedding)),
            },
        ),
        (
            METADATA_FIELD.to_string(),
            json_to_qdrant(serde_json::Value::Object(metadata)),
        ),
    ])
}

/// Payload of a point as read back from the collection.
#[derive(Debug, PartialEq)]
struct StoredPayload {
    id: String,
    metadata: Metadata,
    /// `None` for points written without an embedding copy
    embedding: Option<Vec<f32>>,
}

fn decode_payload(mut payload: HashMap<String, QdrantValue>) -> VectorResult<StoredPayload> {
    let id = match payload.remove(ID_FIELD).map(qdrant_to_json) {
        Some(serde_json::Value::String(id)) => id,
        _ => {
            return Err(VectorError::Internal(
                "Qdrant point is missing its id payload".to_string(),
            ));
        }
    };

    let Some(metadata) = payload.remove(METADATA_FIELD) else {
        // Points written by other tools: expose the flat payload as metadata.
        return Ok(StoredPayload {
            id,
            metadata: payload_to_map(payload),
            embedding: None,
        });
    };

    let metadata = match qdrant_to_json(metadata) {
        serde_json::Value::Object(map) => map,
        _ => Metadata::new(),
    };
    let embedding = payload.remove(EMBEDDING_FIELD).and_then(decode_embedding);

    Ok(StoredPayload {
        id,
        metadata,
        embedding,
    })
}

fn decode_embedding(value: QdrantValue) -> Option<Vec<f32>> {
    let Some(Kind::ListValue(list)) = value.kind else {
        return None;
    };

    list.values
        .into_iter()
        .map(|v| match v.kind {
            Some(Kind::DoubleValue(x)) => Some(x as f32),
            Some(Kind::IntegerValue(x)) => Some(x as f32),
            _ => None,
        })
        .collect()
}

/// Extract vector values from VectorsOutput
/// Note: Uses deprecated data field for now until migration to 1.18+
#[allow(deprecated)]
fn extract_vector(vectors: &Option<qdrant::VectorsOutput>) -> Option<Vec<f32>> {
    match vectors {
        Some(qdrant::VectorsOutput {
            vectors_options: Some(opts),
        }) => match opts {
            qdrant::vectors_output::VectorsOptions::Vector(v) => Some(v.data.clone()),
            qdrant::vectors_output::VectorsOptions::Vectors(map) => {
                map.vectors.values().next().map(|v| v.data.clone())
            }
        },
        _ => None,
    }
}

#[async_trait]
impl VectorIndexRepository for QdrantVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()> {
        self.check_dimension(&record.embedding)?;

        let point = PointStruct::new(
            point_id(&record.id),
            record.embedding.clone(),
            encode_payload(&record.id, &record.embedding, record.metadata),
        );

        let builder = UpsertPointsBuilder::new(&self.config.collection, vec![point]).wait(true);
        self.client.upsert_points(builder).await?;

        Ok(())
    }

    async fn search(&self, embedding: Vec<f32>, k: u32) -> VectorResult<Vec<SearchHit>> {
        self.check_dimension(&embedding)?;

        let builder = SearchPointsBuilder::new(&self.config.collection, embedding, k as u64)
            .with_payload(true);

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let payload = decode_payload(point.payload)?;
                Ok(SearchHit {
                    id: payload.id,
                    score: point.score,
                    metadata: payload.metadata,
                })
            })
            .collect()
    }

    async fn get(&self, id: &str) -> VectorResult<Option<VectorRecord>> {
        let builder = GetPointsBuilder::new(&self.config.collection, vec![point_id(id)])
            .with_vectors(true)
            .with_payload(true);

        let results = self.client.get_points(builder).await?;

        let Some(point) = results.result.into_iter().next() else {
            return Ok(None);
        };

        let payload = decode_payload(point.payload)?;
        let embedding = match payload.embedding {
            Some(embedding) => embedding,
            None => extract_vector(&point.vectors).ok_or_else(|| {
                VectorError::Internal(format!("Qdrant point for '{}' has no vector", id))
            })?,
        };

        Ok(Some(VectorRecord {
            id: payload.id,
            embedding,
            metadata: payload.metadata,
        }))
    }

    async fn ping(&self) -> VectorResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}
