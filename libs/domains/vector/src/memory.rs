//! In-process stores for local development and tests.
//!
//! Both stores can be switched to a failing mode with `set_available(false)`,
//! which makes every call return [`VectorError::StoreUnavailable`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::error::{VectorError, VectorResult};
use crate::models::{DistanceMetric, Metadata, SearchHit, VectorRecord};
use crate::repository::{MetadataRepository, VectorIndexRepository};

#[derive(Debug, Clone)]
struct Availability(Arc<AtomicBool>);

impl Default for Availability {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Availability {
    fn check(&self, store: &str) -> VectorResult<()> {
        if self.0.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(VectorError::StoreUnavailable(format!("{} is unavailable", store)))
        }
    }
}

/// Brute-force index with a fixed dimension.
///
/// Scores are higher-is-closer for every metric: similarity for cosine and
/// dot product, negated distance for euclidean and manhattan. Ties are broken
/// by ascending id.
#[derive(Debug, Clone)]
pub struct InMemoryVectorIndex {
    dimension: usize,
    distance: DistanceMetric,
    points: Arc<RwLock<HashMap<String, VectorRecord>>>,
    available: Availability,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self::with_distance(dimension, DistanceMetric::Cosine)
    }

    pub fn with_distance(dimension: usize, distance: DistanceMetric) -> Self {
        Self {
            dimension,
            distance,
            points: Arc::new(RwLock::new(HashMap::new())),
            available: Availability::default(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn set_available(&self, available: bool) {
        self.available.0.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    fn check_dimension(&self, embedding: &[f32]) -> VectorResult<()> {
        if embedding.len() != self.dimension {
            return Err(VectorError::Validation(format!(
                "embedding dimension {} does not match index dimension {}",
                embedding.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        let pairs = || a.iter().zip(b).map(|(&x, &y)| (f64::from(x), f64::from(y)));

        let score = match self.distance {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::DotProduct => pairs().map(|(x, y)| x * y).sum(),
            DistanceMetric::Euclidean => {
                -pairs().map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
            }
            DistanceMetric::Manhattan => -pairs().map(|(x, y)| (x - y).abs()).sum::<f64>(),
        };

        clamp_score(score)
    }
}

/// Scores are accumulated in f64, so finite f32 inputs cannot overflow mid-sum.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Saturates out-of-range scores to the f32 range; NaN ranks last.
fn clamp_score(score: f64) -> f32 {
    if score.is_nan() {
        f32::MIN
    } else {
        score.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
    }
}

#[async_trait]
impl VectorIndexRepository for InMemoryVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()> {
        self.available.check("vector index")?;
        self.check_dimension(&record.embedding)?;

        self.points.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn search(&self, embedding: Vec<f32>, k: u32) -> VectorResult<Vec<SearchHit>> {
        self.available.check("vector index")?;
        self.check_dimension(&embedding)?;

        let points = self.points.read().await;
        let mut hits: Vec<SearchHit> = points
            .values()
            .map(|record| SearchHit {
                id: record.id.clone(),
                score: self.score(&embedding, &record.embedding),
                metadata: record.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(k as usize);

        Ok(hits)
    }

    async fn get(&self, id: &str) -> VectorResult<Option<VectorRecord>> {
        self.available.check("vector index")?;
        Ok(self.points.read().await.get(id).cloned())
    }

    async fn ping(&self) -> VectorResult<()> {
        self.available.check("vector index")
    }
}

#[derive(Debug, Clone)]
struct MetadataRow {
    metadata: Metadata,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Metadata rows keyed by id, keeping `created_at` across replacements.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadataStore {
    rows: Arc<RwLock<HashMap<String, MetadataRow>>>,
    available: Availability,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.0.store(available, Ordering::SeqCst);
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.rows.read().await.contains_key(id)
    }

    /// `(created_at, updated_at)` of a row.
    pub async fn timestamps(&self, id: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.rows
            .read()
            .await
            .get(id)
            .map(|row| (row.created_at, row.updated_at))
    }
}

#[async_trait]
impl MetadataRepository for InMemoryMetadataStore {
    async fn upsert(&self, id: &str, metadata: Metadata) -> VectorResult<()> {
        self.available.check("metadata store")?;

        let now = Utc::now();
        let mut rows = self.rows.write().await;
        rows.entry(id.to_string())
            .and_modify(|row| {
                row.metadata = metadata.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| MetadataRow {
                metadata,
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn get(&self, id: &str) -> VectorResult<Option<Metadata>> {
        self.available.check("metadata store")?;
        Ok(self.rows.read().await.get(id).map(|row| row.metadata.clone()))
    }

    async fn ping(&self) -> VectorResult<()> {
        self.available.check("metadata store")
    }
}
