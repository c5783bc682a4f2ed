use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{Metadata, SearchHit, VectorRecord};

/// Similarity-search store holding embeddings and a copy of their metadata.
///
/// Implementations own their timeouts and connection pooling; callers never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndexRepository: Send + Sync {
    /// Insert or replace the record with `record.id`.
    ///
    /// A dimension mismatch is reported as [`VectorError::Validation`](crate::VectorError::Validation).
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()>;

    /// Up to `k` nearest neighbours, most similar first.
    async fn search(&self, embedding: Vec<f32>, k: u32) -> VectorResult<Vec<SearchHit>>;

    /// Fetch a record with its embedding and stored metadata.
    async fn get(&self, id: &str) -> VectorResult<Option<VectorRecord>>;

    /// Cheap reachability probe for readiness checks.
    async fn ping(&self) -> VectorResult<()>;
}

/// Durable key-value store for metadata, authoritative over the index copy on reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Insert or replace; last write wins.
    async fn upsert(&self, id: &str, metadata: Metadata) -> VectorResult<()>;

    async fn get(&self, id: &str) -> VectorResult<Option<Metadata>>;

    async fn ping(&self) -> VectorResult<()>;
}
