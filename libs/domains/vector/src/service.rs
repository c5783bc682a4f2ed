use std::sync::Arc;
use tracing::instrument;

use crate::error::{VectorError, VectorResult};
use crate::models::{SearchHit, SearchRequest, StoreOutcome, VectorRecord};
use crate::repository::{MetadataRepository, VectorIndexRepository};
use crate::validation::{validate_search_request, validate_vector_record};

/// Coordinates writes and reads across the vector index and the metadata store.
///
/// There is no transaction spanning both stores. A store writes the index
/// first and the metadata second; a failed metadata write is reported as
/// [`StoreOutcome::PartiallyStored`] and can be fixed with
/// [`repair_metadata`](Self::repair_metadata).
pub struct VectorService<I: VectorIndexRepository, M: MetadataRepository> {
    index: Arc<I>,
    metadata: Arc<M>,
}

// Clones share both stores; `I` and `M` need not be `Clone`.
impl<I: VectorIndexRepository, M: MetadataRepository> Clone for VectorService<I, M> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            metadata: Arc::clone(&self.metadata),
        }
    }
}

impl<I: VectorIndexRepository, M: MetadataRepository> VectorService<I, M> {
    pub fn new(index: I, metadata: M) -> Self {
        Self {
            index: Arc::new(index),
            metadata: Arc::new(metadata),
        }
    }

    /// Store a vector in the index, then its metadata.
    ///
    /// Invalid input is an `Err`; store failures are reported through the outcome.
    #[instrument(skip(self, record), fields(vector_id = %record.id, dimension = record.embedding.len()))]
    pub async fn store(&self, record: VectorRecord) -> VectorResult<StoreOutcome> {
        validate_vector_record(&record)?;

        let id = record.id.clone();
        let metadata = record.metadata.clone();

        match self.index.upsert(record).await {
            Ok(()) => {}
            Err(err @ VectorError::Validation(_)) => return Err(err),
            Err(err) => {
                tracing::error!(vector_id = %id, error = %err, "Vector index write failed");
                return Ok(StoreOutcome::Rejected);
            }
        }

        match self.metadata.upsert(&id, metadata).await {
            Ok(()) => {
                tracing::info!(vector_id = %id, "Stored vector");
                Ok(StoreOutcome::Stored)
            }
            Err(err) => {
                tracing::warn!(
                    vector_id = %id,
                    error = %err,
                    "Vector indexed but metadata write failed"
                );
                Ok(StoreOutcome::PartiallyStored {
                    index_ok: true,
                    metadata_ok: false,
                })
            }
        }
    }

    /// Nearest neighbours in the index's order. An unreachable index yields no hits.
    #[instrument(skip(self, request), fields(k = request.k))]
    pub async fn search(&self, request: SearchRequest) -> VectorResult<Vec<SearchHit>> {
        validate_search_request(&request)?;

        match self.index.search(request.embedding, request.k).await {
            Ok(hits) => Ok(hits),
            Err(err @ VectorError::Validation(_)) => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "Vector search failed, returning no results");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch a vector; metadata store values win over the index copy.
    #[instrument(skip(self), fields(vector_id = %id))]
    pub async fn get(&self, id: &str) -> VectorResult<VectorRecord> {
        let mut record = self
            .index
            .get(id)
            .await?
            .ok_or_else(|| VectorError::NotFound(id.to_string()))?;

        match self.metadata.get(id).await {
            Ok(Some(metadata)) => record.metadata.extend(metadata),
            Ok(None) => {
                tracing::debug!(vector_id = %id, "No metadata row, using index copy");
            }
            Err(err) => {
                tracing::warn!(
                    vector_id = %id,
                    error = %err,
                    "Metadata lookup failed, using index copy"
                );
            }
        }

        Ok(record)
    }

    /// Rewrite the metadata row from the index copy after a partial store.
    #[instrument(skip(self), fields(vector_id = %id))]
    pub async fn repair_metadata(&self, id: &str) -> VectorResult<VectorRecord> {
        let record = self
            .index
            .get(id)
            .await?
            .ok_or_else(|| VectorError::NotFound(id.to_string()))?;

        self.metadata.upsert(id, record.metadata.clone()).await?;

        tracing::info!(vector_id = %id, "Repaired vector metadata");
        Ok(record)
    }

    pub async fn ping_index(&self) -> VectorResult<()> {
        self.index.ping().await
    }

    pub async fn ping_metadata(&self) -> VectorResult<()> {
        self.metadata.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use crate::repository::{MockMetadataRepository, MockVectorIndexRepository};
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    fn doc() -> VectorRecord {
        VectorRecord::new("v1", vec![0.1, 0.2, 0.3]).with_metadata(metadata(json!({"title": "Doc"})))
    }

    fn unavailable() -> VectorError {
        VectorError::StoreUnavailable("connection refused".to_string())
    }

    #[tokio::test]
    async fn test_store_writes_both_stores() {
        let mut index = MockVectorIndexRepository::new();
        index
            .expect_upsert()
            .withf(|record: &VectorRecord| record.id == "v1")
            .times(1)
            .returning(|_| Ok(()));

        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert()
            .withf(|id: &str, m: &Metadata| id == "v1" && m.get("title") == Some(&json!("Doc")))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = VectorService::new(index, meta);
        assert_eq!(service.store(doc()).await.unwrap(), StoreOutcome::Stored);
    }

    #[tokio::test]
    async fn test_store_invalid_input_touches_no_store() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_upsert().never();
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert().never();

        let service = VectorService::new(index, meta);
        let err = service
            .store(VectorRecord::new("", vec![0.1]))
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_index_failure_skips_metadata() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_upsert().times(1).returning(|_| Err(unavailable()));
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert().never();

        let service = VectorService::new(index, meta);
        assert_eq!(service.store(doc()).await.unwrap(), StoreOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_store_dimension_mismatch_is_validation_error() {
        let mut index = MockVectorIndexRepository::new();
        index
            .expect_upsert()
            .returning(|_| Err(VectorError::Validation("dimension".to_string())));
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert().never();

        let service = VectorService::new(index, meta);
        assert!(matches!(
            service.store(doc()).await,
            Err(VectorError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_store_metadata_failure_is_partial() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_upsert().times(1).returning(|_| Ok(()));
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert().times(1).returning(|_, _| Err(unavailable()));

        let service = VectorService::new(index, meta);
        let outcome = service.store(doc()).await.unwrap();
        assert_eq!(
            outcome,
            StoreOutcome::PartiallyStored {
                index_ok: true,
                metadata_ok: false
            }
        );
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_search_returns_hits_in_index_order() {
        let mut index = MockVectorIndexRepository::new();
        index
            .expect_search()
            .withf(|_, k| *k == 5)
            .returning(|_, _| {
                Ok(vec![
                    SearchHit {
                        id: "b".to_string(),
                        score: 0.9,
                        metadata: Metadata::new(),
                    },
                    SearchHit {
                        id: "a".to_string(),
                        score: 0.9,
                        metadata: Metadata::new(),
                    },
                ])
            });

        let service = VectorService::new(index, MockMetadataRepository::new());
        let hits = service
            .search(SearchRequest::new(vec![0.1, 0.2], 5))
            .await
            .unwrap();

        let ids: Vec<_> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_search_index_failure_yields_empty() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_search().returning(|_, _| Err(unavailable()));

        let service = VectorService::new(index, MockMetadataRepository::new());
        let hits = service.search(SearchRequest::new(vec![0.1], 3)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_k_out_of_range() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_search().never();

        let service = VectorService::new(index, MockMetadataRepository::new());
        for k in [0, 101] {
            assert!(matches!(
                service.search(SearchRequest::new(vec![0.1], k)).await,
                Err(VectorError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_get_overlays_metadata_store() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| {
            Ok(Some(VectorRecord::new("v1", vec![0.1]).with_metadata(metadata(
                json!({"title": "Old", "source": "index"}),
            ))))
        });
        let mut meta = MockMetadataRepository::new();
        meta.expect_get()
            .withf(|id: &str| id == "v1")
            .returning(|_| Ok(Some(metadata(json!({"title": "New", "lang": "en"})))));

        let service = VectorService::new(index, meta);
        let record = service.get("v1").await.unwrap();
        assert_eq!(
            record.metadata,
            metadata(json!({"title": "New", "source": "index", "lang": "en"}))
        );
    }

    #[tokio::test]
    async fn test_get_swallows_metadata_failure() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| Ok(Some(doc())));
        let mut meta = MockMetadataRepository::new();
        meta.expect_get().returning(|_| Err(unavailable()));

        let service = VectorService::new(index, meta);
        assert_eq!(service.get("v1").await.unwrap(), doc());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| Ok(None));
        let mut meta = MockMetadataRepository::new();
        meta.expect_get().never();

        let service = VectorService::new(index, meta);
        assert!(matches!(
            service.get("nope").await,
            Err(VectorError::NotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_get_index_failure_propagates() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| Err(unavailable()));

        let service = VectorService::new(index, MockMetadataRepository::new());
        assert!(matches!(
            service.get("v1").await,
            Err(VectorError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_repair_rewrites_metadata_from_index() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| Ok(Some(doc())));
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert()
            .withf(|id: &str, m: &Metadata| id == "v1" && m == &doc().metadata)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = VectorService::new(index, meta);
        assert_eq!(service.repair_metadata("v1").await.unwrap(), doc());
    }

    #[tokio::test]
    async fn test_repair_unknown_id_writes_nothing() {
        let mut index = MockVectorIndexRepository::new();
        index.expect_get().returning(|_| Ok(None));
        let mut meta = MockMetadataRepository::new();
        meta.expect_upsert().never();

        let service = VectorService::new(index, meta);
        assert!(matches!(
            service.repair_metadata("ghost").await,
            Err(VectorError::NotFound(_))
        ));
    }
}
