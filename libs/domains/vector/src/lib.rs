//! Vector Domain Library
//!
//! Stores embeddings in a similarity-search index and their metadata in a
//! relational store, and serves search and lookup over both.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ handlers (REST, event)   │
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │   VectorService<I, M>    │  ← validation, write ordering, metadata overlay
//! └──────┬────────────┬──────┘
//!        │            │
//! ┌──────▼───────┐ ┌──▼──────────────────┐
//! │ VectorIndex  │ │ MetadataRepository  │
//! │ Repository   │ │   (trait)           │
//! └──────┬───────┘ └──┬──────────────────┘
//!        │            │
//!  QdrantVectorIndex  PgMetadataRepository
//!  InMemoryVectorIndex InMemoryMetadataStore
//! ```
//!
//! Writes go to the index first; metadata is written only after the index
//! accepted the vector, so the metadata store never holds an id the index
//! lacks. Reads take the index record and overlay the metadata row on top.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector::{
//!     InMemoryMetadataStore, QdrantConfig, QdrantVectorIndex, SearchRequest, VectorConfig,
//!     VectorRecord, VectorService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let index = QdrantVectorIndex::new(QdrantConfig::default(), VectorConfig::new(3))?;
//! index.ensure_collection().await?;
//!
//! let service = VectorService::new(index, InMemoryMetadataStore::new());
//!
//! let outcome = service.store(VectorRecord::new("doc-1", vec![0.1, 0.2, 0.3])).await?;
//! assert!(outcome.is_success());
//!
//! let hits = service.search(SearchRequest::new(vec![0.1, 0.2, 0.3], 5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod qdrant;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use config::{HnswConfig, VectorConfig};
pub use error::{VectorError, VectorResult};
pub use handlers::VectorApiDoc;
pub use memory::{InMemoryMetadataStore, InMemoryVectorIndex};
pub use models::{
    DEFAULT_K, DistanceMetric, MAX_K, Metadata, SearchHit, SearchRequest, StoreOutcome,
    VectorRecord,
};
pub use postgres::PgMetadataRepository;
pub use qdrant::{QdrantConfig, QdrantVectorIndex};
pub use repository::{MetadataRepository, VectorIndexRepository};
pub use service::VectorService;
pub use validation::{validate_search_request, validate_vector_record};
