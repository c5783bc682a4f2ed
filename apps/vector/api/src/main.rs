use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::retry;
use database::postgres::{connect_from_config_with_retry, run_migrations};
use domain_vector::{
    InMemoryMetadataStore, InMemoryVectorIndex, PgMetadataRepository, QdrantConfig,
    QdrantVectorIndex, VectorConfig,
};
use eyre::WrapErr;
use migration::Migrator;
use tracing::{info, warn};

mod config;
mod health;
mod server;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(db_config) => {
            let db = connect_from_config_with_retry(db_config, None)
                .await
                .wrap_err("PostgreSQL connection failed")?;
            run_migrations::<Migrator>(&db, config.app.name)
                .await
                .wrap_err("Failed to run migrations")?;
            Some(db)
        }
        None => {
            warn!("DATABASE_URL not set, metadata is kept in memory");
            None
        }
    };

    let qdrant = match config.qdrant.clone() {
        Some(qdrant_config) => Some(connect_qdrant(qdrant_config, config.vector.clone()).await?),
        None => {
            warn!("QDRANT_URL not set, vectors are kept in memory");
            None
        }
    };

    let (dimension, distance) = (config.vector.dimension, config.vector.distance);

    match (qdrant, db) {
        (Some(index), Some(db)) => {
            let metadata = PgMetadataRepository::new(db.clone());
            server::serve(config, index, metadata, Some(db)).await
        }
        (Some(index), None) => server::serve(config, index, InMemoryMetadataStore::new(), None).await,
        (None, Some(db)) => {
            let index = InMemoryVectorIndex::with_distance(dimension, distance);
            let metadata = PgMetadataRepository::new(db.clone());
            server::serve(config, index, metadata, Some(db)).await
        }
        (None, None) => {
            let index = InMemoryVectorIndex::with_distance(dimension, distance);
            server::serve(config, index, InMemoryMetadataStore::new(), None).await
        }
    }
}

async fn connect_qdrant(
    qdrant: QdrantConfig,
    vector: VectorConfig,
) -> eyre::Result<QdrantVectorIndex> {
    info!(url = %qdrant.url, collection = %vector.collection, "Connecting to Qdrant");

    let index = QdrantVectorIndex::new(qdrant, vector)?;
    retry("qdrant ensure collection", || index.ensure_collection())
        .await
        .wrap_err("Qdrant collection setup failed")?;

    Ok(index)
}
