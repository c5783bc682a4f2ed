use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Insert};

use crate::{
    entity,
    error::{VectorError, VectorResult},
    models::Metadata,
    repository::MetadataRepository,
};

/// Metadata store over the `vector_metadata` table.
#[derive(Clone)]
pub struct PgMetadataRepository {
    db: DatabaseConnection,
}

impl PgMetadataRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// `INSERT .. ON CONFLICT (id) DO UPDATE SET metadata, updated_at`
fn upsert_statement(id: &str, metadata: Metadata) -> Insert<entity::ActiveModel> {
    entity::Entity::insert(entity::ActiveModel::for_upsert(id, metadata)).on_conflict(
        OnConflict::column(entity::Column::Id)
            .update_columns([entity::Column::Metadata, entity::Column::UpdatedAt])
            .to_owned(),
    )
}

#[async_trait]
impl MetadataRepository for PgMetadataRepository {
    async fn upsert(&self, id: &str, metadata: Metadata) -> VectorResult<()> {
        upsert_statement(id, metadata)
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!(id = %id, "Upserted vector metadata");
        Ok(())
    }

    async fn get(&self, id: &str) -> VectorResult<Option<Metadata>> {
        let model = entity::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;

        match model.map(|m| m.metadata) {
            None => Ok(None),
            Some(serde_json::Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(VectorError::Internal(format!(
                "metadata for '{}' is not a JSON object: {}",
                id, other
            ))),
        }
    }

    async fn ping(&self) -> VectorResult<()> {
        database::postgres::check_health(&self.db)
            .await
            .map_err(|e| VectorError::StoreUnavailable(e.to_string()))
    }
}
