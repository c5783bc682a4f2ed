use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Keyed by the caller-supplied vector id, shared with the index store.
        manager
            .create_table(
                Table::create()
                    .table(VectorMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VectorMetadata::Id)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(json_binary(VectorMetadata::Metadata))
                    .col(
                        timestamp_with_time_zone(VectorMetadata::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(VectorMetadata::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vector_metadata_created_at")
                    .table(VectorMetadata::Table)
                    .col(VectorMetadata::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vector_metadata_updated_at")
                    .table(VectorMetadata::Table)
                    .col(VectorMetadata::UpdatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(VectorMetadata::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum VectorMetadata {
    Table,
    Id,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
