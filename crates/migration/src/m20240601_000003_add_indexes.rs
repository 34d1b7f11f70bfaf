use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Location: owner filter backs every non-superuser list and count
        manager
            .create_index(
                Index::create()
                    .name("idx_location_owner")
                    .table(Location::Table)
                    .col(Location::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Location: page order
        manager
            .create_index(
                Index::create()
                    .name("idx_location_created_at")
                    .table(Location::Table)
                    .col(Location::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_location_created_at").table(Location::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_location_owner").table(Location::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Location { Table, OwnerId, CreatedAt }
