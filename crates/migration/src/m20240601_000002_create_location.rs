//! Create `location` table with FK to `user`.
//!
//! Deleting a user removes the locations they own.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Location::Table)
                    .if_not_exists()
                    .col(uuid(Location::Id).primary_key())
                    .col(uuid(Location::OwnerId).not_null())
                    .col(uuid_null(Location::ItemId))
                    .col(string_len(Location::Name, 255).not_null())
                    .col(string_len_null(Location::Description, 1024))
                    .col(double(Location::Latitude).not_null())
                    .col(double(Location::Longitude).not_null())
                    .col(timestamp_with_time_zone(Location::Datetime).not_null())
                    .col(timestamp_with_time_zone(Location::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Location::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_location_owner")
                            .from(Location::Table, Location::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Location::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Location {
    Table,
    Id,
    OwnerId,
    ItemId,
    Name,
    Description,
    Latitude,
    Longitude,
    Datetime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
