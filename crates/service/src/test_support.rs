#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use models::db::{connect_with_config, DatabaseConfig};

/// In-memory SQLite with the full schema. One pooled connection, since every
/// SQLite memory connection is its own database.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a user directly; password checks are not involved.
pub async fn seed_user(db: &DatabaseConnection, email: &str, is_superuser: bool) -> Result<models::user::Model, anyhow::Error> {
    Ok(models::user::create(db, email, None, "unused", is_superuser).await?)
}
