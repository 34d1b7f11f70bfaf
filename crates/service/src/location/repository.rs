use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use models::location::{self, LocationPatch, NewLocation};

use crate::errors::ServiceError;
use crate::identity::OwnerScope;

/// Persistence operations the location service needs. Every write is a
/// single committed unit and returns the row as stored.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn count(&self, scope: OwnerScope) -> Result<u64, ServiceError>;
    async fn page(&self, scope: OwnerScope, skip: u64, limit: u64) -> Result<Vec<location::Model>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<location::Model>, ServiceError>;
    async fn insert(&self, owner_id: Uuid, input: NewLocation) -> Result<location::Model, ServiceError>;
    async fn update(&self, current: location::Model, patch: LocationPatch) -> Result<location::Model, ServiceError>;
    async fn delete(&self, current: location::Model) -> Result<(), ServiceError>;
}

fn scope_condition(scope: OwnerScope) -> Condition {
    match scope {
        OwnerScope::All => Condition::all(),
        OwnerScope::Owner(owner_id) => Condition::all().add(location::Column::OwnerId.eq(owner_id)),
    }
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmLocationRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl LocationRepository for SeaOrmLocationRepository {
    async fn count(&self, scope: OwnerScope) -> Result<u64, ServiceError> {
        let n = location::Entity::find()
            .filter(scope_condition(scope))
            .count(&self.db)
            .await?;
        Ok(n)
    }

    async fn page(&self, scope: OwnerScope, skip: u64, limit: u64) -> Result<Vec<location::Model>, ServiceError> {
        let rows = location::Entity::find()
            .filter(scope_condition(scope))
            .order_by_asc(location::Column::CreatedAt)
            .order_by_asc(location::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<location::Model>, ServiceError> {
        Ok(location::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, owner_id: Uuid, input: NewLocation) -> Result<location::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let created = input.into_active_model(owner_id).insert(&txn).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn update(&self, current: location::Model, patch: LocationPatch) -> Result<location::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let mut am: location::ActiveModel = current.into();
        patch.apply(&mut am);
        let updated = am.update(&txn).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ServiceError::not_found("Location"),
            other => ServiceError::from(other),
        })?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, current: location::Model) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let res = location::Entity::delete_by_id(current.id).exec(&txn).await?;
        if res.rows_affected == 0 {
            // removed by a concurrent request between lookup and delete
            return Err(ServiceError::not_found("Location"));
        }
        txn.commit().await?;
        Ok(())
    }
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use chrono::Utc;
    use sea_orm::{Set, TryIntoModel};

    #[derive(Default)]
    pub struct MockLocationRepository {
        rows: Mutex<Vec<location::Model>>, // insertion order
    }

    impl MockLocationRepository {
        pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    #[async_trait]
    impl LocationRepository for MockLocationRepository {
        async fn count(&self, scope: OwnerScope) -> Result<u64, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|r| scope.permits(r.owner_id)).count() as u64)
        }

        async fn page(&self, scope: OwnerScope, skip: u64, limit: u64) -> Result<Vec<location::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| scope.permits(r.owner_id))
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<location::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.id == id).cloned())
        }

        async fn insert(&self, owner_id: Uuid, input: NewLocation) -> Result<location::Model, ServiceError> {
            let now = Utc::now().into();
            let mut am = input.into_active_model(owner_id);
            am.id = Set(Uuid::new_v4());
            am.created_at = Set(now);
            am.updated_at = Set(now);
            let model = am.try_into_model()?;
            self.rows.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn update(&self, current: location::Model, patch: LocationPatch) -> Result<location::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|r| r.id == current.id)
                .ok_or_else(|| ServiceError::not_found("Location"))?;
            let mut am: location::ActiveModel = current.into();
            patch.apply(&mut am);
            am.updated_at = Set(Utc::now().into());
            let model = am.try_into_model()?;
            *slot = model.clone();
            Ok(model)
        }

        async fn delete(&self, current: location::Model) -> Result<(), ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != current.id);
            if rows.len() == before {
                return Err(ServiceError::not_found("Location"));
            }
            Ok(())
        }
    }
}
