use sea_orm::{entity::prelude::*, ColumnTrait, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::location::Entity")]
    Location,
}

impl Related<crate::location::Entity> for Entity {
    fn to() -> RelationDef { Relation::Location.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let trimmed = email.trim();
    if trimmed.len() > 255 || !trimmed.contains('@') || trimmed.starts_with('@') || trimmed.ends_with('@') {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

/// Insert a user whose password has already been hashed.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    email: &str,
    full_name: Option<&str>,
    hashed_password: &str,
    is_superuser: bool,
) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.trim().to_ascii_lowercase()),
        full_name: Set(full_name.map(str::to_string)),
        hashed_password: Set(hashed_password.to_string()),
        is_active: Set(true),
        is_superuser: Set(is_superuser),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::Email.eq(email.trim().to_ascii_lowercase()))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> Result<Model, errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::Validation("user not found".into()))?
        .into();
    found.is_active = Set(active);
    Ok(found.update(db).await?)
}
