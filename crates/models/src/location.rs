//! `location` entity: a geographic fix owned by exactly one user.
//!
//! Besides the sea-orm entity this module holds the two input shapes the
//! resource accepts: [`NewLocation`] for creation and [`LocationPatch`] for
//! partial updates. Neither carries `id` or `owner_id`; those are assigned by
//! the server and never change afterwards.

use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use chrono::Utc;

use crate::errors;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1024;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub item_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub latitude: f64,
    #[sea_orm(column_type = "Double")]
    pub longitude: f64,
    pub datetime: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::user::Entity",
        from = "Column::OwnerId",
        to = "crate::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Owner.def() }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Server-side defaults: a fresh id on insert, timestamps on every write.
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = Utc::now().into();
        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(errors::ModelError::Validation(format!("name longer than {MAX_NAME_LEN} characters")));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(errors::ModelError::Validation(format!(
            "description longer than {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_latitude(lat: f64) -> Result<(), errors::ModelError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(errors::ModelError::Validation("latitude must be within -90..=90".into()));
    }
    Ok(())
}

pub fn validate_longitude(lon: f64) -> Result<(), errors::ModelError> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(errors::ModelError::Validation("longitude must be within -180..=180".into()));
    }
    Ok(())
}

/// Fields a caller supplies when creating a location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    #[serde(default)]
    pub item_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub datetime: DateTimeWithTimeZone,
}

impl NewLocation {
    pub fn validate(&self) -> Result<(), errors::ModelError> {
        validate_name(&self.name)?;
        if let Some(d) = &self.description {
            validate_description(d)?;
        }
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)?;
        Ok(())
    }

    /// Active model ready for insert; `id` and timestamps are left to
    /// `before_save`.
    pub fn into_active_model(self, owner_id: Uuid) -> ActiveModel {
        ActiveModel {
            owner_id: Set(owner_id),
            item_id: Set(self.item_id),
            name: Set(self.name),
            description: Set(self.description),
            latitude: Set(self.latitude),
            longitude: Set(self.longitude),
            datetime: Set(self.datetime),
            ..Default::default()
        }
    }
}

/// Partial update. The outer `Option` records whether the caller sent the key
/// at all; the inner one whether the value was `null`. Keys that are not
/// listed here (`id`, `owner_id`, timestamps) are ignored on input.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LocationPatch {
    #[serde(default, deserialize_with = "double_option")]
    pub item_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub datetime: Option<Option<DateTimeWithTimeZone>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

fn required<T: Copy>(field: &str, v: Option<Option<T>>) -> Result<Option<T>, errors::ModelError> {
    match v {
        Some(None) => Err(errors::ModelError::Validation(format!("{field} cannot be null"))),
        Some(Some(x)) => Ok(Some(x)),
        None => Ok(None),
    }
}

impl LocationPatch {
    pub fn is_empty(&self) -> bool {
        self.item_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.datetime.is_none()
    }

    /// Names of the keys the caller supplied, for logging.
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.item_id.is_some() { out.push("item_id"); }
        if self.name.is_some() { out.push("name"); }
        if self.description.is_some() { out.push("description"); }
        if self.latitude.is_some() { out.push("latitude"); }
        if self.longitude.is_some() { out.push("longitude"); }
        if self.datetime.is_some() { out.push("datetime"); }
        out
    }

    pub fn validate(&self) -> Result<(), errors::ModelError> {
        match &self.name {
            Some(Some(n)) => validate_name(n)?,
            Some(None) => return Err(errors::ModelError::Validation("name cannot be null".into())),
            None => {}
        }
        if let Some(Some(d)) = &self.description {
            validate_description(d)?;
        }
        if let Some(lat) = required("latitude", self.latitude)? {
            validate_latitude(lat)?;
        }
        if let Some(lon) = required("longitude", self.longitude)? {
            validate_longitude(lon)?;
        }
        required("datetime", self.datetime)?;
        Ok(())
    }

    /// Copy every supplied field onto `am`. Call [`LocationPatch::validate`]
    /// first; a `null` for a non-nullable column is skipped here.
    pub fn apply(self, am: &mut ActiveModel) {
        if let Some(item_id) = self.item_id {
            am.item_id = Set(item_id);
        }
        if let Some(Some(name)) = self.name {
            am.name = Set(name);
        }
        if let Some(description) = self.description {
            am.description = Set(description);
        }
        if let Some(Some(lat)) = self.latitude {
            am.latitude = Set(lat);
        }
        if let Some(Some(lon)) = self.longitude {
            am.longitude = Set(lon);
        }
        if let Some(Some(dt)) = self.datetime {
            am.datetime = Set(dt);
        }
    }
}

/// Insert a location for `owner_id` and return the stored row.
pub async fn create<C: ConnectionTrait>(db: &C, owner_id: Uuid, input: NewLocation) -> Result<Model, errors::ModelError> {
    input.validate()?;
    Ok(input.into_active_model(owner_id).insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> NewLocation {
        NewLocation {
            item_id: None,
            name: "Warehouse A".into(),
            description: Some("north dock".into()),
            latitude: -6.2088,
            longitude: 106.8456,
            datetime: Utc::now().into(),
        }
    }

    #[test]
    fn new_location_rejects_out_of_range_coordinates() {
        let mut input = sample();
        assert!(input.validate().is_ok());
        input.latitude = 91.0;
        assert!(input.validate().is_err());
        input.latitude = 0.0;
        input.longitude = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn new_location_rejects_blank_and_long_names() {
        let mut input = sample();
        input.name = "   ".into();
        assert!(input.validate().is_err());
        input.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: LocationPatch = serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.name, None);
        assert_eq!(patch.present_fields(), vec!["description"]);
    }

    #[test]
    fn patch_ignores_identity_and_owner_keys() {
        let patch: LocationPatch = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "owner_id": Uuid::new_v4(),
            "latitude": 1.5
        }))
        .unwrap();
        assert_eq!(patch.present_fields(), vec!["latitude"]);
    }

    #[test]
    fn patch_rejects_null_for_required_columns() {
        let patch: LocationPatch = serde_json::from_value(json!({ "name": null })).unwrap();
        assert!(patch.validate().is_err());
        let patch: LocationPatch = serde_json::from_value(json!({ "longitude": null })).unwrap();
        assert!(patch.validate().is_err());
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let owner = Uuid::new_v4();
        let mut am = sample().into_active_model(owner);
        let patch: LocationPatch = serde_json::from_value(json!({ "name": "Warehouse B", "description": null })).unwrap();
        patch.validate().unwrap();
        patch.apply(&mut am);

        assert_eq!(am.name, Set("Warehouse B".to_string()));
        assert_eq!(am.description, Set(None));
        assert_eq!(am.latitude, Set(-6.2088));
        assert_eq!(am.owner_id, Set(owner));
    }

    #[test]
    fn empty_patch_is_empty() {
        let patch: LocationPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());
        assert!(patch.validate().is_ok());
    }
}
