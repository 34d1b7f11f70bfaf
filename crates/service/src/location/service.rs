use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use common::types::Message;
use models::location::{self, LocationPatch, NewLocation};

use crate::errors::ServiceError;
use crate::identity::Identity;
use crate::location::repository::LocationRepository;
use crate::location::{LocationsPage, DELETED_MESSAGE};
use crate::pagination::ListParams;

/// Application service for the location resource.
///
/// Every operation takes the acting [`Identity`] explicitly. Lookups report
/// `NotFound` before ownership is considered; a non-superuser touching a row
/// owned by someone else gets `Forbidden`.
pub struct LocationService<R: LocationRepository> {
    repo: Arc<R>,
}

impl<R: LocationRepository> LocationService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Page of locations visible to `identity` plus their total count.
    #[instrument(skip(self), fields(user_id = %identity.id, superuser = identity.is_superuser))]
    pub async fn list(&self, identity: &Identity, params: ListParams) -> Result<LocationsPage, ServiceError> {
        let scope = identity.scope();
        let count = self.repo.count(scope).await?;
        let data = self.repo.page(scope, params.skip, params.limit).await?;
        debug!(count, returned = data.len(), skip = params.skip, limit = params.limit, "list locations");
        Ok(LocationsPage { data, count })
    }

    #[instrument(skip(self), fields(user_id = %identity.id, location_id = %id))]
    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<location::Model, ServiceError> {
        self.load_authorized(identity, id).await
    }

    /// Create a location owned by `identity`.
    #[instrument(skip(self, input), fields(user_id = %identity.id))]
    pub async fn create(&self, identity: &Identity, input: NewLocation) -> Result<location::Model, ServiceError> {
        input.validate()?;
        let created = self.repo.insert(identity.id, input).await?;
        info!(location_id = %created.id, owner_id = %created.owner_id, "location_created");
        Ok(created)
    }

    /// Apply only the fields present in `patch`; `id` and `owner_id` are
    /// never part of it.
    #[instrument(skip(self, patch), fields(user_id = %identity.id, location_id = %id))]
    pub async fn update(&self, identity: &Identity, id: Uuid, patch: LocationPatch) -> Result<location::Model, ServiceError> {
        patch.validate()?;
        let current = self.load_authorized(identity, id).await?;
        let fields = patch.present_fields();
        let updated = self.repo.update(current, patch).await?;
        info!(location_id = %updated.id, ?fields, "location_updated");
        Ok(updated)
    }

    /// Permanently remove the row. A second call for the same id is `NotFound`.
    #[instrument(skip(self), fields(user_id = %identity.id, location_id = %id))]
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<Message, ServiceError> {
        let current = self.load_authorized(identity, id).await?;
        self.repo.delete(current).await?;
        info!(location_id = %id, "location_deleted");
        Ok(Message::new(DELETED_MESSAGE))
    }

    async fn load_authorized(&self, identity: &Identity, id: Uuid) -> Result<location::Model, ServiceError> {
        let found = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("Location"))?;
        if !identity.can_access(found.owner_id) {
            warn!(location_id = %id, owner_id = %found.owner_id, user_id = %identity.id, "location_access_denied");
            return Err(ServiceError::Forbidden);
        }
        Ok(found)
    }
}
