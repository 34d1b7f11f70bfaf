//! Acting caller and the row filter derived from it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub is_superuser: bool,
}

impl Identity {
    pub fn user(id: Uuid) -> Self { Self { id, is_superuser: false } }

    pub fn superuser(id: Uuid) -> Self { Self { id, is_superuser: true } }

    /// Superusers may act on any row; everyone else only on their own.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_superuser || self.id == owner_id
    }

    pub fn scope(&self) -> OwnerScope { OwnerScope::for_identity(self) }
}

/// Ownership predicate shared by the count query and the page query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerScope {
    All,
    Owner(Uuid),
}

impl OwnerScope {
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_superuser { OwnerScope::All } else { OwnerScope::Owner(identity.id) }
    }

    pub fn permits(&self, owner_id: Uuid) -> bool {
        match self {
            OwnerScope::All => true,
            OwnerScope::Owner(id) => *id == owner_id,
        }
    }
}
