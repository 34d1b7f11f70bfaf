use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Identity;

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl AuthUser {
    pub fn identity(&self) -> Identity {
        Identity { id: self.id, is_superuser: self.is_superuser }
    }
}

impl From<models::user::Model> for AuthUser {
    fn from(u: models::user::Model) -> Self {
        Self { id: u.id, email: u.email, full_name: u.full_name, is_active: u.is_active, is_superuser: u.is_superuser }
    }
}

/// Bearer token handed out by login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(token: String) -> Self {
        Self { access_token: token, token_type: "bearer".into() }
    }
}

/// JWT claims; `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: AccessToken,
}
