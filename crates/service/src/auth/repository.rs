use async_trait::async_trait;
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;
    async fn create_user(&self, email: &str, full_name: Option<&str>, password_hash: &str, is_superuser: bool) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, (AuthUser, String)>>, // key: user_id
    }

    impl MockAuthRepository {
        pub fn set_active(&self, id: Uuid, active: bool) {
            if let Some((u, _)) = self.users.lock().unwrap().get_mut(&id) {
                u.is_active = active;
            }
        }

        pub fn remove(&self, id: Uuid) {
            self.users.lock().unwrap().remove(&id);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            let email = email.trim().to_ascii_lowercase();
            Ok(users.values().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).map(|(u, _)| u.clone()))
        }

        async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&user_id).map(|(_, h)| h.clone()))
        }

        async fn create_user(&self, email: &str, full_name: Option<&str>, password_hash: &str, is_superuser: bool) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            let email = email.trim().to_ascii_lowercase();
            if users.values().any(|(u, _)| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email,
                full_name: full_name.map(str::to_string),
                is_active: true,
                is_superuser,
            };
            users.insert(user.id, (user.clone(), password_hash.to_string()));
            Ok(user)
        }
    }
}
