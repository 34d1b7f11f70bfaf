use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use models::errors::ModelError;

use crate::auth::domain::AuthUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

#[derive(Clone)]
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn repo_err(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await.map_err(repo_err)?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| u.hashed_password))
    }

    async fn create_user(&self, email: &str, full_name: Option<&str>, password_hash: &str, is_superuser: bool) -> Result<AuthUser, AuthError> {
        if models::user::find_by_email(&self.db, email).await.map_err(repo_err)?.is_some() {
            return Err(AuthError::Conflict);
        }
        let created = models::user::create(&self.db, email, full_name, password_hash, is_superuser)
            .await
            .map_err(repo_err)?;
        Ok(created.into())
    }
}
