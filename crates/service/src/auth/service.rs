use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AccessToken, AuthSession, AuthUser, Claims, LoginInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: Duration::minutes(ttl_minutes) }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string())
    }

    /// Create a user with a hashed password.
    #[instrument(skip(self, password), fields(email = %email, superuser = is_superuser))]
    pub async fn create_user(&self, email: &str, password: &str, full_name: Option<&str>, is_superuser: bool) -> Result<AuthUser, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        let hash = self.hash_password(password)?;
        let user = self.repo.create_user(email, full_name, &hash, is_superuser).await?;
        info!(user_id = %user.id, email = %user.email, "user_created");
        Ok(user)
    }

    /// Create the bootstrap superuser unless a user with that email exists.
    pub async fn ensure_superuser(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            debug!(user_id = %existing.id, "first superuser already present");
            return Ok(existing);
        }
        self.create_user(email, password, None, true).await
    }

    /// Authenticate by email and password and issue an access token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let hash = self.repo
            .get_password_hash(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        let token = self.issue_token(user.id)?;
        info!(user_id = %user.id, "login_ok");
        Ok(AuthSession { user, token: AccessToken::bearer(token) })
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.cfg.token_ttl).timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature and expiry, returning the subject user id.
    pub fn decode_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            debug!(err = %e, "token validation failed");
            AuthError::InvalidToken
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    /// Resolve a bearer token to an active user.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let user_id = self.decode_token(token)?;
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)?;
        if !user.is_active {
            return Err(AuthError::Inactive);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (AuthService<MockAuthRepository>, Arc<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let cfg = AuthConfig { jwt_secret: "test-secret".into(), token_ttl: Duration::minutes(30) };
        (AuthService::new(repo.clone(), cfg), repo)
    }

    #[tokio::test]
    async fn login_issues_token_that_authenticates() {
        let (svc, _) = svc();
        let user = svc.create_user("u1@example.com", "Passw0rd!", Some("U One"), false).await.unwrap();
        let session = svc
            .login(LoginInput { email: "U1@example.com".into(), password: "Passw0rd!".into() })
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.token.token_type, "bearer");

        let resolved = svc.authenticate(&session.token.access_token).await.unwrap();
        assert_eq!(resolved.identity(), user.identity());
        assert!(!resolved.identity().is_superuser);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let (svc, _) = svc();
        svc.create_user("u1@example.com", "Passw0rd!", None, false).await.unwrap();
        let bad = svc.login(LoginInput { email: "u1@example.com".into(), password: "nope-nope".into() }).await;
        assert!(matches!(bad, Err(AuthError::Unauthorized)));
        let unknown = svc.login(LoginInput { email: "x@example.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(unknown, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn inactive_user_cannot_log_in_or_authenticate() {
        let (svc, repo) = svc();
        let user = svc.create_user("u1@example.com", "Passw0rd!", None, false).await.unwrap();
        let token = svc.issue_token(user.id).unwrap();
        repo.set_active(user.id, false);

        let res = svc.login(LoginInput { email: "u1@example.com".into(), password: "Passw0rd!".into() }).await;
        assert!(matches!(res, Err(AuthError::Inactive)));
        assert!(matches!(svc.authenticate(&token).await, Err(AuthError::Inactive)));
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_not_found() {
        let (svc, repo) = svc();
        let user = svc.create_user("u1@example.com", "Passw0rd!", None, false).await.unwrap();
        let token = svc.issue_token(user.id).unwrap();
        repo.remove(user.id);
        assert!(matches!(svc.authenticate(&token).await, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let (svc, _) = svc();
        assert!(matches!(svc.decode_token("not-a-jwt"), Err(AuthError::InvalidToken)));

        let other = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "other-secret".into(), token_ttl: Duration::minutes(30) },
        );
        let foreign = other.issue_token(Uuid::new_v4()).unwrap();
        assert!(matches!(svc.decode_token(&foreign), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo, AuthConfig { jwt_secret: "s".into(), token_ttl: Duration::minutes(-10) });
        let token = svc.issue_token(Uuid::new_v4()).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn ensure_superuser_is_idempotent() {
        let (svc, _) = svc();
        let first = svc.ensure_superuser("admin@example.com", "changethis").await.unwrap();
        assert!(first.is_superuser);
        let again = svc.ensure_superuser("admin@example.com", "changethis").await.unwrap();
        assert_eq!(first.id, again.id);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let (svc, _) = svc();
        let res = svc.create_user("u1@example.com", "short", None, false).await;
        assert!(matches!(res, Err(AuthError::Validation(_))));
    }
}
