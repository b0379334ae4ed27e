use anyhow::Context;
use tokio::task;
use tracing::info;

use crate::config::{AuthConfig, SecurityConfig};
use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::token::TokenService;

use crate::db::repositories::user::{hash_password, verify_password};

/// `AuthService` backed by the sea-orm store.
pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    /// Seeds the default admin account if it doesn't exist yet. Idempotent,
    /// run once at startup rather than per request.
    pub async fn ensure_bootstrap_admin(&self, config: &AuthConfig) -> anyhow::Result<()> {
        let username = &config.bootstrap_admin_username;

        if self.store.get_user_by_username(username).await?.is_some() {
            return Ok(());
        }

        let password = config.bootstrap_admin_password.clone();
        let security = self.security.clone();
        let hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        match self.store.insert_user(username, &hash, true, true).await {
            Ok(_) => {
                info!("Seeded bootstrap admin account '{username}'");
                Ok(())
            }
            // Another process won the startup race; the account exists.
            Err(err) if is_unique_violation(&err) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Argon2 is CPU-intensive and would stall the async runtime if run
    /// directly, so hashing goes through a blocking task.
    async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let security = self.security.clone();

        task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let hash = self.hash_blocking(password).await?;

        match self.store.insert_user(username, &hash, false, false).await {
            Ok(_) => {
                info!("Registered '{username}', pending approval");
                Ok(())
            }
            // Lost a concurrent-registration race at the unique constraint
            Err(err) if is_unique_violation(&err) => Err(AuthError::UsernameTaken),
            Err(err) => Err(err.into()),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let Some((user, password_hash)) = self
            .store
            .get_user_by_username_with_password(username)
            .await?
        else {
            // Unknown user and wrong password are deliberately the same error
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_approved {
            return Err(AuthError::PendingApproval);
        }

        let access_token = self
            .tokens
            .issue(&user.username)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!("User '{}' logged in", user.username);

        Ok(LoginResult {
            access_token,
            is_admin: user.is_admin,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::InvalidToken)?;

        // Re-read so approval/admin changes bite without re-login
        self.store
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    async fn list_pending(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.store.list_pending_users().await?)
    }

    async fn approve(&self, user_id: i32) -> Result<User, AuthError> {
        match self.store.approve_user(user_id).await? {
            Some(user) => {
                info!("User '{}' approved", user.username);
                Ok(user)
            }
            None => Err(AuthError::UserNotFound),
        }
    }
}

/// Whether an error chain bottoms out in the store's unique-constraint
/// violation (the loser of a concurrent insert race).
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<sea_orm::DbErr>())
        .any(|db_err| {
            matches!(
                db_err.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            )
        })
}
