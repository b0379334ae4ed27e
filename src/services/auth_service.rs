//! Domain service for registration, approval, and token-based authentication.
//!
//! Login is approval-gated: a registered user cannot obtain a token until an
//! admin flips their approval flag.

use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication and approval operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already registered")]
    UsernameTaken,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Account pending approval")]
    PendingApproval,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Only admins can access this")]
    AdminRequired,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Successful login: a signed bearer token plus the admin flag the frontend
/// needs to decide which controls to show.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub is_admin: bool,
}

/// Domain service trait for authentication and the approval workflow.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an unapproved, non-admin account. Never logs the user in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] if the username exists
    /// (case-sensitive exact match).
    async fn register(&self, username: &str, password: &str) -> Result<(), AuthError>;

    /// Verifies credentials and issues a time-limited token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or a
    /// wrong password (deliberately undifferentiated), and
    /// [`AuthError::PendingApproval`] when the password is correct but the
    /// account has not been approved yet.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to the current user record.
    ///
    /// The record is re-read from the store on every call, so approval or
    /// admin changes take effect on the next request without re-login.
    async fn authenticate(&self, token: &str) -> Result<User, AuthError>;

    /// All accounts still waiting for approval. Caller must be admin-gated.
    async fn list_pending(&self) -> Result<Vec<User>, AuthError>;

    /// Approves the account with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown id. Re-approving
    /// an already-approved account is a no-op success.
    async fn approve(&self, user_id: i32) -> Result<User, AuthError>;
}

/// Admin gate applied before the pending-list and approve operations.
pub fn require_admin(user: &User) -> Result<(), AuthError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AuthError::AdminRequired)
    }
}
