//! Account service
//!
//! Implements business logic for admin accounts:
//! - Login with email and password, returning a session token
//! - Registration (authorization is checked by the caller; only super
//!   admins may reach this operation)
//! - Account lookups for token verification

use crate::config::PasswordPolicy;
use crate::db::repositories::AccountRepository;
use crate::models::{AdminAccount, AdminRole, CreateAccountInput};
use crate::services::password::{hash_password, validate_strength, verify_password};
use crate::services::token::TokenService;
use anyhow::Context;
use std::sync::Arc;

/// Error types for account service operations
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Password fails the strength policy
    #[error("Password validation failed")]
    WeakPassword(Vec<String>),

    /// An account with this email already exists
    #[error("Account already exists: {0}")]
    AccountExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Account service for authentication and account management
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
    password_policy: PasswordPolicy,
}

impl AccountService {
    /// Create a new account service
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            repo,
            tokens,
            password_policy,
        }
    }

    /// Login with email and password.
    ///
    /// Email comparison is case-insensitive. On success returns the account
    /// and a freshly issued session token. A missing account and a wrong
    /// password produce the same error so the endpoint does not reveal
    /// which emails are registered.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AdminAccount, String), AccountServiceError> {
        let account = self
            .repo
            .get_by_email(email)
            .await
            .context("Failed to look up account")?
            .ok_or_else(|| {
                AccountServiceError::AuthenticationError("Invalid email or password".to_string())
            })?;

        if !verify_password(password, &account.password_hash) {
            return Err(AccountServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self
            .tokens
            .issue(&account)
            .context("Failed to issue session token")?;

        Ok((account, token))
    }

    /// Register a new account.
    ///
    /// Validates input and password strength, rejects duplicate emails, and
    /// stores only the password hash. The caller is responsible for the
    /// super-admin authorization check before invoking this.
    pub async fn register(
        &self,
        input: CreateAccountInput,
    ) -> Result<AdminAccount, AccountServiceError> {
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(AccountServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if input.name.trim().is_empty() {
            return Err(AccountServiceError::ValidationError(
                "Name is required".to_string(),
            ));
        }

        let report = validate_strength(&input.password, &self.password_policy);
        if !report.is_valid {
            return Err(AccountServiceError::WeakPassword(report.errors));
        }

        if self
            .repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(AccountServiceError::AccountExists(format!(
                "An account with email '{}' already exists",
                input.email
            )));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let account = AdminAccount::new(input.email, input.name, password_hash, input.role);

        let created = self
            .repo
            .create(&account)
            .await
            .context("Failed to create account")?;

        Ok(created)
    }

    /// Get account by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<AdminAccount>, AccountServiceError> {
        let account = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get account by ID")?;

        Ok(account)
    }

    /// List all accounts
    pub async fn list(&self) -> Result<Vec<AdminAccount>, AccountServiceError> {
        let accounts = self.repo.list().await.context("Failed to list accounts")?;
        Ok(accounts)
    }
}

// Convenience constructor used by tests and seeding paths
impl AccountService {
    /// Build a service over an existing pool with default policy
    pub fn from_parts(
        repo: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self::new(repo, tokens, PasswordPolicy::default())
    }
}
