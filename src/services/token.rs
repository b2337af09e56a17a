//! Session token service
//!
//! Issues and verifies the signed, time-limited tokens that carry an admin's
//! identity between requests. Tokens are stateless JWTs: validity is purely
//! a function of signature and expiry, so there is no server-side session
//! store and no revocation list. Logout is client-side token disposal.
//!
//! The signing key is loaded once from configuration at startup and never
//! rotated at runtime.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{AdminAccount, AdminRole};

/// Claims embedded in a session token.
///
/// A token is trusted as-is once its signature and expiry check out; a role
/// change on the account does not invalidate tokens already issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account ID
    pub sub: i64,
    /// Account email at issue time
    pub email: String,
    /// Account role at issue time
    pub role: AdminRole,
    /// Token ID
    pub jti: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Whether the embedded role grants super admin rights
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}

/// Issues and verifies session tokens.
///
/// Constructed once from `AuthConfig` and shared through the application
/// state; verification is a pure function of (token, key, clock) with no
/// I/O, so it is unit-testable without a database.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_secret(&config.jwt_secret, Duration::hours(config.token_ttl_hours))
    }

    /// Create a token service with an explicit secret and lifetime
    pub fn with_secret(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Zero leeway keeps the expiry boundary exact
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a signed token for the given account with the configured TTL
    pub fn issue(&self, account: &AdminAccount) -> Result<String> {
        self.issue_with_ttl(account, self.ttl)
    }

    /// Issue a signed token with an explicit TTL
    pub fn issue_with_ttl(&self, account: &AdminAccount, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to sign session token")
    }

    /// Verify a token's signature and expiry.
    ///
    /// Returns the decoded claims, or `None` for a malformed token, a bad
    /// signature, or an expiry in the past. Never panics and never surfaces
    /// an error to the caller - an unverifiable token is simply invalid.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Parse an `Authorization: Bearer <token>` header value.
    ///
    /// Returns `None` for a missing header, a non-Bearer scheme, or an empty
    /// token, without ever failing.
    pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
        let token = header?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}
