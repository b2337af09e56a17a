//! Admin account model
//!
//! Defines the `AdminAccount` entity and the role enum used for
//! authorization. Accounts operate the admin console; site visitors have no
//! account at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An administrator account for the CMS console.
///
/// Accounts are created through registration (super admins only) and are
/// never hard-deleted. The password hash is opaque Argon2id PHC text and is
/// excluded from serialization so it can never leak into a response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique, compared case-insensitively)
    pub email: String,
    /// Display name
    pub name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: AdminRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AdminAccount {
    /// Create a new account with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(email: String, name: String, password_hash: String, role: AdminRole) -> Self {
        Self {
            id: 0, // Will be set by the database
            email,
            name,
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    /// Check if the account holds the super admin role
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}

/// Role for authorization.
///
/// - SuperAdmin: full access, including creating new accounts
/// - Editor: full content access, cannot manage accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    /// Editor - manages content
    #[serde(rename = "EDITOR")]
    Editor,
    /// Super admin - manages content and accounts
    #[serde(rename = "SUPER_ADMIN")]
    SuperAdmin,
}

impl Default for AdminRole {
    fn default() -> Self {
        Self::Editor
    }
}

impl AdminRole {
    /// Database/wire string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Editor => "EDITOR",
            AdminRole::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EDITOR" => Ok(AdminRole::Editor),
            "SUPER_ADMIN" => Ok(AdminRole::SuperAdmin),
            _ => Err(anyhow::anyhow!("Invalid admin role: {}", s)),
        }
    }
}

/// Input for creating a new account (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// Role (defaults to Editor)
    pub role: AdminRole,
}
