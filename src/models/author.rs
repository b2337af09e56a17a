//! Author model
//!
//! Authors are bylines for blog posts, not login accounts; console access
//! is handled by `AdminAccount`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog author entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Contact email (unique)
    pub email: String,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Short biography
    pub bio: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Number of posts written (populated on list queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}

/// Input for creating an author
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthorInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Input for updating an author; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthorInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}
