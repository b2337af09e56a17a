//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog tag entity, attached to posts many-to-many
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Number of posts carrying this tag (populated on list queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}

/// Input for creating a tag
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagInput {
    pub name: String,
    pub slug: String,
}

/// Input for updating a tag; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTagInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}
