//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blog category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Optional description shown on category pages
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Number of posts in this category (populated on list queries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for updating a category; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}
