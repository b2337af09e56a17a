//! Marketing section models
//!
//! Entities backing the static marketing pages: service offerings, team
//! members, portfolio projects, and the about-page content blocks. All are
//! small ordered lists edited from the console; about blocks are fixed rows
//! keyed by kind and can only be updated, never created or deleted via the
//! API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service offering shown on the services page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Icon identifier resolved by the frontend
    pub icon: String,
    /// Bullet list of what the service includes
    pub included: Vec<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a service
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    pub title: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub included: Vec<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A team member shown on the team page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    /// Job title, e.g. "Creative Director"
    pub role: String,
    /// Portrait image URL
    pub image: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a team member
#[derive(Debug, Clone, Deserialize)]
pub struct TeamMemberInput {
    pub name: String,
    pub role: String,
    pub image: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// A portfolio case study shown on the work page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioProject {
    pub id: i64,
    pub title: String,
    /// Vertical, e.g. "E-commerce"
    pub category: String,
    pub description: String,
    pub image: String,
    /// Headline result figure, e.g. "+240%"
    pub metric: String,
    /// Label for the metric, e.g. "organic traffic"
    pub metric_label: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a portfolio project
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioProjectInput {
    pub title: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub metric: String,
    pub metric_label: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// A content block on the about page, keyed by kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutBlock {
    pub id: i64,
    /// Block identifier, e.g. "mission", "vision", "story"
    pub kind: String,
    pub title: String,
    pub content: String,
    pub icon: Option<String>,
}

/// Update for an about block; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAboutBlockInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub icon: Option<String>,
}
