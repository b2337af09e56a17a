//! First-run seeding
//!
//! Creates the default super admin account when the accounts table is empty
//! and makes sure the fixed about-page blocks exist. Runs on every startup;
//! all steps are no-ops on an already-seeded database.

use anyhow::{Context, Result};

use super::repositories::{
    AccountRepository, SectionRepository, SqlxAccountRepository, SqlxSectionRepository,
};
use super::DbPool;
use crate::models::{AdminAccount, AdminRole};
use crate::services::password::hash_password;

/// Default credentials created on an empty database.
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_ADMIN_NAME: &str = "Admin User";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// About-page blocks that must always exist (kind, title, content).
const ABOUT_BLOCKS: &[(&str, &str, &str)] = &[
    (
        "mission",
        "Our Mission",
        "Help ambitious brands grow through honest, measurable marketing.",
    ),
    (
        "story",
        "Our Story",
        "Founded by a small team of marketers who wanted to do things differently.",
    ),
    (
        "vision",
        "Our Vision",
        "A world where great products find their audience.",
    ),
];

/// Run all seed steps.
pub async fn run_seed(pool: &DbPool) -> Result<()> {
    seed_default_admin(pool).await?;
    seed_about_blocks(pool).await?;
    Ok(())
}

/// Create the default super admin when no accounts exist yet.
///
/// Only the empty table triggers this, so a deployment that deleted or
/// replaced the default account never gets it back on restart.
async fn seed_default_admin(pool: &DbPool) -> Result<()> {
    let repo = SqlxAccountRepository::new(pool.clone());

    if repo.count().await.context("Failed to count accounts")? > 0 {
        return Ok(());
    }

    let password_hash =
        hash_password(DEFAULT_ADMIN_PASSWORD).context("Failed to hash default admin password")?;
    let account = AdminAccount::new(
        DEFAULT_ADMIN_EMAIL.to_string(),
        DEFAULT_ADMIN_NAME.to_string(),
        password_hash,
        AdminRole::SuperAdmin,
    );
    repo.create(&account)
        .await
        .context("Failed to create default admin account")?;

    tracing::warn!(
        "Created default admin account {} - change its password after first login",
        DEFAULT_ADMIN_EMAIL
    );
    Ok(())
}

/// Insert any missing about blocks.
async fn seed_about_blocks(pool: &DbPool) -> Result<()> {
    let repo = SqlxSectionRepository::new(pool.clone());
    for (kind, title, content) in ABOUT_BLOCKS {
        repo.ensure_about_block(kind, title, content).await?;
    }
    Ok(())
}
