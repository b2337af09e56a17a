//! Admin account repository
//!
//! Database operations for administrator accounts.
//!
//! This module provides:
//! - `AccountRepository` trait defining the interface for account data access
//! - `SqlxAccountRepository` implementing the trait over SQLite

use crate::db::DbPool;
use crate::models::{AdminAccount, AdminRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create a new account
    async fn create(&self, account: &AdminAccount) -> Result<AdminAccount>;

    /// Get account by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<AdminAccount>>;

    /// Get account by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminAccount>>;

    /// Update an account (name, role, password hash)
    async fn update(&self, account: &AdminAccount) -> Result<AdminAccount>;

    /// Count total accounts
    async fn count(&self) -> Result<i64>;

    /// List all accounts ordered by creation time
    async fn list(&self) -> Result<Vec<AdminAccount>>;
}

/// SQLx-based account repository implementation
pub struct SqlxAccountRepository {
    pool: DbPool,
}

impl SqlxAccountRepository {
    /// Create a new SQLx account repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn AccountRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn create(&self, account: &AdminAccount) -> Result<AdminAccount> {
        let result = sqlx::query(
            r#"
            INSERT INTO admin_accounts (email, name, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create account")?;

        let mut created = account.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<AdminAccount>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, role, created_at FROM admin_accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get account by ID")?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<AdminAccount>> {
        // The email column is COLLATE NOCASE, but normalize anyway so the
        // comparison does not depend on schema details
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, role, created_at FROM admin_accounts WHERE LOWER(email) = LOWER(?)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get account by email")?;

        row.map(|r| row_to_account(&r)).transpose()
    }

    async fn update(&self, account: &AdminAccount) -> Result<AdminAccount> {
        sqlx::query(
            "UPDATE admin_accounts SET name = ?, password_hash = ?, role = ? WHERE id = ?",
        )
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.id)
        .execute(&self.pool)
        .await
        .context("Failed to update account")?;

        self.get_by_id(account.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found after update"))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM admin_accounts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count accounts")?;

        Ok(row.get("count"))
    }

    async fn list(&self) -> Result<Vec<AdminAccount>> {
        let rows = sqlx::query(
            "SELECT id, email, name, password_hash, role, created_at FROM admin_accounts ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(row_to_account).collect()
    }
}

fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<AdminAccount> {
    let role_str: String = row.get("role");
    let role = AdminRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(AdminAccount {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
    })
}
