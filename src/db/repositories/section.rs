//! Marketing section repository
//!
//! Database operations for the static marketing content: services, team
//! members, portfolio projects, and about blocks. These are small ordered
//! lists; mutations replace the full row rather than patching fields.

use crate::db::DbPool;
use crate::models::section::{
    AboutBlock, PortfolioProject, PortfolioProjectInput, Service, ServiceInput, TeamMember,
    TeamMemberInput, UpdateAboutBlockInput,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

/// Marketing section repository trait
#[async_trait]
pub trait SectionRepository: Send + Sync {
    async fn list_services(&self) -> Result<Vec<Service>>;
    async fn get_service(&self, id: i64) -> Result<Option<Service>>;
    async fn create_service(&self, input: &ServiceInput) -> Result<Service>;
    async fn update_service(&self, id: i64, input: &ServiceInput) -> Result<Service>;
    async fn delete_service(&self, id: i64) -> Result<()>;

    async fn list_team_members(&self) -> Result<Vec<TeamMember>>;
    async fn get_team_member(&self, id: i64) -> Result<Option<TeamMember>>;
    async fn create_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember>;
    async fn update_team_member(&self, id: i64, input: &TeamMemberInput) -> Result<TeamMember>;
    async fn delete_team_member(&self, id: i64) -> Result<()>;

    async fn list_projects(&self) -> Result<Vec<PortfolioProject>>;
    async fn get_project(&self, id: i64) -> Result<Option<PortfolioProject>>;
    async fn create_project(&self, input: &PortfolioProjectInput) -> Result<PortfolioProject>;
    async fn update_project(
        &self,
        id: i64,
        input: &PortfolioProjectInput,
    ) -> Result<PortfolioProject>;
    async fn delete_project(&self, id: i64) -> Result<()>;

    async fn list_about_blocks(&self) -> Result<Vec<AboutBlock>>;
    async fn get_about_block(&self, id: i64) -> Result<Option<AboutBlock>>;
    async fn update_about_block(
        &self,
        id: i64,
        input: &UpdateAboutBlockInput,
    ) -> Result<AboutBlock>;
    /// Insert an about block if its kind is not present yet (seeding only)
    async fn ensure_about_block(&self, kind: &str, title: &str, content: &str) -> Result<()>;
}

/// SQLx-based section repository implementation
pub struct SqlxSectionRepository {
    pool: DbPool,
}

impl SqlxSectionRepository {
    /// Create a new SQLx section repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn SectionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SectionRepository for SqlxSectionRepository {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query(
            "SELECT id, title, description, icon, included, sort_order, created_at FROM services ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list services")?;

        rows.iter().map(row_to_service).collect()
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>> {
        let row = sqlx::query(
            "SELECT id, title, description, icon, included, sort_order, created_at FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get service")?;

        row.map(|r| row_to_service(&r)).transpose()
    }

    async fn create_service(&self, input: &ServiceInput) -> Result<Service> {
        let now = Utc::now();
        let included = serde_json::to_string(&input.included)
            .context("Failed to serialize service bullet list")?;

        let result = sqlx::query(
            "INSERT INTO services (title, description, icon, included, sort_order, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&included)
        .bind(input.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create service")?;

        Ok(Service {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            description: input.description.clone(),
            icon: input.icon.clone(),
            included: input.included.clone(),
            sort_order: input.sort_order,
            created_at: now,
        })
    }

    async fn update_service(&self, id: i64, input: &ServiceInput) -> Result<Service> {
        let included = serde_json::to_string(&input.included)
            .context("Failed to serialize service bullet list")?;

        sqlx::query(
            "UPDATE services SET title = ?, description = ?, icon = ?, included = ?, sort_order = ? WHERE id = ?",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&included)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update service")?;

        self.get_service(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Service not found after update"))
    }

    async fn delete_service(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete service")?;
        Ok(())
    }

    async fn list_team_members(&self) -> Result<Vec<TeamMember>> {
        let rows = sqlx::query(
            "SELECT id, name, role, image, sort_order, created_at FROM team_members ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list team members")?;

        Ok(rows.iter().map(row_to_team_member).collect())
    }

    async fn get_team_member(&self, id: i64) -> Result<Option<TeamMember>> {
        let row = sqlx::query(
            "SELECT id, name, role, image, sort_order, created_at FROM team_members WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get team member")?;

        Ok(row.map(|r| row_to_team_member(&r)))
    }

    async fn create_team_member(&self, input: &TeamMemberInput) -> Result<TeamMember> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO team_members (name, role, image, sort_order, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.role)
        .bind(&input.image)
        .bind(input.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create team member")?;

        Ok(TeamMember {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            role: input.role.clone(),
            image: input.image.clone(),
            sort_order: input.sort_order,
            created_at: now,
        })
    }

    async fn update_team_member(&self, id: i64, input: &TeamMemberInput) -> Result<TeamMember> {
        sqlx::query(
            "UPDATE team_members SET name = ?, role = ?, image = ?, sort_order = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.role)
        .bind(&input.image)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update team member")?;

        self.get_team_member(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Team member not found after update"))
    }

    async fn delete_team_member(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM team_members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete team member")?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<PortfolioProject>> {
        let rows = sqlx::query(
            "SELECT id, title, category, description, image, metric, metric_label, sort_order, created_at FROM portfolio_projects ORDER BY sort_order ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list portfolio projects")?;

        Ok(rows.iter().map(row_to_project).collect())
    }

    async fn get_project(&self, id: i64) -> Result<Option<PortfolioProject>> {
        let row = sqlx::query(
            "SELECT id, title, category, description, image, metric, metric_label, sort_order, created_at FROM portfolio_projects WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get portfolio project")?;

        Ok(row.map(|r| row_to_project(&r)))
    }

    async fn create_project(&self, input: &PortfolioProjectInput) -> Result<PortfolioProject> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO portfolio_projects (title, category, description, image, metric, metric_label, sort_order, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.title)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.metric)
        .bind(&input.metric_label)
        .bind(input.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create portfolio project")?;

        Ok(PortfolioProject {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            category: input.category.clone(),
            description: input.description.clone(),
            image: input.image.clone(),
            metric: input.metric.clone(),
            metric_label: input.metric_label.clone(),
            sort_order: input.sort_order,
            created_at: now,
        })
    }

    async fn update_project(
        &self,
        id: i64,
        input: &PortfolioProjectInput,
    ) -> Result<PortfolioProject> {
        sqlx::query(
            "UPDATE portfolio_projects SET title = ?, category = ?, description = ?, image = ?, metric = ?, metric_label = ?, sort_order = ? WHERE id = ?",
        )
        .bind(&input.title)
        .bind(&input.category)
        .bind(&input.description)
        .bind(&input.image)
        .bind(&input.metric)
        .bind(&input.metric_label)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update portfolio project")?;

        self.get_project(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Portfolio project not found after update"))
    }

    async fn delete_project(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM portfolio_projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete portfolio project")?;
        Ok(())
    }

    async fn list_about_blocks(&self) -> Result<Vec<AboutBlock>> {
        let rows = sqlx::query(
            "SELECT id, kind, title, content, icon FROM about_blocks ORDER BY kind ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list about blocks")?;

        Ok(rows.iter().map(row_to_about_block).collect())
    }

    async fn get_about_block(&self, id: i64) -> Result<Option<AboutBlock>> {
        let row = sqlx::query("SELECT id, kind, title, content, icon FROM about_blocks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get about block")?;

        Ok(row.map(|r| row_to_about_block(&r)))
    }

    async fn update_about_block(
        &self,
        id: i64,
        input: &UpdateAboutBlockInput,
    ) -> Result<AboutBlock> {
        let existing = self
            .get_about_block(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("About block not found"))?;

        let new_title = input.title.as_ref().unwrap_or(&existing.title);
        let new_content = input.content.as_ref().unwrap_or(&existing.content);
        let new_icon = input.icon.clone().or(existing.icon.clone());

        sqlx::query("UPDATE about_blocks SET title = ?, content = ?, icon = ? WHERE id = ?")
            .bind(new_title)
            .bind(new_content)
            .bind(&new_icon)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update about block")?;

        self.get_about_block(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("About block not found after update"))
    }

    async fn ensure_about_block(&self, kind: &str, title: &str, content: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO about_blocks (kind, title, content) VALUES (?, ?, ?) ON CONFLICT(kind) DO NOTHING",
        )
        .bind(kind)
        .bind(title)
        .bind(content)
        .execute(&self.pool)
        .await
        .context("Failed to seed about block")?;
        Ok(())
    }
}

fn row_to_service(row: &sqlx::sqlite::SqliteRow) -> Result<Service> {
    let included_json: String = row.get("included");
    let included = serde_json::from_str(&included_json)
        .context("Invalid service bullet list in database")?;

    Ok(Service {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        icon: row.get("icon"),
        included,
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    })
}

fn row_to_team_member(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        role: row.get("role"),
        image: row.get("image"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> PortfolioProject {
    PortfolioProject {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        description: row.get("description"),
        image: row.get("image"),
        metric: row.get("metric"),
        metric_label: row.get("metric_label"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

fn row_to_about_block(row: &sqlx::sqlite::SqliteRow) -> AboutBlock {
    AboutBlock {
        id: row.get("id"),
        kind: row.get("kind"),
        title: row.get("title"),
        content: row.get("content"),
        icon: row.get("icon"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxSectionRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxSectionRepository::new(pool)
    }

    #[tokio::test]
    async fn test_service_crud_roundtrip() {
        let repo = setup_test_repo().await;

        let created = repo
            .create_service(&ServiceInput {
                title: "SEO Audit".to_string(),
                description: "Technical and content audit".to_string(),
                icon: "search".to_string(),
                included: vec!["Keyword research".to_string(), "Site crawl".to_string()],
                sort_order: 1,
            })
            .await
            .expect("create");
        assert!(created.id > 0);
        assert_eq!(created.included.len(), 2);

        let fetched = repo
            .get_service(created.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(fetched.included, created.included);

        let updated = repo
            .update_service(
                created.id,
                &ServiceInput {
                    title: "Full SEO Audit".to_string(),
                    description: created.description.clone(),
                    icon: created.icon.clone(),
                    included: vec!["Site crawl".to_string()],
                    sort_order: 2,
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.title, "Full SEO Audit");
        assert_eq!(updated.included.len(), 1);

        repo.delete_service(created.id).await.expect("delete");
        assert!(repo.get_service(created.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_services_ordered_by_sort_order() {
        let repo = setup_test_repo().await;

        for (title, order) in [("Second", 2), ("First", 1)] {
            repo.create_service(&ServiceInput {
                title: title.to_string(),
                description: "d".to_string(),
                icon: "i".to_string(),
                included: Vec::new(),
                sort_order: order,
            })
            .await
            .expect("create");
        }

        let services = repo.list_services().await.expect("list");
        assert_eq!(services[0].title, "First");
        assert_eq!(services[1].title, "Second");
    }

    #[tokio::test]
    async fn test_team_member_crud() {
        let repo = setup_test_repo().await;

        let created = repo
            .create_team_member(&TeamMemberInput {
                name: "Jane Doe".to_string(),
                role: "Creative Director".to_string(),
                image: "https://example.com/jane.jpg".to_string(),
                sort_order: 0,
            })
            .await
            .expect("create");

        let members = repo.list_team_members().await.expect("list");
        assert_eq!(members.len(), 1);

        repo.delete_team_member(created.id).await.expect("delete");
        assert!(repo.list_team_members().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_about_block_seed_and_update() {
        let repo = setup_test_repo().await;

        repo.ensure_about_block("mission", "Our Mission", "Default mission text")
            .await
            .expect("seed");
        // Seeding again is a no-op
        repo.ensure_about_block("mission", "Overwritten?", "No")
            .await
            .expect("seed");

        let blocks = repo.list_about_blocks().await.expect("list");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Our Mission");

        let updated = repo
            .update_about_block(
                blocks[0].id,
                &UpdateAboutBlockInput {
                    content: Some("We build brands.".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.content, "We build brands.");
        assert_eq!(updated.title, "Our Mission");
    }
}
