//! Marketing section service
//!
//! Thin business layer over the marketing-content tables. Validation here
//! is light: these are operator-edited lists, so only the fields a public
//! page cannot render without are enforced.

use crate::db::repositories::SectionRepository;
use crate::models::section::{
    AboutBlock, PortfolioProject, PortfolioProjectInput, Service, ServiceInput, TeamMember,
    TeamMemberInput, UpdateAboutBlockInput,
};
use anyhow::Context;
use std::sync::Arc;

/// Error types for section service operations
#[derive(Debug, thiserror::Error)]
pub enum SectionServiceError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Marketing section service
pub struct SectionService {
    repo: Arc<dyn SectionRepository>,
}

impl SectionService {
    /// Create a new section service
    pub fn new(repo: Arc<dyn SectionRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, SectionServiceError> {
        let services = self
            .repo
            .list_services()
            .await
            .context("Failed to list services")?;
        Ok(services)
    }

    pub async fn create_service(
        &self,
        input: ServiceInput,
    ) -> Result<Service, SectionServiceError> {
        require(&input.title, "title")?;
        require(&input.description, "description")?;

        let service = self
            .repo
            .create_service(&input)
            .await
            .context("Failed to create service")?;
        Ok(service)
    }

    pub async fn update_service(
        &self,
        id: i64,
        input: ServiceInput,
    ) -> Result<Service, SectionServiceError> {
        require(&input.title, "title")?;
        self.ensure_service(id).await?;

        let service = self
            .repo
            .update_service(id, &input)
            .await
            .context("Failed to update service")?;
        Ok(service)
    }

    pub async fn delete_service(&self, id: i64) -> Result<(), SectionServiceError> {
        self.ensure_service(id).await?;
        self.repo
            .delete_service(id)
            .await
            .context("Failed to delete service")?;
        Ok(())
    }

    pub async fn list_team_members(&self) -> Result<Vec<TeamMember>, SectionServiceError> {
        let members = self
            .repo
            .list_team_members()
            .await
            .context("Failed to list team members")?;
        Ok(members)
    }

    pub async fn create_team_member(
        &self,
        input: TeamMemberInput,
    ) -> Result<TeamMember, SectionServiceError> {
        require(&input.name, "name")?;
        require(&input.role, "role")?;

        let member = self
            .repo
            .create_team_member(&input)
            .await
            .context("Failed to create team member")?;
        Ok(member)
    }

    pub async fn update_team_member(
        &self,
        id: i64,
        input: TeamMemberInput,
    ) -> Result<TeamMember, SectionServiceError> {
        require(&input.name, "name")?;
        if self
            .repo
            .get_team_member(id)
            .await
            .context("Failed to get team member")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("team member {}", id)));
        }

        let member = self
            .repo
            .update_team_member(id, &input)
            .await
            .context("Failed to update team member")?;
        Ok(member)
    }

    pub async fn delete_team_member(&self, id: i64) -> Result<(), SectionServiceError> {
        if self
            .repo
            .get_team_member(id)
            .await
            .context("Failed to get team member")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("team member {}", id)));
        }
        self.repo
            .delete_team_member(id)
            .await
            .context("Failed to delete team member")?;
        Ok(())
    }

    pub async fn list_projects(&self) -> Result<Vec<PortfolioProject>, SectionServiceError> {
        let projects = self
            .repo
            .list_projects()
            .await
            .context("Failed to list portfolio projects")?;
        Ok(projects)
    }

    pub async fn create_project(
        &self,
        input: PortfolioProjectInput,
    ) -> Result<PortfolioProject, SectionServiceError> {
        require(&input.title, "title")?;

        let project = self
            .repo
            .create_project(&input)
            .await
            .context("Failed to create portfolio project")?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        id: i64,
        input: PortfolioProjectInput,
    ) -> Result<PortfolioProject, SectionServiceError> {
        require(&input.title, "title")?;
        if self
            .repo
            .get_project(id)
            .await
            .context("Failed to get portfolio project")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("project {}", id)));
        }

        let project = self
            .repo
            .update_project(id, &input)
            .await
            .context("Failed to update portfolio project")?;
        Ok(project)
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), SectionServiceError> {
        if self
            .repo
            .get_project(id)
            .await
            .context("Failed to get portfolio project")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("project {}", id)));
        }
        self.repo
            .delete_project(id)
            .await
            .context("Failed to delete portfolio project")?;
        Ok(())
    }

    pub async fn list_about_blocks(&self) -> Result<Vec<AboutBlock>, SectionServiceError> {
        let blocks = self
            .repo
            .list_about_blocks()
            .await
            .context("Failed to list about blocks")?;
        Ok(blocks)
    }

    /// Update one of the fixed about blocks; blocks cannot be created or
    /// deleted through the API
    pub async fn update_about_block(
        &self,
        id: i64,
        input: UpdateAboutBlockInput,
    ) -> Result<AboutBlock, SectionServiceError> {
        if self
            .repo
            .get_about_block(id)
            .await
            .context("Failed to get about block")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("about block {}", id)));
        }

        let block = self
            .repo
            .update_about_block(id, &input)
            .await
            .context("Failed to update about block")?;
        Ok(block)
    }

    async fn ensure_service(&self, id: i64) -> Result<(), SectionServiceError> {
        if self
            .repo
            .get_service(id)
            .await
            .context("Failed to get service")?
            .is_none()
        {
            return Err(SectionServiceError::NotFound(format!("service {}", id)));
        }
        Ok(())
    }
}

fn require(value: &str, field: &str) -> Result<(), SectionServiceError> {
    if value.trim().is_empty() {
        return Err(SectionServiceError::ValidationError(format!(
            "{} is required",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSectionRepository;
    use crate::db::{create_test_pool, migrations, seed};

    async fn setup_service() -> SectionService {
        let pool = create_test_pool().await.expect("pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        seed::run_seed(&pool).await.expect("seed");
        SectionService::new(SqlxSectionRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_service_requires_title() {
        let service = setup_service().await;

        let result = service
            .create_service(ServiceInput {
                title: String::new(),
                description: "d".to_string(),
                icon: "i".to_string(),
                included: Vec::new(),
                sort_order: 0,
            })
            .await;
        assert!(matches!(
            result,
            Err(SectionServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_about_blocks_seeded_and_updatable() {
        let service = setup_service().await;

        let blocks = service.list_about_blocks().await.expect("list");
        assert!(!blocks.is_empty());

        let updated = service
            .update_about_block(
                blocks[0].id,
                UpdateAboutBlockInput {
                    content: Some("Updated copy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.content, "Updated copy");
    }

    #[tokio::test]
    async fn test_update_missing_team_member() {
        let service = setup_service().await;

        let result = service
            .update_team_member(
                999,
                TeamMemberInput {
                    name: "Jane".to_string(),
                    role: "CD".to_string(),
                    image: "img".to_string(),
                    sort_order: 0,
                },
            )
            .await;
        assert!(matches!(result, Err(SectionServiceError::NotFound(_))));
    }
}
