//! Domain models
//!
//! Entity structs shared between the repository, service, and API layers.

pub mod account;
pub mod author;
pub mod category;
pub mod message;
pub mod post;
pub mod section;
pub mod tag;

pub use account::{AdminAccount, AdminRole, CreateAccountInput};
pub use author::{Author, CreateAuthorInput, UpdateAuthorInput};
pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use message::{ContactMessage, CreateMessageInput, MessageStatus, UpdateMessageInput};
pub use post::{
    CreatePostInput, ListParams, PagedResult, Post, PostFilter, UpdatePostInput, Visibility,
};
pub use section::{
    AboutBlock, PortfolioProject, PortfolioProjectInput, Service, ServiceInput, TeamMember,
    TeamMemberInput, UpdateAboutBlockInput,
};
pub use tag::{CreateTagInput, Tag, UpdateTagInput};
