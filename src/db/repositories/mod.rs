//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity and is
//! injected into services as an `Arc<dyn Trait>` so tests can substitute
//! fakes.

pub mod account;
pub mod author;
pub mod category;
pub mod message;
pub mod post;
pub mod section;
pub mod tag;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use author::{AuthorRepository, SqlxAuthorRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use message::{MessageRepository, SqlxMessageRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use section::{SectionRepository, SqlxSectionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
