//! Business logic services
//!
//! Services own the domain rules and sit between the HTTP handlers and the
//! repositories. Each service receives its repositories as `Arc<dyn Trait>`
//! at construction so tests can substitute fakes.

pub mod account;
pub mod author;
pub mod category;
pub mod message;
pub mod password;
pub mod post;
pub mod section;
pub mod tag;
pub mod token;

pub use account::{AccountService, AccountServiceError};
pub use author::AuthorService;
pub use category::CategoryService;
pub use message::MessageService;
pub use post::{PostQuery, PostService};
pub use section::SectionService;
pub use tag::TagService;
pub use token::{Claims, TokenService};
