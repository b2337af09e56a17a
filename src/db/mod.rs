//! Database layer
//!
//! Connection pool management, schema migrations, first-run seeding, and
//! per-entity repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod seed;

pub use pool::{create_pool, create_test_pool, DbPool};
