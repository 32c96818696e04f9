//! # buddylink-db
//!
//! Store adapters implementing the repository ports of `buddylink-core`.
//!
//! - [`repositories`]: PostgreSQL via SQLx (runtime queries, `FromRow` models)
//! - [`memory`]: an in-process store with the same semantics, used by tests
//!   and by the gateway when no `DATABASE_URL` is configured
//!
//! ```rust,ignore
//! use buddylink_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository};
//!
//! let pool = create_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//! let users = PgUserRepository::new(pool);
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAttachmentRepository, PgMessageRepository, PgRelationshipRepository, PgUserRepository,
};
