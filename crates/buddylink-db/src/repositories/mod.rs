//! Repository implementations
//!
//! PostgreSQL implementations of the repository ports defined in buddylink-core.

mod attachment;
mod error;
mod message;
mod relationship;
mod user;

pub use attachment::PgAttachmentRepository;
pub use message::PgMessageRepository;
pub use relationship::PgRelationshipRepository;
pub use user::PgUserRepository;
