//! # buddylink-core
//!
//! Domain layer: ids, entities, repository ports and domain errors.
//! Nothing in here knows about sockets, SQL or the runtime.

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

pub use entities::{
    Attachment, Message, MessageKind, PresenceStatus, PresenceStatusParseError, User,
};
pub use error::DomainError;
pub use traits::{
    AttachmentRepository, MessageRepository, RelationshipRepository, RepoResult, ThreadQuery,
    UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
