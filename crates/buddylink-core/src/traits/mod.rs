//! Repository traits (ports)

mod repositories;

pub use repositories::{
    AttachmentRepository, MessageRepository, RelationshipRepository, RepoResult, ThreadQuery,
    UserRepository,
};
