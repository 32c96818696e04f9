//! Domain entities

mod attachment;
mod message;
mod user;

pub use attachment::Attachment;
pub use message::{Message, MessageKind};
pub use user::{PresenceStatus, PresenceStatusParseError, User};
