//! Database row models

mod attachment;
mod message;
mod user;

pub use attachment::AttachmentModel;
pub use message::MessageModel;
pub use user::UserModel;
