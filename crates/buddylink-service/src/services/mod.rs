//! Business logic services

pub mod context;
pub mod error;
pub mod messaging;
pub mod presence;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use messaging::MessagingService;
pub use presence::PresenceService;
