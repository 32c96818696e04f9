//! # buddylink-service
//!
//! Application layer: the messaging authorizer, message persistence
//! hand-off and presence bookkeeping. Live delivery over sockets is the
//! gateway's job; services return what was stored.

pub mod dto;
pub mod services;

pub use dto::{HistoryRequest, SendMessageRequest, StatusUpdateRequest};
pub use services::{
    MessagingService, PresenceService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
