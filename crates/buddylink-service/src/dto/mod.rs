//! Inbound payloads
//!
//! Deserialized straight from client event data and validated with `validator`.

pub mod requests;

pub use requests::{validation_message, HistoryRequest, SendMessageRequest, StatusUpdateRequest};
