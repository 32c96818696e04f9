//! # buddylink-gateway
//!
//! WebSocket gateway: the session registry, presence fan-out to buddies,
//! live message delivery and the WebRTC signaling relay.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;
