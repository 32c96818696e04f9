//! Connections and the session registry

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::{PresenceEntry, SessionRegistry, SweepOutcome};
