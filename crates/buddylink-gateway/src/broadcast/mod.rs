//! Fan-out of server events to connected users

mod presence;

pub use presence::PresenceFanout;
