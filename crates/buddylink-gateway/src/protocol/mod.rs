//! Wire protocol: envelope, event names and close codes

mod close_codes;
mod event_names;
mod messages;

pub use close_codes::CloseCode;
pub use event_names::{ClientEvent, ServerEvent};
pub use messages::{GatewayMessage, Outbound};
