//! Client event handlers
//!
//! Routes each decoded envelope to its handler by event name.

mod error;
mod im;
mod session;
mod signaling;
mod status;

pub use error::{HandlerError, HandlerResult};
pub use im::ImHandler;
pub use session::SessionHandler;
pub use signaling::{SignalingError, SignalingHandler};
pub use status::StatusHandler;

use crate::connection::Connection;
use crate::protocol::{ClientEvent, GatewayMessage, ServerEvent};
use crate::server::GatewayState;
use serde::Serialize;
use std::sync::Arc;

pub struct MessageDispatcher;

impl MessageDispatcher {
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        let Some(event) = ClientEvent::from_name(&message.event) else {
            tracing::debug!(
                connection_id = %connection.connection_id(),
                event = %message.event,
                "Unknown client event"
            );
            return Err(HandlerError::UnknownEvent(message.event));
        };

        tracing::trace!(
            connection_id = %connection.connection_id(),
            event = %event,
            "Received event"
        );

        match event {
            ClientEvent::ImSend => ImHandler::send(state, connection, message.payload()?).await,
            ClientEvent::ImHistory => {
                ImHandler::history(state, connection, message.payload()?).await
            }
            ClientEvent::StatusUpdate => {
                StatusHandler::handle(state, connection, message.payload()?).await
            }
            ClientEvent::WebRtcOffer => {
                SignalingHandler::offer(state, connection, message.payload()?).await
            }
            ClientEvent::WebRtcAnswer => {
                SignalingHandler::answer(state, connection, message.payload()?).await
            }
            ClientEvent::WebRtcIceCandidate => {
                SignalingHandler::ice_candidate(state, connection, message.payload()?).await
            }
        }
    }
}

/// Queue an event on the connection that triggered it
pub(crate) async fn reply(connection: &Connection, event: ServerEvent, payload: &impl Serialize) {
    if connection.send(GatewayMessage::new(event, payload)).await.is_err() {
        tracing::debug!(
            connection_id = %connection.connection_id(),
            event = %event,
            "Reply dropped, connection closing"
        );
    }
}
