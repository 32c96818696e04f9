//! Instant message handlers
//!
//! `im:send` runs the messaging authorizer, acknowledges the sender with
//! `im:sent` and pushes `im:new` to the recipient if they are online.
//! Offline recipients catch up through `im:history`.

use buddylink_service::{HistoryRequest, MessagingService, SendMessageRequest, ServiceError};
use std::sync::Arc;

use super::{reply, HandlerResult};
use crate::connection::Connection;
use crate::events::{ErrorEvent, ImEvent, ImHistoryEvent};
use crate::protocol::{GatewayMessage, ServerEvent};
use crate::server::GatewayState;

const SEND_FAILED: &str = "Failed to send message";
const HISTORY_FAILED: &str = "Failed to load messages";

pub struct ImHandler;

impl ImHandler {
    pub async fn send(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: SendMessageRequest,
    ) -> HandlerResult<()> {
        let result = MessagingService::new(state.service_context())
            .send(connection.user_id(), request)
            .await;

        let message = match result {
            Ok(message) => message,
            Err(e) => {
                Self::reject(connection, &e, SEND_FAILED).await;
                return Ok(());
            }
        };

        let event = ImEvent::from(&message);
        reply(connection, ServerEvent::ImSent, &event).await;

        // The message is stored; a failed push only means the recipient pulls it later
        match state.registry().lookup(message.to_user_id) {
            Some(recipient) => {
                if let Err(e) = recipient.try_send(GatewayMessage::new(ServerEvent::ImNew, &event)) {
                    tracing::warn!(
                        message_id = %message.id,
                        to = %message.to_user_id,
                        error = %e,
                        "Live delivery failed"
                    );
                }
            }
            None => {
                tracing::debug!(
                    message_id = %message.id,
                    to = %message.to_user_id,
                    "Recipient offline, stored only"
                );
            }
        }

        Ok(())
    }

    pub async fn history(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: HistoryRequest,
    ) -> HandlerResult<()> {
        let with = request.with.clone();
        let result = MessagingService::new(state.service_context())
            .thread(connection.user_id(), request)
            .await;

        match result {
            Ok((_peer, messages)) => {
                let event = ImHistoryEvent {
                    with,
                    messages: messages.iter().map(ImEvent::from).collect(),
                };
                reply(connection, ServerEvent::ImHistory, &event).await;
            }
            Err(e) => Self::reject(connection, &e, HISTORY_FAILED).await,
        }

        Ok(())
    }

    async fn reject(connection: &Connection, error: &ServiceError, generic: &str) {
        if error.is_transient() {
            tracing::error!(
                user_id = %connection.user_id(),
                error = %error,
                "Messaging store failure"
            );
        } else {
            tracing::debug!(
                user_id = %connection.user_id(),
                code = error.error_code(),
                "Message rejected"
            );
        }

        reply(
            connection,
            ServerEvent::ImError,
            &ErrorEvent::new(error.client_message(generic)),
        )
        .await;
    }
}
