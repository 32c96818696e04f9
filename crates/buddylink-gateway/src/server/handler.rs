//! WebSocket handler
//!
//! Authenticates the handshake, then runs a receive task, a send task and
//! a heartbeat task per socket. Everything else reaches the socket through
//! the connection's bounded outbound queue.

use crate::connection::Connection;
use crate::handlers::{MessageDispatcher, SessionHandler};
use crate::protocol::{CloseCode, GatewayMessage, Outbound};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use buddylink_common::SessionPolicy;
use buddylink_core::entities::User;
use buddylink_core::Snowflake;
use buddylink_service::PresenceService;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// How long the send task gets to flush a close frame
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Handshake query: `/gateway?userId=<id>`
#[derive(Debug, Deserialize)]
pub struct GatewayQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Upgrade handler
///
/// The identity is checked before the upgrade; a rejected handshake never
/// touches the registry. Under the reject policy a user already online is
/// refused here with 409; a handshake that races past this check is refused
/// at registration and closed with `SessionRejected`.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<GatewayQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user = match authenticate(&state, &query).await {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };

    if state.config().presence.session_policy == SessionPolicy::Reject
        && state.registry().is_online(user.id)
    {
        tracing::info!(user_id = %user.id, "Rejecting second session");
        return (StatusCode::CONFLICT, "Session already active").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(state, socket, user))
}

async fn authenticate(
    state: &GatewayState,
    query: &GatewayQuery,
) -> Result<User, (StatusCode, &'static str)> {
    let unauthorized = (StatusCode::UNAUTHORIZED, "Authentication failed");

    let user_id = query
        .user_id
        .as_deref()
        .and_then(|raw| Snowflake::parse(raw).ok())
        .ok_or(unauthorized)?;

    PresenceService::new(state.service_context())
        .authenticate(user_id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                tracing::debug!(user_id = %user_id, "Handshake for unknown user");
                unauthorized
            } else {
                tracing::error!(user_id = %user_id, error = %e, "Handshake lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication unavailable")
            }
        })
}

async fn handle_socket(state: GatewayState, socket: WebSocket, user: User) {
    let (tx, mut rx) = mpsc::channel::<Outbound>(state.config().presence.outbound_buffer.max(1));
    let connection = Connection::new(Connection::generate_id(), user.id, user.username, tx);
    let connection_id = connection.connection_id().to_string();

    tracing::info!(connection_id = %connection_id, user_id = %user.id, "WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();

    let connection_id_send = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                Outbound::Message(msg) => {
                    let Ok(json) = msg.to_json() else { continue };
                    Message::Text(json)
                }
                Outbound::Ping => Message::Ping(Vec::new()),
                Outbound::Close(code) => {
                    let frame = CloseFrame {
                        code: code.as_u16(),
                        reason: code.description().into(),
                    };
                    let _ = ws_sink.send(Message::Close(Some(frame))).await;
                    break;
                }
            };
            if ws_sink.send(message).await.is_err() {
                tracing::warn!(
                    connection_id = %connection_id_send,
                    "Failed to send message to WebSocket"
                );
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    if !SessionHandler::connect(&state, &connection).await {
        if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut send_task).await.is_err() {
            send_task.abort();
        }
        return;
    }

    let heartbeat_every = state.config().presence.heartbeat_interval();
    let idle_timeout = state.config().presence.idle_timeout();
    let connection_heartbeat = connection.clone();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut ticker = interval(heartbeat_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let idle = connection_heartbeat.idle_for();
            if idle > idle_timeout {
                tracing::warn!(
                    connection_id = %connection_heartbeat.connection_id(),
                    idle_ms = idle.as_millis() as u64,
                    "Heartbeat timeout, closing connection"
                );
                break;
            }
            connection_heartbeat.ping();
        }
    });

    let state_recv = state.clone();
    let connection_recv = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            if msg.is_ok() {
                connection_recv.touch();
            }
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(code) = handle_text_message(&state_recv, &connection_recv, &text).await {
                        return Some(code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.connection_id(),
                        "Binary frames not supported"
                    );
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        connection_id = %connection_recv.connection_id(),
                        "Client closed connection"
                    );
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.connection_id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return None;
                }
            }
        }
        None
    });

    let close_with = tokio::select! {
        result = &mut recv_task => {
            heartbeat_task.abort();
            result.ok().flatten()
        }
        _ = &mut heartbeat_task => {
            recv_task.abort();
            Some(CloseCode::SessionTimeout)
        }
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            recv_task.abort();
            heartbeat_task.abort();
            None
        }
    };

    match close_with {
        Some(code) => {
            tracing::debug!(connection_id = %connection_id, close_code = %code, "Closing connection");
            connection.close(code);
            if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut send_task).await.is_err() {
                send_task.abort();
            }
        }
        None => send_task.abort(),
    }

    SessionHandler::disconnect(&state, &connection).await;
}

/// Decode and dispatch one text frame; an error closes the socket
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let message = GatewayMessage::from_json(text).map_err(|e| {
        tracing::debug!(
            connection_id = %connection.connection_id(),
            error = %e,
            "Failed to parse message"
        );
        CloseCode::DecodeError
    })?;

    MessageDispatcher::dispatch(state, connection, message)
        .await
        .map_err(|e| {
            tracing::debug!(
                connection_id = %connection.connection_id(),
                error = %e,
                "Handler error"
            );
            e.to_close_code()
        })
}
