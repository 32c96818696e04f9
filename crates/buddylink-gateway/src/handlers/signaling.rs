//! WebRTC signaling relay
//!
//! Stateless: offers are addressed by username, answers and ICE candidates
//! by the connection id the offer carried. The server never inspects the
//! SDP or candidate payloads, and holds no per-transfer state; the
//! initiator's answer timeout lives client-side.

use buddylink_service::PresenceService;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::{reply, HandlerResult};
use crate::connection::Connection;
use crate::events::{
    AnswerRequest, ErrorEvent, IceCandidateRequest, OfferRequest, WebRtcAnswerEvent,
    WebRtcIceCandidateEvent, WebRtcOfferEvent,
};
use crate::protocol::{GatewayMessage, ServerEvent};
use crate::server::GatewayState;

/// How long a relay waits for room in the target's outbound queue
const RELAY_TIMEOUT: Duration = Duration::from_secs(5);

/// Reasons reported back as `webrtc:error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalingError {
    #[error("User not found")]
    NotFound,

    #[error("Peer is offline")]
    PeerOffline,

    #[error("Cannot send a file to yourself")]
    SelfOffer,

    #[error("Signaling unavailable")]
    Unavailable,
}

pub struct SignalingHandler;

impl SignalingHandler {
    pub async fn offer(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: OfferRequest,
    ) -> HandlerResult<()> {
        let target = match Self::resolve_peer(state, connection, &request.to).await {
            Ok(target) => target,
            Err(e) => return Self::fail(connection, e).await,
        };

        let event = WebRtcOfferEvent {
            from: connection.user_id(),
            from_username: connection.username().to_string(),
            from_socket_id: connection.connection_id().to_string(),
            offer: request.offer,
            file_name: request.file_name,
            file_size: request.file_size,
            mime_type: request.mime_type,
        };

        tracing::debug!(
            from = %connection.user_id(),
            to = %target.user_id(),
            file_size = event.file_size,
            "Relaying offer"
        );
        Self::relay(connection, &target, GatewayMessage::new(ServerEvent::WebRtcOffer, &event)).await
    }

    pub async fn answer(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: AnswerRequest,
    ) -> HandlerResult<()> {
        let event = WebRtcAnswerEvent {
            from: connection.connection_id().to_string(),
            answer: request.answer,
        };
        Self::relay_to_connection(
            state,
            connection,
            &request.to,
            GatewayMessage::new(ServerEvent::WebRtcAnswer, &event),
        )
        .await
    }

    pub async fn ice_candidate(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: IceCandidateRequest,
    ) -> HandlerResult<()> {
        let event = WebRtcIceCandidateEvent {
            from: connection.connection_id().to_string(),
            candidate: request.candidate,
        };
        Self::relay_to_connection(
            state,
            connection,
            &request.to,
            GatewayMessage::new(ServerEvent::WebRtcIceCandidate, &event),
        )
        .await
    }

    async fn resolve_peer(
        state: &GatewayState,
        connection: &Connection,
        username: &str,
    ) -> Result<Arc<Connection>, SignalingError> {
        let peer = PresenceService::new(state.service_context())
            .resolve_username(username)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    SignalingError::NotFound
                } else {
                    tracing::error!(error = %e, "Peer lookup failed");
                    SignalingError::Unavailable
                }
            })?;

        if peer.id == connection.user_id() {
            return Err(SignalingError::SelfOffer);
        }

        state
            .registry()
            .lookup(peer.id)
            .filter(|c| !c.is_closed())
            .ok_or(SignalingError::PeerOffline)
    }

    async fn relay_to_connection(
        state: &GatewayState,
        connection: &Connection,
        target_id: &str,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        match state.registry().connection(target_id).filter(|c| !c.is_closed()) {
            Some(target) => Self::relay(connection, &target, message).await,
            None => Self::fail(connection, SignalingError::PeerOffline).await,
        }
    }

    async fn relay(
        connection: &Connection,
        target: &Connection,
        message: GatewayMessage,
    ) -> HandlerResult<()> {
        match tokio::time::timeout(RELAY_TIMEOUT, target.send(message)).await {
            Ok(Ok(())) => Ok(()),
            _ => Self::fail(connection, SignalingError::PeerOffline).await,
        }
    }

    async fn fail(connection: &Connection, error: SignalingError) -> HandlerResult<()> {
        tracing::debug!(
            connection_id = %connection.connection_id(),
            error = %error,
            "Signaling rejected"
        );
        reply(connection, ServerEvent::WebRtcError, &ErrorEvent::new(error.to_string())).await;
        Ok(())
    }
}
