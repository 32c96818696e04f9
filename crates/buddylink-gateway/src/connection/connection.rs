//! Individual WebSocket connection
//!
//! A connection is created only after the handshake identity resolved, so
//! it always knows its user.

use crate::protocol::{CloseCode, GatewayMessage, Outbound};
use buddylink_core::Snowflake;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub struct Connection {
    /// Unique per socket; also the signaling address (`fromSocketId`)
    connection_id: String,
    user_id: Snowflake,
    username: String,
    /// Bounded queue drained by the socket's send loop
    sender: mpsc::Sender<Outbound>,
    connected_at: DateTime<Utc>,
    started: Instant,
    /// Milliseconds after `started` that the client was last heard from
    last_activity_ms: AtomicU64,
}

impl Connection {
    pub fn new(
        connection_id: String,
        user_id: Snowflake,
        username: impl Into<String>,
        sender: mpsc::Sender<Outbound>,
    ) -> Arc<Self> {
        Arc::new(Self {
            connection_id,
            user_id,
            username: username.into(),
            sender,
            connected_at: Utc::now(),
            started: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Queue a message, waiting for room in the outbound buffer
    pub async fn send(&self, message: GatewayMessage) -> Result<(), mpsc::error::SendError<Outbound>> {
        self.sender.send(Outbound::Message(message)).await
    }

    /// Queue a message without waiting; fails if the buffer is full or closed
    pub fn try_send(&self, message: GatewayMessage) -> Result<(), mpsc::error::TrySendError<Outbound>> {
        self.sender.try_send(Outbound::Message(message))
    }

    /// Ask the send loop to close the socket with `code`
    pub fn close(&self, code: CloseCode) -> bool {
        self.sender.try_send(Outbound::Close(code)).is_ok()
    }

    /// Queue a keepalive ping; false if the buffer is full or closed
    pub fn ping(&self) -> bool {
        self.sender.try_send(Outbound::Ping).is_ok()
    }

    /// Whether the send loop is gone (transport not connected)
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Record that a frame arrived from the client
    pub fn touch(&self) {
        let elapsed = self.started.elapsed().as_millis() as u64;
        self.last_activity_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    /// Time since the client was last heard from
    pub fn idle_for(&self) -> Duration {
        let last = Duration::from_millis(self.last_activity_ms.load(Ordering::Relaxed));
        self.started.elapsed().saturating_sub(last)
    }

    /// Closed, or silent for longer than `idle_timeout`
    pub fn is_stale(&self, idle_timeout: Duration) -> bool {
        self.is_closed() || self.idle_for() > idle_timeout
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connection_id", &self.connection_id)
            .field("user_id", &self.user_id)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}
