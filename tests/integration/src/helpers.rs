//! Test helpers
//!
//! [`TestGateway`] serves the real router on 127.0.0.1:0 and keeps a
//! handle on the in-memory store and the registry so tests can seed data
//! and wait for server-side state. [`TestClient`] is a thin
//! `tokio-tungstenite` client speaking the `{event, data}` envelope.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use buddylink_common::{AppConfig, SessionPolicy};
use buddylink_core::Snowflake;
use buddylink_db::MemoryStore;
use buddylink_gateway::protocol::GatewayMessage;
use buddylink_gateway::server::{serve, GatewayState};
use buddylink_gateway::connection::SessionRegistry;
use buddylink_service::ServiceContext;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::fixtures::Fixtures;

/// How long a client waits for an expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestGateway {
    pub addr: SocketAddr,
    pub store: Arc<MemoryStore>,
    pub state: GatewayState,
    pub fixtures: Fixtures,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway with the default (replace) session policy
    pub async fn start() -> Result<Self> {
        Self::start_with_policy(SessionPolicy::Replace).await
    }

    pub async fn start_with_policy(policy: SessionPolicy) -> Result<Self> {
        let policy = match policy {
            SessionPolicy::Replace => "replace",
            SessionPolicy::Reject => "reject",
        };
        Self::start_with(&[("SESSION_POLICY", policy)]).await
    }

    /// Start a gateway with extra configuration variables
    pub async fn start_with(settings: &[(&str, &str)]) -> Result<Self> {
        let config = AppConfig::from_lookup(|key| {
            if key == "GATEWAY_PORT" {
                return Some("0".to_string());
            }
            settings
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })?;

        let store = Arc::new(MemoryStore::new());
        let fixtures = Fixtures::seed(&store);
        let ctx = ServiceContext::in_memory(store.clone(), 0, config.messaging.clone());
        let state = GatewayState::new(ctx, SessionRegistry::new_shared(), config);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let server_state = state.clone();
        let handle = tokio::spawn(async move {
            serve(listener, server_state).await.ok();
        });

        Ok(Self {
            addr,
            store,
            state,
            fixtures,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn gateway_url(&self, user_id: &str) -> String {
        format!("ws://{}/gateway?userId={user_id}", self.addr)
    }

    /// Connect as `user_id` and wait until the server registered the session
    pub async fn connect(&self, user_id: Snowflake) -> Result<TestClient> {
        let before = self.state.registry().lookup(user_id).map(|c| c.connection_id().to_string());
        let client = TestClient::connect(&self.gateway_url(&user_id.to_string())).await?;

        self.wait_until(|registry| {
            registry
                .lookup(user_id)
                .is_some_and(|c| Some(c.connection_id()) != before.as_deref())
        })
        .await?;
        Ok(client)
    }

    /// Handshake expected to be refused; returns the HTTP status
    pub async fn connect_rejected(&self, user_id: &str) -> Result<u16> {
        match tokio_tungstenite::connect_async(self.gateway_url(user_id)).await {
            Ok(_) => bail!("handshake for {user_id:?} unexpectedly succeeded"),
            Err(tungstenite::Error::Http(response)) => Ok(response.status().as_u16()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn wait_offline(&self, user_id: Snowflake) -> Result<()> {
        self.wait_until(|registry| !registry.is_online(user_id)).await
    }

    async fn wait_until<F>(&self, condition: F) -> Result<()>
    where
        F: Fn(&SessionRegistry) -> bool,
    {
        let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
        while !condition(self.state.registry()) {
            if tokio::time::Instant::now() >= deadline {
                bail!("registry did not reach the expected state");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

/// How a client's socket ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closed {
    Code(u16),
    WithoutFrame,
}

impl TestClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = tokio_tungstenite::connect_async(url).await?;
        Ok(Self { ws })
    }

    pub async fn send_event(&mut self, event: &str, data: Value) -> Result<()> {
        let json = serde_json::json!({ "event": event, "data": data }).to_string();
        self.ws.send(Message::Text(json)).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, message: Message) -> Result<()> {
        self.ws.send(message).await?;
        Ok(())
    }

    /// Next envelope from the server
    pub async fn recv_event(&mut self) -> Result<GatewayMessage> {
        loop {
            let frame = tokio::time::timeout(EVENT_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for an event"))?
                .ok_or_else(|| anyhow!("socket ended"))??;

            match frame {
                Message::Text(text) => return Ok(GatewayMessage::from_json(&text)?),
                Message::Close(frame) => bail!("socket closed: {frame:?}"),
                _ => continue,
            }
        }
    }

    /// Skip events until one named `event` arrives
    pub async fn expect_event(&mut self, event: &str) -> Result<GatewayMessage> {
        loop {
            let message = self.recv_event().await?;
            if message.event == event {
                return Ok(message);
            }
        }
    }

    /// Assert nothing arrives for `window`
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match tokio::time::timeout(window, self.ws.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => bail!("unexpected event: {text}"),
            Ok(other) => bail!("unexpected frame: {other:?}"),
        }
    }

    /// Read until the server closes the socket
    pub async fn expect_close(&mut self) -> Result<Closed> {
        loop {
            let frame = tokio::time::timeout(EVENT_TIMEOUT, self.ws.next())
                .await
                .map_err(|_| anyhow!("timed out waiting for close"))?;

            match frame {
                Some(Ok(Message::Close(Some(frame)))) => return Ok(Closed::Code(frame.code.into())),
                Some(Ok(Message::Close(None))) | None | Some(Err(_)) => return Ok(Closed::WithoutFrame),
                Some(Ok(_)) => continue,
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
