//! Session registry
//!
//! The single source of truth for who is online: connection id -> connection
//! and user id -> the one connection that currently owns the user. Both maps
//! are `DashMap`s; handlers run on a multi-threaded runtime.

use super::Connection;
use crate::protocol::CloseCode;
use buddylink_core::Snowflake;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// The live mapping for an online user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: Snowflake,
    pub connection_id: String,
    pub connected_at: DateTime<Utc>,
}

/// Result of one stale sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Connections removed
    pub evicted: usize,
    /// Users whose mapping was removed with them
    pub released: Vec<Snowflake>,
}

#[derive(Default)]
pub struct SessionRegistry {
    connections: DashMap<String, Arc<Connection>>,
    users: DashMap<Snowflake, PresenceEntry>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Map the connection's user to it, last writer wins
    ///
    /// Returns the displaced entry, if any. The displaced connection stays
    /// registered and open; closing it is the caller's decision.
    pub fn register(&self, connection: Arc<Connection>) -> Option<PresenceEntry> {
        let entry = PresenceEntry {
            user_id: connection.user_id(),
            connection_id: connection.connection_id().to_string(),
            connected_at: connection.connected_at(),
        };

        self.connections
            .insert(entry.connection_id.clone(), connection);
        let displaced = self.users.insert(entry.user_id, entry.clone());

        tracing::debug!(
            connection_id = %entry.connection_id,
            user_id = %entry.user_id,
            displaced = displaced.is_some(),
            "Connection registered"
        );

        displaced
    }

    /// Map the connection's user to it only if the user has no session
    ///
    /// The check and the insert happen under the user's map entry lock, so
    /// of two concurrent handshakes for one user exactly one wins. On
    /// conflict nothing changes and the current owner is returned.
    pub fn register_exclusive(&self, connection: Arc<Connection>) -> Result<(), PresenceEntry> {
        let entry = PresenceEntry {
            user_id: connection.user_id(),
            connection_id: connection.connection_id().to_string(),
            connected_at: connection.connected_at(),
        };

        match self.users.entry(entry.user_id) {
            Entry::Occupied(current) => {
                tracing::debug!(
                    connection_id = %entry.connection_id,
                    user_id = %entry.user_id,
                    owner = %current.get().connection_id,
                    "Connection refused, user already online"
                );
                Err(current.get().clone())
            }
            Entry::Vacant(slot) => {
                self.connections
                    .insert(entry.connection_id.clone(), connection);
                tracing::debug!(
                    connection_id = %entry.connection_id,
                    user_id = %entry.user_id,
                    "Connection registered"
                );
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Remove a connection
    ///
    /// The user mapping goes with it only if it still points at this
    /// connection. Returns the user id when that mapping was removed.
    pub fn unregister(&self, connection_id: &str) -> Option<Snowflake> {
        self.remove(connection_id).and_then(|(_, released)| released)
    }

    fn remove(&self, connection_id: &str) -> Option<(Arc<Connection>, Option<Snowflake>)> {
        let (_, connection) = self.connections.remove(connection_id)?;

        let released = self
            .users
            .remove_if(&connection.user_id(), |_, entry| entry.connection_id == connection_id)
            .map(|(user_id, _)| user_id);

        tracing::debug!(
            connection_id = %connection_id,
            user_id = %connection.user_id(),
            released = released.is_some(),
            "Connection unregistered"
        );

        Some((connection, released))
    }

    /// The connection currently owning `user_id`
    pub fn lookup(&self, user_id: Snowflake) -> Option<Arc<Connection>> {
        let connection_id = self.users.get(&user_id)?.connection_id.clone();
        self.connection(&connection_id)
    }

    pub fn connection(&self, connection_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(connection_id).map(|c| c.clone())
    }

    pub fn entry(&self, user_id: Snowflake) -> Option<PresenceEntry> {
        self.users.get(&user_id).map(|e| e.clone())
    }

    pub fn is_online(&self, user_id: Snowflake) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Evict every connection whose transport is gone or that has been
    /// silent for longer than `idle_timeout`
    ///
    /// Evicted sockets that are still open are asked to close. Does not
    /// announce anything; callers decide what a released user means.
    pub fn sweep_stale(&self, idle_timeout: Duration) -> SweepOutcome {
        let stale: Vec<String> = self
            .connections
            .iter()
            .filter(|c| c.is_stale(idle_timeout))
            .map(|c| c.key().clone())
            .collect();

        let mut outcome = SweepOutcome::default();
        for connection_id in stale {
            if let Some((connection, released)) = self.remove(&connection_id) {
                connection.close(CloseCode::SessionTimeout);
                outcome.evicted += 1;
                outcome.released.extend(released);
            }
        }

        if outcome.evicted > 0 {
            tracing::info!(count = outcome.evicted, "Evicted stale connections");
        } else {
            tracing::debug!(count = 0, "No stale connections");
        }

        outcome
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("connections", &self.connections.len())
            .field("users", &self.users.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Outbound;
    use tokio::sync::mpsc;

    const IDLE: Duration = Duration::from_secs(90);

    fn connection(id: &str, user: i64) -> (Arc<Connection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(8);
        (Connection::new(id.to_string(), Snowflake::new(user), "user", tx), rx)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = SessionRegistry::new();
        let (conn, _rx) = connection("c1", 1);

        assert!(registry.register(conn).is_none());
        assert!(registry.is_online(Snowflake::new(1)));
        assert_eq!(registry.lookup(Snowflake::new(1)).unwrap().connection_id(), "c1");
        assert_eq!(registry.entry(Snowflake::new(1)).unwrap().connection_id, "c1");
        assert!(registry.lookup(Snowflake::new(2)).is_none());
    }

    #[test]
    fn test_register_is_last_writer_wins() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = connection("c1", 1);
        let (second, _rx2) = connection("c2", 1);

        registry.register(first);
        let displaced = registry.register(second).unwrap();

        assert_eq!(displaced.connection_id, "c1");
        assert_eq!(registry.lookup(Snowflake::new(1)).unwrap().connection_id(), "c2");
        // The displaced connection is still known until it disconnects
        assert_eq!(registry.connection_count(), 2);
        assert_eq!(registry.user_count(), 1);
    }

    #[test]
    fn test_displaced_unregister_keeps_newer_session() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = connection("c1", 1);
        let (second, _rx2) = connection("c2", 1);
        registry.register(first);
        registry.register(second);

        assert_eq!(registry.unregister("c1"), None);
        assert_eq!(registry.lookup(Snowflake::new(1)).unwrap().connection_id(), "c2");

        assert_eq!(registry.unregister("c2"), Some(Snowflake::new(1)));
        assert!(!registry.is_online(Snowflake::new(1)));
        assert_eq!(registry.unregister("c2"), None);
    }

    #[test]
    fn test_sweep_stale_is_idempotent() {
        let registry = SessionRegistry::new();
        let (live, _live_rx) = connection("c1", 1);
        let (dead, dead_rx) = connection("c2", 2);
        registry.register(live);
        registry.register(dead);

        drop(dead_rx);

        let outcome = registry.sweep_stale(IDLE);
        assert_eq!(outcome.evicted, 1);
        assert_eq!(outcome.released, vec![Snowflake::new(2)]);
        assert!(registry.lookup(Snowflake::new(2)).is_none());
        assert!(registry.is_online(Snowflake::new(1)));

        assert_eq!(registry.sweep_stale(IDLE), SweepOutcome::default());
    }

    #[test]
    fn test_sweep_of_displaced_connection_releases_nobody() {
        let registry = SessionRegistry::new();
        let (old, old_rx) = connection("c1", 1);
        let (new, _new_rx) = connection("c2", 1);
        registry.register(old);
        registry.register(new);
        drop(old_rx);

        let outcome = registry.sweep_stale(IDLE);
        assert_eq!(outcome.evicted, 1);
        assert!(outcome.released.is_empty());
        assert!(registry.is_online(Snowflake::new(1)));
    }

    #[test]
    fn test_register_exclusive_refuses_second_session() {
        let registry = SessionRegistry::new();
        let (first, _rx1) = connection("c1", 1);
        let (second, mut rx2) = connection("c2", 1);

        assert!(registry.register_exclusive(first).is_ok());
        let owner = registry.register_exclusive(second).unwrap_err();

        assert_eq!(owner.connection_id, "c1");
        assert_eq!(registry.lookup(Snowflake::new(1)).unwrap().connection_id(), "c1");
        assert!(registry.connection("c2").is_none());
        assert_eq!(registry.connection_count(), 1);
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_exclusive_registration_has_one_winner() {
        let registry = Arc::new(SessionRegistry::new());
        let mut receivers = Vec::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let (conn, rx) = connection(&format!("c{i}"), 1);
                receivers.push(rx);
                let registry = registry.clone();
                std::thread::spawn(move || registry.register_exclusive(conn).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.user_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_silent_connection() {
        let registry = SessionRegistry::new();
        let (silent, mut silent_rx) = connection("c1", 1);
        let (chatty, _chatty_rx) = connection("c2", 2);
        registry.register(silent);
        registry.register(chatty.clone());

        tokio::time::advance(Duration::from_secs(60)).await;
        chatty.touch();
        assert_eq!(registry.sweep_stale(IDLE).evicted, 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        let outcome = registry.sweep_stale(IDLE);

        assert_eq!(outcome.released, vec![Snowflake::new(1)]);
        assert_eq!(silent_rx.recv().await, Some(Outbound::Close(CloseCode::SessionTimeout)));
        assert!(registry.is_online(Snowflake::new(2)));
    }
}
