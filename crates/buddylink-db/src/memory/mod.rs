//! In-memory store
//!
//! Implements every repository port over a single `RwLock`ed state so that
//! multi-step writes (message + attachment links) are atomic. Used by the
//! test suites and by the gateway when no database is configured.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use buddylink_core::entities::{Attachment, Message, MessageKind, PresenceStatus, User};
use buddylink_core::error::DomainError;
use buddylink_core::traits::{
    AttachmentRepository, MessageRepository, RelationshipRepository, RepoResult, ThreadQuery,
    UserRepository,
};
use buddylink_core::value_objects::Snowflake;

#[derive(Default)]
struct State {
    users: HashMap<Snowflake, User>,
    /// Directed accepted edges: (user, buddy)
    buddies: HashSet<(Snowflake, Snowflake)>,
    /// Directed: (blocker, blocked)
    blocks: HashSet<(Snowflake, Snowflake)>,
    messages: BTreeMap<Snowflake, Message>,
    attachments: HashMap<Snowflake, Attachment>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Insert (or replace) a user and return it
    pub fn add_user(&self, id: Snowflake, username: &str) -> User {
        let user = User::new(id, username);
        self.state.write().users.insert(id, user.clone());
        user
    }

    /// Add a single accepted edge `user -> buddy`
    pub fn add_buddy_edge(&self, user_id: Snowflake, buddy_id: Snowflake) {
        self.state.write().buddies.insert((user_id, buddy_id));
    }

    /// Add accepted edges in both directions
    pub fn make_buddies(&self, a: Snowflake, b: Snowflake) {
        let mut state = self.state.write();
        state.buddies.insert((a, b));
        state.buddies.insert((b, a));
    }

    pub fn block(&self, blocker_id: Snowflake, blocked_id: Snowflake) {
        self.state.write().blocks.insert((blocker_id, blocked_id));
    }

    pub fn add_attachment(&self, attachment: Attachment) {
        self.state.write().attachments.insert(attachment.id, attachment);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.state.read().users.get(&id).cloned()
    }

    pub fn attachment(&self, id: Snowflake) -> Option<Attachment> {
        self.state.read().attachments.get(&id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state.read().messages.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let state = self.state.read();
        Ok(state
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn set_status(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;

        user.status = status;
        if status == PresenceStatus::Offline {
            user.last_seen = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl RelationshipRepository for MemoryStore {
    async fn has_buddy(&self, user_id: Snowflake, buddy_id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.read().buddies.contains(&(user_id, buddy_id)))
    }

    async fn has_blocked(&self, blocker_id: Snowflake, blocked_id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.read().blocks.contains(&(blocker_id, blocked_id)))
    }

    async fn mutual_buddies(&self, user_id: Snowflake) -> RepoResult<Vec<User>> {
        let state = self.state.read();
        let mut buddies: Vec<User> = state
            .buddies
            .iter()
            .filter(|(from, to)| *from == user_id && state.buddies.contains(&(*to, user_id)))
            .filter_map(|(_, to)| state.users.get(to).cloned())
            .collect();
        buddies.sort_by_key(|u| u.id);
        Ok(buddies)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let mut state = self.state.write();

        for id in &message.attachment_ids {
            let linkable = state.attachments.get(id).is_some_and(|a| {
                a.is_owned_by(message.from_user_id) && !a.is_linked()
            });
            if !linkable {
                return Err(DomainError::ValidationError(
                    "attachments could not be linked".to_string(),
                ));
            }
        }

        for id in &message.attachment_ids {
            if let Some(attachment) = state.attachments.get_mut(id) {
                attachment.message_id = Some(message.id);
            }
        }
        state.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        Ok(self.state.read().messages.get(&id).cloned())
    }

    async fn find_thread(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        query: ThreadQuery,
    ) -> RepoResult<Vec<Message>> {
        let state = self.state.read();
        let upper = query.before.unwrap_or(Snowflake::new(i64::MAX));

        Ok(state
            .messages
            .range(..upper)
            .rev()
            .map(|(_, m)| m)
            .filter(|m| m.kind == MessageKind::Im && !m.deleted && m.is_between(user_a, user_b))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttachmentRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Attachment>> {
        Ok(self.attachment(id))
    }
}
