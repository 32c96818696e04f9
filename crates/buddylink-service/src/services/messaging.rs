//! Messaging service
//!
//! Authorizes an instant message against the buddy/block graph, checks
//! attachment ownership and hands the message to the store. Nothing is
//! written unless every check passes.

use buddylink_core::entities::{Message, User};
use buddylink_core::traits::ThreadQuery;
use buddylink_core::{DomainError, Snowflake};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{validation_message, HistoryRequest, SendMessageRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct MessagingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessagingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Authorize and persist an instant message
    ///
    /// Checks run in a fixed order and the first failure wins: content,
    /// recipient lookup, self-send, blocks (either direction), mutual buddy
    /// edge, attachment ownership.
    #[instrument(skip(self, request), fields(to = %request.to))]
    pub async fn send(&self, from: Snowflake, request: SendMessageRequest) -> ServiceResult<Message> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(validation_message(&e)))?;

        let content = request.message.trim().to_string();
        if content.is_empty() && request.attachment_ids.is_empty() {
            return Err(ServiceError::validation("Message cannot be empty"));
        }
        let max = self.ctx.messaging().max_length;
        if content.chars().count() > max {
            return Err(DomainError::ContentTooLong { max }.into());
        }

        let recipient = self.resolve(&request.to).await?;
        self.authorize(from, recipient.id).await?;

        let mut attachment_ids = request.attachment_ids;
        attachment_ids.sort_unstable();
        attachment_ids.dedup();
        self.check_attachments(from, &attachment_ids).await?;

        let message = Message::new_im(
            self.ctx.generate_id(),
            from,
            recipient.id,
            content,
            attachment_ids,
        );
        self.ctx.message_repo().create(&message).await?;

        info!(
            message_id = %message.id,
            from = %from,
            to = %recipient.id,
            attachments = message.attachment_ids.len(),
            "Message stored"
        );

        Ok(message)
    }

    /// Conversation between `user_id` and `peer`, newest first
    ///
    /// Reading a thread needs no buddy edge: it only ever returns messages
    /// the caller sent or received.
    #[instrument(skip(self, request), fields(with = %request.with))]
    pub async fn thread(
        &self,
        user_id: Snowflake,
        request: HistoryRequest,
    ) -> ServiceResult<(User, Vec<Message>)> {
        request
            .validate()
            .map_err(|e| ServiceError::validation(validation_message(&e)))?;

        let peer = self.resolve(&request.with).await?;
        let query = ThreadQuery::new(request.before, request.limit);
        let messages = self
            .ctx
            .message_repo()
            .find_thread(user_id, peer.id, query)
            .await?;

        debug!(count = messages.len(), "Thread loaded");
        Ok((peer, messages))
    }

    /// Whether `from` may message `to` right now
    pub async fn authorize(&self, from: Snowflake, to: Snowflake) -> ServiceResult<()> {
        if from == to {
            return Err(DomainError::SelfSend.into());
        }

        let relationships = self.ctx.relationship_repo();

        if relationships.has_blocked(from, to).await? || relationships.has_blocked(to, from).await? {
            return Err(DomainError::Blocked.into());
        }

        if !(relationships.has_buddy(from, to).await? && relationships.has_buddy(to, from).await?) {
            return Err(DomainError::NotBuddies.into());
        }

        Ok(())
    }

    async fn resolve(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UsernameNotFound(username.to_string()).into())
    }

    async fn check_attachments(&self, owner: Snowflake, ids: &[Snowflake]) -> ServiceResult<()> {
        for &id in ids {
            let attachment = self
                .ctx
                .attachment_repo()
                .find_by_id(id)
                .await?
                .ok_or(DomainError::AttachmentNotFound(id))?;

            if !attachment.is_owned_by(owner) || attachment.is_linked() {
                return Err(DomainError::AttachmentNotOwned(id).into());
            }
        }
        Ok(())
    }
}
