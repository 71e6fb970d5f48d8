// The slice of the chat platform the pin reconciler talks to.
//
// Lookups return `Ok(None)` when the guild, channel or message is gone, so the
// reconciler branches on absence. `Err` is reserved for the API itself
// misbehaving (rate limits, outages, missing permissions).

use async_trait::async_trait;
use thiserror::Error;

use crate::core::status::RenderedStatus;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle {
    pub guild_id: u64,
    pub channel_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub guild_id: u64,
    pub channel_id: u64,
    pub message_id: u64,
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn guild_exists(&self, guild_id: u64) -> Result<bool, ChatError>;

    async fn find_text_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Option<ChannelHandle>, ChatError>;

    /// Only matches messages that are still pinned in `channel`.
    async fn find_pinned_message(
        &self,
        channel: &ChannelHandle,
        message_id: u64,
    ) -> Result<Option<MessageHandle>, ChatError>;

    async fn send_status(
        &self,
        channel: &ChannelHandle,
        status: &RenderedStatus,
    ) -> Result<MessageHandle, ChatError>;

    async fn edit_status(
        &self,
        message: &MessageHandle,
        status: &RenderedStatus,
    ) -> Result<(), ChatError>;

    async fn pin(&self, message: &MessageHandle) -> Result<(), ChatError>;

    async fn unpin(&self, message: &MessageHandle) -> Result<(), ChatError>;
}
