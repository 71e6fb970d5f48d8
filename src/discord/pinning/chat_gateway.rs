// Serenity implementation of the core `ChatGateway`.
//
// Lookups go straight to the HTTP API. A 404 means the thing was deleted and
// a 403 means we can no longer see it (kicked, or channel permissions
// changed); both are reported as "absent" so the reconciler just skips the
// cycle. Anything else is an API error.

use std::sync::Arc;

use async_trait::async_trait;

use super::status_embed::status_embed;
use crate::core::pin::{ChannelHandle, ChatError, ChatGateway, MessageHandle};
use crate::core::status::RenderedStatus;
use poise::serenity_prelude as serenity;

pub struct DiscordChatGateway {
    http: Arc<serenity::Http>,
}

impl DiscordChatGateway {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

fn is_missing(err: &serenity::Error) -> bool {
    match err {
        serenity::Error::Http(http_err) => matches!(
            http_err.status_code().map(|code| code.as_u16()),
            Some(403) | Some(404)
        ),
        _ => false,
    }
}

fn api_error(err: serenity::Error) -> ChatError {
    ChatError::Api(err.to_string())
}

fn channel_id(id: u64) -> Result<serenity::ChannelId, ChatError> {
    (id != 0)
        .then(|| serenity::ChannelId::new(id))
        .ok_or_else(|| ChatError::Api("channel id 0".into()))
}

fn message_id(id: u64) -> Result<serenity::MessageId, ChatError> {
    (id != 0)
        .then(|| serenity::MessageId::new(id))
        .ok_or_else(|| ChatError::Api("message id 0".into()))
}

#[async_trait]
impl ChatGateway for DiscordChatGateway {
    async fn guild_exists(&self, guild_id: u64) -> Result<bool, ChatError> {
        // Snowflakes are never 0; a zero id in pin data can't point anywhere
        if guild_id == 0 {
            return Ok(false);
        }

        match self.http.get_guild(serenity::GuildId::new(guild_id)).await {
            Ok(_) => Ok(true),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(api_error(e)),
        }
    }

    async fn find_text_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Option<ChannelHandle>, ChatError> {
        if channel_id == 0 {
            return Ok(None);
        }

        match self.http.get_channel(serenity::ChannelId::new(channel_id)).await {
            Ok(serenity::Channel::Guild(channel)) if channel.guild_id.get() == guild_id => {
                Ok(Some(ChannelHandle {
                    guild_id,
                    channel_id,
                }))
            }
            Ok(_) => Ok(None),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(api_error(e)),
        }
    }

    async fn find_pinned_message(
        &self,
        channel: &ChannelHandle,
        message_id: u64,
    ) -> Result<Option<MessageHandle>, ChatError> {
        let pins = match channel_id(channel.channel_id)?.pins(&*self.http).await {
            Ok(pins) => pins,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(api_error(e)),
        };

        Ok(pins
            .iter()
            .find(|m| m.id.get() == message_id)
            .map(|m| MessageHandle {
                guild_id: channel.guild_id,
                channel_id: channel.channel_id,
                message_id: m.id.get(),
            }))
    }

    async fn send_status(
        &self,
        channel: &ChannelHandle,
        status: &RenderedStatus,
    ) -> Result<MessageHandle, ChatError> {
        let message = channel_id(channel.channel_id)?
            .send_message(
                &*self.http,
                serenity::CreateMessage::new().embed(status_embed(status)),
            )
            .await
            .map_err(api_error)?;

        Ok(MessageHandle {
            guild_id: message
                .guild_id
                .map(|g| g.get())
                .unwrap_or(channel.guild_id),
            channel_id: message.channel_id.get(),
            message_id: message.id.get(),
        })
    }

    async fn edit_status(
        &self,
        message: &MessageHandle,
        status: &RenderedStatus,
    ) -> Result<(), ChatError> {
        channel_id(message.channel_id)?
            .edit_message(
                &*self.http,
                message_id(message.message_id)?,
                serenity::EditMessage::new().embed(status_embed(status)),
            )
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn pin(&self, message: &MessageHandle) -> Result<(), ChatError> {
        channel_id(message.channel_id)?
            .pin(&*self.http, message_id(message.message_id)?)
            .await
            .map_err(api_error)
    }

    async fn unpin(&self, message: &MessageHandle) -> Result<(), ChatError> {
        channel_id(message.channel_id)?
            .unpin(&*self.http, message_id(message.message_id)?)
            .await
            .map_err(api_error)
    }
}
