// Bot presence, as driven by the status monitor.
//
// Discord-layer glue that adapts the core `PresenceSink` onto serenity's
// presence primitives. The gateway call is fire-and-forget, so the only
// failure we can report is an activity Discord would reject.

use async_trait::async_trait;

use crate::core::presence::{PresenceError, PresenceSink};
use poise::serenity_prelude as serenity;

/// Discord drops activity names longer than this.
const MAX_ACTIVITY_LEN: usize = 128;

pub struct DiscordPresence {
    ctx: serenity::Context,
}

impl DiscordPresence {
    pub fn new(ctx: serenity::Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl PresenceSink for DiscordPresence {
    async fn set_presence(&self, label: &str, online: bool) -> Result<(), PresenceError> {
        if label.chars().count() > MAX_ACTIVITY_LEN {
            return Err(PresenceError::InvalidActivity(format!(
                "activity name longer than {} characters",
                MAX_ACTIVITY_LEN
            )));
        }

        // "Watching Minecraft | 3/20"
        let activity = serenity::ActivityData::watching(label);
        let status = if online {
            serenity::OnlineStatus::Online
        } else {
            serenity::OnlineStatus::Idle
        };
        self.ctx.set_presence(Some(activity), status);
        Ok(())
    }
}
