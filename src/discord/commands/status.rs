// Discord commands for the game server status.
//
// **Same pattern as every command file:**
// 1. Extract primitive data from Discord types
// 2. Call the status monitor
// 3. Format the response based on the result
//
// Permission checks are declared on the commands and enforced by poise.

use std::sync::Arc;

use crate::core::monitor::StatusMonitor;
use crate::core::pin::ChannelHandle;
use crate::discord::commands::presence::DiscordPresence;
use crate::discord::pinning::{status_embed, DiscordChatGateway};
use crate::infra::pin::JsonPinStore;
use crate::infra::query::GameQueryClient;

pub type Monitor =
    StatusMonitor<GameQueryClient, DiscordPresence, DiscordChatGateway, JsonPinStore>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub monitor: Arc<Monitor>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Get the current server ip
#[poise::command(slash_command)]
pub async fn ip(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(ctx.data().monitor.ip_text()).await?;
    Ok(())
}

/// Force-update the currently pinned message
#[poise::command(
    slash_command,
    rename = "force-update",
    required_permissions = "MANAGE_MESSAGES"
)]
pub async fn force_update(ctx: Context<'_>) -> Result<(), Error> {
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content("Updating status and pinned message...")
                .ephemeral(true),
        )
        .await?;

    let report = ctx.data().monitor.run_cycle().await;
    tracing::debug!(
        online = report.status.is_online(),
        pin = ?report.pin,
        "Forced status update finished"
    );

    reply
        .edit(
            ctx,
            poise::CreateReply::default().content("Channels were updated successfully!"),
        )
        .await?;
    Ok(())
}

/// Add an embed message of the server status and pin it
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn pin(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command only works in servers")?
        .get();

    let reply = ctx.say("Creating status embed...").await?;

    let target = ChannelHandle {
        guild_id,
        channel_id: ctx.channel_id().get(),
    };

    let content = match ctx.data().monitor.pin_here(target).await {
        Ok(outcome) if outcome.old_pin_removed => "Status embed created and previous pin removed",
        Ok(_) => "Status embed created",
        Err(e) => {
            tracing::error!("Pin command failed: {}", e);
            "Creation failed"
        }
    };

    reply
        .edit(ctx, poise::CreateReply::default().content(content))
        .await?;
    Ok(())
}

/// Show the current server status without pinning it
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let monitor = &ctx.data().monitor;
    let status = monitor.fetch_status().await;
    let rendered = monitor.render_now(&status);

    ctx.send(poise::CreateReply::default().embed(status_embed(&rendered)))
        .await?;
    Ok(())
}

/// Show how many players are online
#[poise::command(slash_command)]
pub async fn online(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let monitor = &ctx.data().monitor;
    let status = monitor.fetch_status().await;
    ctx.say(monitor.online_text(&status)).await?;
    Ok(())
}
