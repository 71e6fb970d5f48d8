// This is the entry point of the game status bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (query protocols, pin storage)
// - `discord/` = Discord-specific adapters (commands, presence, pinned message)
//
// One process watches one game server. The game name is the only argument:
//
//     game_status_bot minecraft
//
// This file's job is to:
// 1. Load configuration for that game
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Start the status scheduler once the bot is ready

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::sync::Arc;

use anyhow::Context as _;

use crate::core::config::BotConfig;
use crate::core::monitor::StatusMonitor;
use crate::core::pin::{PinIdentity, PinReconciler, PinStore};
use crate::core::presence::PresenceUpdater;
use crate::core::status::StatusFetcher;
use crate::discord::commands::presence::DiscordPresence;
use crate::discord::pinning::DiscordChatGateway;
use crate::discord::Data;
use crate::infra::pin::JsonPinStore;
use crate::infra::query::GameQueryClient;
use poise::serenity_prelude as serenity;

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_PIN_DATA_PATH: &str = "pinData.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let game = std::env::args()
        .nth(1)
        .context("You must supply the game name as an argument")?;

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = BotConfig::load(&config_path, &game)
        .await
        .with_context(|| format!("Failed to load config for '{}' from {}", game, config_path))?;

    // The per-game `logging` flag decides how chatty we are
    let max_level = if config.logging {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(max_level).init();

    let token = config.resolve_token(std::env::var("DISCORD_TOKEN").ok())?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The pin data is read once here; after that the reconciler owns it.

    let pin_data_path =
        std::env::var("PIN_DATA_PATH").unwrap_or_else(|_| DEFAULT_PIN_DATA_PATH.to_string());
    let pin_store = JsonPinStore::new(&pin_data_path, config.display.game.clone());
    let identity = pin_store.load().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to read pin data, starting without a pin: {}", e);
        PinIdentity::default()
    });

    let display = config.display.clone();

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents =
        serenity::GatewayIntents::GUILD_MESSAGES | serenity::GatewayIntents::DIRECT_MESSAGES;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                discord::commands::status::ip(),
                discord::commands::status::force_update(),
                discord::commands::status::pin(),
                discord::commands::status::status(),
                discord::commands::status::online(),
            ],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Ready. Logged in as {}.", ready.user.tag());

                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");

                // Services that talk to Discord need the live context, so the
                // monitor is assembled here rather than before login.
                let monitor = Arc::new(StatusMonitor::new(
                    display.clone(),
                    StatusFetcher::new(GameQueryClient::new(), &display),
                    PresenceUpdater::new(DiscordPresence::new(ctx.clone()), display.clone()),
                    PinReconciler::new(
                        DiscordChatGateway::new(ctx.http.clone()),
                        pin_store,
                        display.clone(),
                        identity,
                    ),
                ));

                // Runs the first cycle right away, then on the configured interval
                Arc::clone(&monitor).start_scheduler();

                Ok(Data { monitor })
            })
        })
        .build();

    let mut builder = serenity::ClientBuilder::new(token, intents).framework(framework);
    if let Some(app_id) = config.app_id {
        builder = builder.application_id(serenity::ApplicationId::new(app_id));
    }

    let mut client = builder.await.context("Error creating client")?;
    client.start().await.context("Error running bot")?;
    Ok(())
}
