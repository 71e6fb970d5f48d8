// Discord side of the pinned status message.
// - `chat_gateway.rs` implements the core `ChatGateway` over serenity's HTTP client.
// - `status_embed.rs` turns a rendered status into an embed.

pub mod chat_gateway;
pub mod status_embed;

pub use chat_gateway::DiscordChatGateway;
pub use status_embed::status_embed;
