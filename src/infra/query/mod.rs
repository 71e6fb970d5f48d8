// Game query infra layer.
// - `query_client.rs` picks a protocol for the configured game type.
// - `minecraft_ping.rs` speaks the Minecraft Server List Ping over TCP.
// - `source_query.rs` speaks Valve's A2S queries over UDP.

pub mod minecraft_ping;
pub mod query_client;
pub mod source_query;

pub use query_client::GameQueryClient;
