use std::time::Duration;

use async_trait::async_trait;

use super::{minecraft_ping, source_query};
use crate::core::status::{QueryError, ServerInfo, StatusQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProtocol {
    Minecraft,
    Source,
}

/// How to query a game and where it listens when no port is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameKind {
    pub protocol: QueryProtocol,
    pub default_port: u16,
}

/// Game types we know how to query. Matching is case-insensitive.
pub fn game_kind(game: &str) -> Option<GameKind> {
    let (protocol, default_port) = match game.trim().to_lowercase().as_str() {
        "minecraft" | "mc" => (QueryProtocol::Minecraft, minecraft_ping::DEFAULT_PORT),
        "csgo" | "cs2" | "css" | "tf2" | "garrysmod" | "gmod" | "left4dead2" | "l4d2"
        | "insurgency" | "hl2dm" | "dods" | "arkse" => {
            (QueryProtocol::Source, source_query::DEFAULT_PORT)
        }
        "rust" => (QueryProtocol::Source, 28015),
        "valheim" => (QueryProtocol::Source, 2457),
        _ => return None,
    };

    Some(GameKind {
        protocol,
        default_port,
    })
}

/// `StatusQuery` over the real network protocols.
#[derive(Debug, Default, Clone, Copy)]
pub struct GameQueryClient;

impl GameQueryClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatusQuery for GameQueryClient {
    async fn query(
        &self,
        game: &str,
        host: &str,
        port: Option<u16>,
        timeout: Duration,
    ) -> Result<ServerInfo, QueryError> {
        let kind = game_kind(game).ok_or_else(|| QueryError::UnsupportedGame(game.to_string()))?;
        let port = port.filter(|p| *p != 0).unwrap_or(kind.default_port);

        tracing::debug!(game, host, port, "Querying game server");
        match kind.protocol {
            QueryProtocol::Minecraft => minecraft_ping::ping(host, port, timeout).await,
            QueryProtocol::Source => source_query::query(host, port, timeout).await,
        }
    }
}
