// Domain models for game server status.
//
// These are the only shapes the rest of the bot ever sees. Raw protocol
// payloads (optional names, numeric online counts that disagree with the
// player list, etc.) are normalized into `ServerStatus` before they leave
// the query layer.

/// Name used for players the server reports without one.
pub const UNKNOWN_PLAYER: &str = "unknown";

/// Snapshot of a game server, produced by one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Offline,
    Online(ServerInfo),
}

/// Everything we know about a server that answered its status query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerInfo {
    pub name: String,
    /// Empty when the game has no notion of a map (Minecraft, for one).
    pub map: String,
    pub max_players: u32,
    pub players: Vec<String>,
}

impl ServerInfo {
    /// The online count we display. The player list wins over any numeric
    /// count the server reported.
    pub fn online_count(&self) -> usize {
        self.players.len()
    }
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, ServerStatus::Online(_))
    }

    pub fn info(&self) -> Option<&ServerInfo> {
        match self {
            ServerStatus::Online(info) => Some(info),
            ServerStatus::Offline => None,
        }
    }
}

/// Turns an optional upstream player name into the name we display.
pub fn normalize_player_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => UNKNOWN_PLAYER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_count_uses_player_list() {
        let info = ServerInfo {
            name: "Survival".into(),
            map: String::new(),
            max_players: 20,
            players: vec!["Alice".into(), "Bob".into()],
        };
        assert_eq!(info.online_count(), 2);
        assert!(ServerStatus::Online(info).is_online());
        assert!(!ServerStatus::Offline.is_online());
    }

    #[test]
    fn nameless_players_become_unknown() {
        assert_eq!(normalize_player_name(None), "unknown");
        assert_eq!(normalize_player_name(Some("  ")), "unknown");
        assert_eq!(normalize_player_name(Some("Steve")), "Steve");
    }
}
