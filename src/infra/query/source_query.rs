//! Valve Source engine server queries (`A2S_INFO` and `A2S_PLAYER`) over UDP.
//!
//! Both requests may be answered with a challenge (`S2C_CHALLENGE`), in which
//! case the request is repeated with the 4-byte challenge appended. Split
//! (multi-packet) responses are rejected.

use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::core::status::status_models::normalize_player_name;
use crate::core::status::{QueryError, ServerInfo};

pub const DEFAULT_PORT: u16 = 27015;

const SINGLE_PACKET: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const SPLIT_PACKET: [u8; 4] = [0xFE, 0xFF, 0xFF, 0xFF];
const A2S_INFO: u8 = 0x54;
const A2S_PLAYER: u8 = 0x55;
const S2C_CHALLENGE: u8 = 0x41;
const S2A_INFO: u8 = 0x49;
const S2A_PLAYER: u8 = 0x44;
const INFO_PAYLOAD: &[u8] = b"Source Engine Query\0";
const MAX_DATAGRAM: usize = 1400;
/// Share of the budget held back from `A2S_PLAYER`, so a silent player
/// request gives up before the caller's own timeout on the whole query.
const PLAYER_RESERVE_DIVISOR: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReply {
    pub name: String,
    pub map: String,
    pub max_players: u8,
}

/// What the server sent back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Reply<'a> {
    Challenge([u8; 4]),
    Body { kind: u8, body: &'a [u8] },
}

/// Query `host:port`. The player list is best-effort: a server that answers
/// `A2S_INFO` is online even if it refuses to list its players.
///
/// All exchanges share one `timeout` budget measured from the start of the call.
pub async fn query(host: &str, port: u16, timeout: Duration) -> Result<ServerInfo, QueryError> {
    let deadline = Instant::now() + timeout;
    let player_deadline = deadline - timeout / PLAYER_RESERVE_DIVISOR;

    let addr = tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| QueryError::Protocol(format!("could not resolve {}", host)))?;
    let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(addr).await?;

    let info = request(&socket, &info_request(None), S2A_INFO, deadline, |challenge| {
        info_request(Some(challenge))
    })
    .await
    .and_then(|body| parse_info(&body))?;

    let players = match request(
        &socket,
        &player_request([0xFF; 4]),
        S2A_PLAYER,
        player_deadline,
        player_request,
    )
    .await
    .and_then(|body| parse_players(&body))
    {
        Ok(players) => players,
        Err(e) => {
            tracing::debug!("A2S_PLAYER failed for {}: {}", addr, e);
            Vec::new()
        }
    };

    Ok(ServerInfo {
        name: info.name,
        map: info.map,
        max_players: u32::from(info.max_players),
        players,
    })
}

fn info_request(challenge: Option<[u8; 4]>) -> Vec<u8> {
    let mut packet = SINGLE_PACKET.to_vec();
    packet.push(A2S_INFO);
    packet.extend_from_slice(INFO_PAYLOAD);
    if let Some(challenge) = challenge {
        packet.extend_from_slice(&challenge);
    }
    packet
}

fn player_request(challenge: [u8; 4]) -> Vec<u8> {
    let mut packet = SINGLE_PACKET.to_vec();
    packet.push(A2S_PLAYER);
    packet.extend_from_slice(&challenge);
    packet
}

/// Send `first`, answer at most one challenge, and return the body of the
/// `expected` reply. Both round trips must finish by `deadline`.
async fn request(
    socket: &UdpSocket,
    first: &[u8],
    expected: u8,
    deadline: Instant,
    with_challenge: impl Fn([u8; 4]) -> Vec<u8>,
) -> Result<Vec<u8>, QueryError> {
    let mut reply = exchange(socket, first, deadline).await?;

    let challenge = match parse_reply(&reply)? {
        Reply::Challenge(challenge) => Some(challenge),
        Reply::Body { .. } => None,
    };
    if let Some(challenge) = challenge {
        reply = exchange(socket, &with_challenge(challenge), deadline).await?;
    }

    match parse_reply(&reply)? {
        Reply::Body { kind, body } if kind == expected => Ok(body.to_vec()),
        Reply::Body { kind, .. } => Err(QueryError::Protocol(format!(
            "unexpected reply type {:#04x}",
            kind
        ))),
        Reply::Challenge(_) => Err(QueryError::Protocol("repeated challenge".into())),
    }
}

async fn exchange(socket: &UdpSocket, packet: &[u8], deadline: Instant) -> Result<Vec<u8>, QueryError> {
    let budget = deadline.saturating_duration_since(Instant::now());
    socket.send(packet).await?;
    let mut buf = vec![0u8; MAX_DATAGRAM];
    let len = tokio::time::timeout_at(deadline, socket.recv(&mut buf))
        .await
        .map_err(|_| QueryError::Timeout(budget))??;
    buf.truncate(len);
    Ok(buf)
}

fn parse_reply(datagram: &[u8]) -> Result<Reply<'_>, QueryError> {
    if datagram.starts_with(&SPLIT_PACKET) {
        return Err(QueryError::Protocol("split responses are not supported".into()));
    }
    if datagram.len() < 5 || !datagram.starts_with(&SINGLE_PACKET) {
        return Err(QueryError::Protocol("malformed reply header".into()));
    }

    let kind = datagram[4];
    let body = &datagram[5..];
    if kind == S2C_CHALLENGE {
        let challenge: [u8; 4] = body
            .get(..4)
            .and_then(|c| c.try_into().ok())
            .ok_or_else(|| QueryError::Protocol("truncated challenge".into()))?;
        return Ok(Reply::Challenge(challenge));
    }
    Ok(Reply::Body { kind, body })
}

/// Parse an `S2A_INFO` body (header and type byte already stripped).
pub fn parse_info(body: &[u8]) -> Result<InfoReply, QueryError> {
    let mut reader = PacketReader::new(body);
    let _protocol = reader.u8()?;
    let name = reader.cstring()?;
    let map = reader.cstring()?;
    let _folder = reader.cstring()?;
    let _game = reader.cstring()?;
    let _app_id = reader.u16_le()?;
    // Bots and hidden players make this disagree with A2S_PLAYER; the list wins
    let _players = reader.u8()?;
    let max_players = reader.u8()?;

    Ok(InfoReply {
        name,
        map,
        max_players,
    })
}

/// Parse an `S2A_PLAYER` body into player names.
pub fn parse_players(body: &[u8]) -> Result<Vec<String>, QueryError> {
    let mut reader = PacketReader::new(body);
    let count = reader.u8()?;
    let mut players = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let _index = reader.u8()?;
        let name = reader.cstring()?;
        // score (i32) and connection time (f32)
        reader.skip(8)?;
        players.push(normalize_player_name(Some(&name)));
    }

    Ok(players)
}

struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], QueryError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| QueryError::Protocol("truncated packet".into()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), QueryError> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, QueryError> {
        Ok(self.take(1)?[0])
    }

    fn u16_le(&mut self) -> Result<u16, QueryError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn cstring(&mut self) -> Result<String, QueryError> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| QueryError::Protocol("unterminated string".into()))?;
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }
}
