//! Minecraft Java Edition "Server List Ping".
//!
//! Handshake (next state = status), an empty status request, then one
//! length-prefixed response packet carrying a JSON document. Every packet is
//! framed as `VarInt length | VarInt packet id | payload`.

use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::core::status::status_models::normalize_player_name;
use crate::core::status::{QueryError, ServerInfo};

pub const DEFAULT_PORT: u16 = 25565;

/// Protocol version sent in the handshake. Servers answer status pings for
/// any version, so an old one is fine.
const PROTOCOL_VERSION: i32 = 47;
const NEXT_STATE_STATUS: i32 = 1;
/// Real status responses are a few KiB (a favicon at most); anything beyond
/// this is not a Minecraft server.
const MAX_PACKET_LEN: usize = 1 << 21;

/// Ping `host:port` and parse its status response.
pub async fn ping(host: &str, port: u16, timeout: Duration) -> Result<ServerInfo, QueryError> {
    let mut stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| QueryError::Timeout(timeout))??;

    stream.write_all(&build_status_request(host, port)).await?;

    let length = read_varint(&mut stream).await?;
    let length = usize::try_from(length)
        .ok()
        .filter(|len| *len > 0 && *len <= MAX_PACKET_LEN)
        .ok_or_else(|| QueryError::Protocol(format!("invalid packet length {}", length)))?;

    let mut packet = vec![0u8; length];
    stream.read_exact(&mut packet).await?;
    parse_status_packet(&packet)
}

/// Handshake followed by the status request, both framed and ready to send.
pub fn build_status_request(host: &str, port: u16) -> Vec<u8> {
    let mut handshake = Vec::new();
    write_varint(&mut handshake, 0x00);
    write_varint(&mut handshake, PROTOCOL_VERSION);
    write_string(&mut handshake, host);
    handshake.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut handshake, NEXT_STATE_STATUS);

    let mut request = Vec::new();
    frame_packet(&mut request, &handshake);
    frame_packet(&mut request, &[0x00]);
    request
}

/// Parse a status response packet (length prefix already stripped).
pub fn parse_status_packet(packet: &[u8]) -> Result<ServerInfo, QueryError> {
    let (packet_id, offset) = read_varint_from_slice(packet)?;
    if packet_id != 0x00 {
        return Err(QueryError::Protocol(format!(
            "unexpected packet id {:#04x}",
            packet_id
        )));
    }
    let json = read_string(&packet[offset..])?;
    parse_status_json(&json)
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    description: Option<Description>,
    players: Players,
}

#[derive(Debug, Deserialize)]
struct Players {
    max: u32,
    #[serde(default)]
    sample: Vec<PlayerSample>,
}

#[derive(Debug, Deserialize)]
struct PlayerSample {
    #[serde(default)]
    name: Option<String>,
}

/// The MOTD is either a bare string or a chat component tree.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Text(String),
    Component {
        #[serde(default)]
        text: String,
        #[serde(default)]
        extra: Vec<Description>,
    },
}

impl Description {
    fn flatten_into(&self, out: &mut String) {
        match self {
            Description::Text(text) => out.push_str(text),
            Description::Component { text, extra } => {
                out.push_str(text);
                for part in extra {
                    part.flatten_into(out);
                }
            }
        }
    }

    fn plain_text(&self) -> String {
        let mut raw = String::new();
        self.flatten_into(&mut raw);
        strip_formatting(&raw).trim().to_string()
    }
}

/// Drop legacy `§x` color/format codes.
fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

pub fn parse_status_json(json: &str) -> Result<ServerInfo, QueryError> {
    let response: StatusResponse = serde_json::from_str(json)
        .map_err(|e| QueryError::Protocol(format!("invalid status JSON: {}", e)))?;

    Ok(ServerInfo {
        name: response
            .description
            .map(|d| d.plain_text())
            .unwrap_or_default(),
        map: String::new(),
        max_players: response.players.max,
        players: response
            .players
            .sample
            .iter()
            .map(|p| normalize_player_name(p.name.as_deref()))
            .collect(),
    })
}

fn frame_packet(out: &mut Vec<u8>, data: &[u8]) {
    write_varint(out, data.len() as i32);
    out.extend_from_slice(data);
}

/// VarInts are variable-length encoded integers, 7 bits per byte.
pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    // Unsigned so negative numbers terminate
    let mut value = value as u32;
    loop {
        let mut temp = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            temp |= 0x80;
        }
        buf.push(temp);
        if value == 0 {
            break;
        }
    }
}

/// Returns `Ok(true)` once the VarInt is complete.
fn process_varint_byte(byte: u8, result: &mut i32, shift: &mut u32) -> Result<bool, QueryError> {
    *result |= ((byte & 0x7F) as i32) << *shift;
    if byte & 0x80 == 0 {
        return Ok(true);
    }
    *shift += 7;
    if *shift >= 35 {
        return Err(QueryError::Protocol("VarInt is too big".into()));
    }
    Ok(false)
}

async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, QueryError> {
    let mut result = 0;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8().await?;
        if process_varint_byte(byte, &mut result, &mut shift)? {
            return Ok(result);
        }
    }
}

/// Returns the decoded value and the number of bytes consumed.
pub fn read_varint_from_slice(data: &[u8]) -> Result<(i32, usize), QueryError> {
    let mut result = 0;
    let mut shift = 0;
    for (pos, byte) in data.iter().enumerate() {
        if process_varint_byte(*byte, &mut result, &mut shift)? {
            return Ok((result, pos + 1));
        }
    }
    Err(QueryError::Protocol("truncated VarInt".into()))
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

fn read_string(data: &[u8]) -> Result<String, QueryError> {
    let (len, offset) = read_varint_from_slice(data)?;
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .filter(|end| *end <= data.len())
        .ok_or_else(|| QueryError::Protocol("string length exceeds packet size".into()))?;
    Ok(String::from_utf8_lossy(&data[offset..end]).into_owned())
}
