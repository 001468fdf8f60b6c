//! # Query Protocol Library
//!
//! Wire-level implementation of the A2S-style server query protocol shared
//! by the watcher's networking layer and the test suite. The protocol is
//! connectionless UDP: one request datagram, one response datagram, every
//! packet prefixed with the `FF FF FF FF` header.
//!
//! Two conversations are supported:
//!
//! - **INFO**: a single round trip returning the server's display name,
//!   current map, folder, game description and player counts.
//! - **PLAYER**: a two-phase handshake. The first request carries a
//!   placeholder challenge of `-1` and is answered with a challenge token
//!   (opcode 0x41); echoing that token back yields the roster (opcode 0x44).
//!
//! All encoding and decoding here is pure and socket-free so it can be unit
//! tested from byte buffers. Socket handling, timeouts and retries live in
//! the `watcher` crate.
//!
//! Decoding uses the bounds-checked cursor in [`codec`]; a short INFO or
//! challenge packet is an error, while a PLAYER roster cut off mid-record
//! yields the records that decoded cleanly (live servers routinely advertise
//! a count the datagram does not fully back).

pub mod codec;

use codec::{PacketReader, TruncatedPacket};
use log::debug;
use thiserror::Error;

/// Four-byte prefix carried by every request and response datagram.
pub const PACKET_HEADER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Literal tag string (including terminator) that forms the INFO request body.
pub const INFO_TAG: &[u8] = b"TSource Engine Query\0";

/// Request opcode for both phases of the player-list conversation.
pub const OPCODE_PLAYER_REQUEST: u8 = 0x55;

/// Expected response opcode for INFO ('I').
pub const OPCODE_INFO: u8 = 0x49;

/// Response opcode carrying a challenge token ('A').
pub const OPCODE_CHALLENGE: u8 = 0x41;

/// Response opcode carrying the player roster ('D').
pub const OPCODE_PLAYERS: u8 = 0x44;

/// Challenge value sent when no token has been issued yet.
pub const CHALLENGE_PLACEHOLDER: i32 = -1;

/// Failures of one query round trip.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Truncated(#[from] TruncatedPacket),
}

/// Snapshot of the server's advertised state, rebuilt on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: u16,
    pub players: u8,
    pub max_players: u8,
    pub bots: u8,
}

/// One connected player slot. The name is the only identity the protocol
/// provides; it is not guaranteed unique but is treated as such here.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub index: u8,
    pub name: String,
    pub score: i32,
    pub duration: f32,
}

/// Builds the fixed INFO request datagram.
pub fn info_request() -> Vec<u8> {
    let mut packet = Vec::with_capacity(PACKET_HEADER.len() + INFO_TAG.len());
    packet.extend_from_slice(&PACKET_HEADER);
    packet.extend_from_slice(INFO_TAG);
    packet
}

/// Builds a PLAYER request carrying the given challenge value.
///
/// Pass [`CHALLENGE_PLACEHOLDER`] for the first phase; echo the server's
/// token for the second.
pub fn player_request(challenge: i32) -> Vec<u8> {
    let mut packet = Vec::with_capacity(PACKET_HEADER.len() + 5);
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(OPCODE_PLAYER_REQUEST);
    packet.extend_from_slice(&challenge.to_le_bytes());
    packet
}

fn check_header(data: &[u8], context: &str) -> Result<(), QueryError> {
    if !data.starts_with(&PACKET_HEADER) {
        return Err(QueryError::Protocol(format!(
            "{} response missing packet header",
            context
        )));
    }
    Ok(())
}

/// Decodes an INFO response into a [`ServerInfo`].
///
/// The opcode byte is expected to be [`OPCODE_INFO`] but other values are
/// tolerated, since some server mods answer with a different byte while
/// keeping the body layout. Trailing bytes after the last mandatory field
/// are ignored.
pub fn decode_info(data: &[u8]) -> Result<ServerInfo, QueryError> {
    check_header(data, "info")?;

    let mut reader = PacketReader::new(data);
    reader.skip(PACKET_HEADER.len(), "header")?;

    let opcode = reader.read_u8("opcode")?;
    if opcode != OPCODE_INFO {
        debug!(
            "info response carried opcode {:#04x}, expected {:#04x}",
            opcode, OPCODE_INFO
        );
    }

    let name = reader.read_cstring("server name")?;
    let map = reader.read_cstring("map")?;
    let folder = reader.read_cstring("folder")?;
    let game = reader.read_cstring("game")?;
    let app_id = reader.read_u16_le("app id")?;
    let players = reader.read_u8("player count")?;
    let max_players = reader.read_u8("max players")?;
    let bots = reader.read_u8("bot count")?;

    Ok(ServerInfo {
        name,
        map,
        folder,
        game,
        app_id,
        players,
        max_players,
        bots,
    })
}

/// Decodes a challenge response, returning the token to echo back.
pub fn decode_challenge(data: &[u8]) -> Result<i32, QueryError> {
    check_header(data, "challenge")?;

    let mut reader = PacketReader::new(data);
    reader.skip(PACKET_HEADER.len(), "header")?;

    let opcode = reader.read_u8("opcode")?;
    if opcode != OPCODE_CHALLENGE {
        return Err(QueryError::Protocol(format!(
            "expected challenge opcode {:#04x}, got {:#04x}",
            OPCODE_CHALLENGE, opcode
        )));
    }

    Ok(reader.read_i32_le("challenge")?)
}

/// Decodes a player-list response into the records it fully contains.
///
/// The advertised count is treated as an upper bound: if the datagram ends
/// in the middle of a record, the complete records gathered so far are
/// returned instead of an error.
pub fn decode_players(data: &[u8]) -> Result<Vec<PlayerRecord>, QueryError> {
    check_header(data, "player")?;

    let mut reader = PacketReader::new(data);
    reader.skip(PACKET_HEADER.len(), "header")?;

    let opcode = reader.read_u8("opcode")?;
    if opcode != OPCODE_PLAYERS {
        return Err(QueryError::Protocol(format!(
            "expected player opcode {:#04x}, got {:#04x}",
            OPCODE_PLAYERS, opcode
        )));
    }

    let count = reader.read_u8("player count")?;
    let mut players = Vec::with_capacity(count as usize);

    for _ in 0..count {
        match read_player(&mut reader) {
            Ok(record) => players.push(record),
            Err(truncated) => {
                debug!(
                    "player list ended early: {} of {} records decoded ({})",
                    players.len(),
                    count,
                    truncated
                );
                break;
            }
        }
    }

    Ok(players)
}

fn read_player(reader: &mut PacketReader) -> Result<PlayerRecord, TruncatedPacket> {
    let index = reader.read_u8("player index")?;
    let name = reader.read_cstring("player name")?;
    let score = reader.read_i32_le("player score")?;
    let duration = reader.read_f32_le("player duration")?;

    Ok(PlayerRecord {
        index,
        name,
        score,
        duration,
    })
}
