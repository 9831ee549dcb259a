//! Decoders for complete (reassembled) response bodies

use crate::ClientError;
use protocol::{PacketReader, ResponseType};

/// Decoded info response
#[derive(Debug, Clone, PartialEq)]
pub struct InfoResponse {
    pub protocol: u8,
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: i16,
    pub players: u8,
    pub max_players: u8,
    pub bots: u8,
    /// `d` dedicated, `l` listen
    pub server_type: char,
    /// `w`, `l` or `o`
    pub platform: char,
    pub password: bool,
    pub anti_cheat: bool,
    pub version: String,
}

impl InfoResponse {
    pub fn decode(body: &[u8]) -> Result<Self, ClientError> {
        let mut reader = PacketReader::new(body);
        expect_kind(&mut reader, ResponseType::Info)?;

        Ok(InfoResponse {
            protocol: reader.u8()?,
            name: reader.cstr()?,
            map: reader.cstr()?,
            folder: reader.cstr()?,
            game: reader.cstr()?,
            app_id: reader.i16()?,
            players: reader.u8()?,
            max_players: reader.u8()?,
            bots: reader.u8()?,
            server_type: reader.u8()? as char,
            platform: reader.u8()? as char,
            password: reader.u8()? != 0,
            anti_cheat: reader.u8()? != 0,
            version: reader.cstr()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub index: u8,
    pub name: String,
    pub score: i32,
    /// Seconds since the player joined
    pub duration: f32,
}

pub fn decode_players(body: &[u8]) -> Result<Vec<PlayerEntry>, ClientError> {
    let mut reader = PacketReader::new(body);
    expect_kind(&mut reader, ResponseType::Player)?;

    let count = reader.u8()?;
    let mut players = Vec::with_capacity(count as usize);
    for _ in 0..count {
        players.push(PlayerEntry {
            index: reader.u8()?,
            name: reader.cstr()?,
            score: reader.i32()?,
            duration: reader.f32()?,
        });
    }
    Ok(players)
}

/// Rule count of a rules response. Only empty rule sets are advertised by the
/// responder, so the rule entries themselves are not decoded.
pub fn decode_rule_count(body: &[u8]) -> Result<u16, ClientError> {
    let mut reader = PacketReader::new(body);
    expect_kind(&mut reader, ResponseType::Rules)?;

    // Full implementations send a 2-byte count
    if reader.remaining() >= 2 {
        Ok(reader.u16()?)
    } else {
        Ok(reader.u8()? as u16)
    }
}

/// Token carried by a CHALLENGE response, if `body` is one.
pub fn challenge_token(body: &[u8]) -> Option<i32> {
    match body {
        [kind, a, b, c, d] if *kind == ResponseType::Challenge as u8 => {
            Some(i32::from_le_bytes([*a, *b, *c, *d]))
        }
        _ => None,
    }
}

fn expect_kind(reader: &mut PacketReader<'_>, expected: ResponseType) -> Result<(), ClientError> {
    let found = reader.u8()?;
    if found != expected as u8 {
        return Err(ClientError::UnexpectedResponse { expected, found });
    }
    Ok(())
}
