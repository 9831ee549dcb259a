//! Response bodies for info, player and rules queries
//!
//! Field order and widths are fixed by the protocol; client tools parse these
//! byte for byte.

use crate::state::{OnlinePlayer, ServerInfo};
use protocol::{PacketWriter, ResponsePayload, ResponseType};
use std::time::Instant;

/// Operating system byte of the info response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Mac,
}

impl Platform {
    /// Platform this process was built for.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(unix) {
            Platform::Linux
        } else {
            Platform::Windows
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Platform::Windows => b'w',
            Platform::Linux => b'l',
            Platform::Mac => b'o',
        }
    }
}

/// Fixed game literals reported in the info response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameIdentity {
    pub folder: String,
    pub game: String,
    /// Borrowed from the engine whose protocol is emulated
    pub app_id: i16,
}

impl Default for GameIdentity {
    fn default() -> Self {
        Self {
            folder: "vintagestory".to_string(),
            game: "Vintage Story".to_string(),
            app_id: 204,
        }
    }
}

/// Strips the directory and the extension from a raw world identifier.
///
/// `"/data/Saves/My World.vcdbs"` becomes `"My World"`. Without an extension
/// after the last separator the whole file name is kept.
pub fn trim_world_name(raw: &str) -> &str {
    let file = match raw.rfind(['/', '\\']) {
        Some(slash) => &raw[slash + 1..],
        None => raw,
    };
    match file.rfind('.') {
        Some(dot) => &file[..dot],
        None => file,
    }
}

/// Builds response payloads from a snapshot of host state
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    platform: Platform,
    identity: GameIdentity,
}

impl ResponseBuilder {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            identity: GameIdentity::default(),
        }
    }

    pub fn info(&self, info: &ServerInfo, online: usize) -> ResponsePayload {
        let mut writer = PacketWriter::new(ResponseType::Info);
        writer
            .u8(0) // protocol version
            .cstr(&info.name)
            .cstr(trim_world_name(&info.world))
            .cstr(&self.identity.folder)
            .cstr(&self.identity.game)
            .i16(self.identity.app_id)
            .u8(clamp_count(online))
            .u8(clamp_count(info.max_players as usize))
            .u8(0) // bots
            .u8(if info.dedicated { b'd' } else { b'l' })
            .u8(self.platform.code())
            .u8(u8::from(info.has_password))
            .u8(0) // anti-cheat
            .cstr(&info.version);
        writer.finish()
    }

    /// Player list with durations measured against `now`. Only the first 255
    /// players fit the count byte.
    pub fn players(&self, players: &[OnlinePlayer], now: Instant) -> ResponsePayload {
        let listed = &players[..players.len().min(u8::MAX as usize)];

        let mut writer = PacketWriter::new(ResponseType::Player);
        writer.u8(listed.len() as u8);
        for (index, player) in listed.iter().enumerate() {
            let duration = player
                .joined_at
                .map(|joined| now.saturating_duration_since(joined).as_secs_f32())
                .unwrap_or(0.0);

            writer
                .u8(index as u8)
                .cstr(&player.name)
                .i32(0) // score
                .f32(duration);
        }
        writer.finish()
    }

    /// The emulation advertises no rules.
    pub fn rules(&self) -> ResponsePayload {
        let mut writer = PacketWriter::new(ResponseType::Rules);
        writer.u8(0);
        writer.finish()
    }
}

fn clamp_count(count: usize) -> u8 {
    u8::try_from(count).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use protocol::PacketReader;
    use std::time::Duration;

    fn server_info() -> ServerInfo {
        ServerInfo {
            name: "My Server".to_string(),
            world: "C:\\Saves\\default.vcdbs".to_string(),
            max_players: 16,
            dedicated: true,
            has_password: false,
            version: "1.19.8".to_string(),
        }
    }

    #[test]
    fn test_trim_world_name() {
        assert_eq!(trim_world_name("/srv/data/Saves/My World.vcdbs"), "My World");
        assert_eq!(trim_world_name("C:\\Saves\\default.vcdbs"), "default");
        assert_eq!(trim_world_name("mixed/path\\world.tar.gz"), "world.tar");
        assert_eq!(trim_world_name("plain.vcdbs"), "plain");
        assert_eq!(trim_world_name("no_extension"), "no_extension");
        assert_eq!(trim_world_name("dir.d/no_extension"), "no_extension");
        assert_eq!(trim_world_name(""), "");
    }

    #[test]
    fn test_platform_codes() {
        assert_eq!(Platform::Windows.code(), b'w');
        assert_eq!(Platform::Linux.code(), b'l');
        assert_eq!(Platform::Mac.code(), b'o');
        if cfg!(target_os = "linux") {
            assert_eq!(Platform::host(), Platform::Linux);
        }
    }

    #[test]
    fn test_info_layout() {
        let builder = ResponseBuilder::new(Platform::Linux);
        let payload = builder.info(&server_info(), 3);

        let mut expected = vec![0x49, 0x00];
        expected.extend_from_slice(b"My Server\0");
        expected.extend_from_slice(b"default\0");
        expected.extend_from_slice(b"vintagestory\0");
        expected.extend_from_slice(b"Vintage Story\0");
        expected.extend_from_slice(&204i16.to_le_bytes());
        expected.extend_from_slice(&[3, 16, 0, b'd', b'l', 0, 0]);
        expected.extend_from_slice(b"1.19.8\0");
        assert_eq!(payload.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_info_flags() {
        let mut info = server_info();
        info.dedicated = false;
        info.has_password = true;
        info.max_players = 1000;

        let payload = ResponseBuilder::new(Platform::Mac).info(&info, 300);
        let mut reader = PacketReader::new(payload.as_bytes());
        reader.u8().unwrap();
        reader.u8().unwrap();
        for _ in 0..4 {
            reader.cstr().unwrap();
        }
        assert_eq!(reader.i16().unwrap(), 204);
        assert_eq!(reader.u8().unwrap(), 255);
        assert_eq!(reader.u8().unwrap(), 255);
        assert_eq!(reader.u8().unwrap(), 0);
        assert_eq!(reader.u8().unwrap(), b'l');
        assert_eq!(reader.u8().unwrap(), b'o');
        assert_eq!(reader.u8().unwrap(), 1);
        assert_eq!(reader.u8().unwrap(), 0);
        assert_eq!(reader.cstr().unwrap(), "1.19.8");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_players_empty() {
        let builder = ResponseBuilder::new(Platform::Linux);
        let payload = builder.players(&[], Instant::now());
        assert_eq!(payload.as_bytes(), &[0x44, 0x00]);
    }

    #[test]
    fn test_players_duration() {
        let joined = Instant::now();
        let now = joined + Duration::from_millis(5000);
        let players = vec![
            OnlinePlayer {
                name: "Alice".to_string(),
                joined_at: Some(joined),
            },
            OnlinePlayer {
                name: "Bob".to_string(),
                joined_at: None,
            },
        ];

        let payload = ResponseBuilder::new(Platform::Linux).players(&players, now);
        let mut reader = PacketReader::new(payload.as_bytes());
        assert_eq!(reader.u8().unwrap(), 0x44);
        assert_eq!(reader.u8().unwrap(), 2);

        assert_eq!(reader.u8().unwrap(), 0);
        assert_eq!(reader.cstr().unwrap(), "Alice");
        assert_eq!(reader.i32().unwrap(), 0);
        assert_approx_eq!(reader.f32().unwrap(), 5.0, 0.001);

        assert_eq!(reader.u8().unwrap(), 1);
        assert_eq!(reader.cstr().unwrap(), "Bob");
        assert_eq!(reader.i32().unwrap(), 0);
        assert_eq!(reader.f32().unwrap(), 0.0);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_players_join_after_now() {
        let now = Instant::now();
        let players = vec![OnlinePlayer {
            name: "Early".to_string(),
            joined_at: Some(now + Duration::from_secs(2)),
        }];
        let payload = ResponseBuilder::new(Platform::Linux).players(&players, now);
        let bytes = payload.as_bytes();
        let duration = f32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
        assert_eq!(duration, 0.0);
    }

    #[test]
    fn test_players_capped_at_255() {
        let now = Instant::now();
        let players: Vec<OnlinePlayer> = (0..300)
            .map(|i| OnlinePlayer {
                name: format!("p{}", i),
                joined_at: Some(now),
            })
            .collect();
        let payload = ResponseBuilder::new(Platform::Linux).players(&players, now);
        assert_eq!(payload.as_bytes()[1], 255);
    }

    #[test]
    fn test_rules() {
        let payload = ResponseBuilder::new(Platform::Linux).rules();
        assert_eq!(payload.as_bytes(), &[0x45, 0x00]);
    }
}
