//! Host game server state as seen by the query responder
//!
//! The responder never owns this state. It asks a [`ServerStateProvider`] for a
//! fresh snapshot on every request. [`HostState`] is the in-memory provider used
//! by the standalone binary and the tests: it tracks the roster and records a
//! join time when a player joins, clearing it again when they leave.

use log::info;
use serde::Deserialize;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Instant;

/// Identity and configuration of the host server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    /// Raw world identifier, possibly a path with an extension
    pub world: String,
    pub max_players: u32,
    pub dedicated: bool,
    pub has_password: bool,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlinePlayer {
    pub name: String,
    /// `None` when no join time was recorded for this player
    pub joined_at: Option<Instant>,
}

/// Read-only view of the host game server
///
/// Both calls are made fresh for every query; implementations return
/// point-in-time copies.
pub trait ServerStateProvider: Send + Sync {
    fn info(&self) -> ServerInfo;

    /// Online players in roster order.
    fn online_players(&self) -> Vec<OnlinePlayer>;
}

fn default_max_players() -> u32 {
    16
}

fn default_dedicated() -> bool {
    true
}

/// Host identity loaded from flags or a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    pub name: String,
    pub world: String,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_dedicated")]
    pub dedicated: bool,
    pub version: String,
    /// Players reported as online from startup
    #[serde(default)]
    pub players: Vec<String>,
}

impl HostConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&contents)?)
    }
}

/// In-memory host state with join time tracking
#[derive(Debug)]
pub struct HostState {
    info: ServerInfo,
    roster: RwLock<Vec<OnlinePlayer>>,
}

impl HostState {
    /// Creates the state and marks every configured player as joined now.
    pub fn new(config: HostConfig) -> Self {
        let info = ServerInfo {
            name: config.name,
            world: config.world,
            max_players: config.max_players,
            dedicated: config.dedicated,
            has_password: config.password.is_some(),
            version: config.version,
        };

        let state = Self {
            info,
            roster: RwLock::new(Vec::new()),
        };
        for name in config.players {
            state.player_joined(&name);
        }
        state
    }

    /// Records a join. A player already online gets a fresh join time.
    pub fn player_joined(&self, name: &str) {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        let now = Some(Instant::now());

        match roster.iter_mut().find(|p| p.name == name) {
            Some(player) => player.joined_at = now,
            None => roster.push(OnlinePlayer {
                name: name.to_string(),
                joined_at: now,
            }),
        }
        info!("Player {} joined ({} online)", name, roster.len());
    }

    /// Removes a player and their join record. Returns false if they were not online.
    pub fn player_left(&self, name: &str) -> bool {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        let before = roster.len();
        roster.retain(|p| p.name != name);

        let removed = roster.len() != before;
        if removed {
            info!("Player {} left ({} online)", name, roster.len());
        }
        removed
    }

    /// Overrides the recorded join time of an online player.
    pub fn set_join_time(&self, name: &str, joined_at: Option<Instant>) -> bool {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        match roster.iter_mut().find(|p| p.name == name) {
            Some(player) => {
                player.joined_at = joined_at;
                true
            }
            None => false,
        }
    }
}

impl ServerStateProvider for HostState {
    fn info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn online_players(&self) -> Vec<OnlinePlayer> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
