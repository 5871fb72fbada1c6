//! Game state: players, board config and the session state machine.

pub mod session;

use serde::{Deserialize, Serialize};

use crate::util::id::ConnectionId;

pub use session::{FlipReveal, GameSession, PendingHide, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub rows: u32,
    pub cols: u32,
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { rows: 4, cols: 4, max_players: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub connection: ConnectionId,
    pub display_name: String,
    pub score: u32,
}

/// Final result line carried by `game_over`, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub display_name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Active,
    Resolving,
    Complete,
}

/// Whether players may still take a seat once the first card of a game has been turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    #[default]
    Anytime,
    BeforeFirstFlip,
}
