//! Configuration utilities (port, image source, game tuning env vars)

use std::{env, net::{Ipv4Addr, SocketAddr}};
use std::str::FromStr;
use std::time::Duration;

use crate::game::{GameConfig, JoinPolicy};

/// How long a mismatched pair stays face up before it is hidden again.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(2000);

pub const DEFAULT_IMAGE_SOURCE: &str = "./data/images.csv";

/// What a state broadcast carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotMode {
    #[default]
    Full,
    CardsOnly,
}

impl FromStr for SnapshotMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(SnapshotMode::Full),
            "cards" | "cards_only" | "cards-only" => Ok(SnapshotMode::CardsOnly),
            _ => Err(()),
        }
    }
}

/// Runtime knobs of a room.
#[derive(Debug, Clone)]
pub struct Settings {
    pub reveal_delay: Duration,
    pub join_policy: JoinPolicy,
    pub snapshot_mode: SnapshotMode,
    /// Board shown in the lobby before anyone starts a game.
    pub lobby_config: GameConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            join_policy: JoinPolicy::Anytime,
            snapshot_mode: SnapshotMode::Full,
            lobby_config: GameConfig::default(),
        }
    }
}

impl Settings {
    /// Read settings from the environment, falling back to defaults on missing or bad values.
    ///
    /// REVEAL_DELAY_MS, ALLOW_LATE_JOIN, SNAPSHOT_MODE, DEFAULT_ROWS, DEFAULT_COLS,
    /// DEFAULT_MAX_PLAYERS
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        let reveal_delay = parse_var::<u64>("REVEAL_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.reveal_delay);
        let join_policy = match parse_var::<bool>("ALLOW_LATE_JOIN") {
            Some(false) => JoinPolicy::BeforeFirstFlip,
            _ => JoinPolicy::Anytime,
        };
        let snapshot_mode = parse_var::<SnapshotMode>("SNAPSHOT_MODE").unwrap_or_default();
        let lobby_config = GameConfig {
            rows: parse_var("DEFAULT_ROWS").unwrap_or(defaults.lobby_config.rows),
            cols: parse_var("DEFAULT_COLS").unwrap_or(defaults.lobby_config.cols),
            max_players: parse_var("DEFAULT_MAX_PLAYERS").unwrap_or(defaults.lobby_config.max_players),
        };
        Self { reveal_delay, join_policy, snapshot_mode, lobby_config }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = parse_var::<u16>("PORT").unwrap_or(8080);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Where card images come from: `IMAGE_SOURCE` (URL or CSV path), else the bundled sample.
pub fn image_source() -> String {
    env::var("IMAGE_SOURCE").unwrap_or_else(|_| DEFAULT_IMAGE_SOURCE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_mode_parsing() {
        assert_eq!("full".parse::<SnapshotMode>(), Ok(SnapshotMode::Full));
        assert_eq!(" Cards ".parse::<SnapshotMode>(), Ok(SnapshotMode::CardsOnly));
        assert!("everything".parse::<SnapshotMode>().is_err());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.reveal_delay, Duration::from_secs(2));
        assert_eq!(settings.join_policy, JoinPolicy::Anytime);
        assert_eq!(settings.lobby_config, GameConfig { rows: 4, cols: 4, max_players: 2 });
    }
}
