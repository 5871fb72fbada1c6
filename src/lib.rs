//! Real-time memory pairs game server.
//!
//! [`deck`] deals the board, [`game`] holds the turn-based session state machine, [`room`] owns
//! the live session and fans updates out to WebSocket observers.

pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod http;
pub mod room;
pub mod source;
pub mod telemetry;
pub mod util;
pub mod ws;
