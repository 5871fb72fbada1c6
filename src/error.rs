//! Error types shared by the deck builder, the session and the room.

use crate::source::SourceError;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid board configuration: {0}")]
    InvalidBoardConfiguration(String),
    #[error("image source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
}

impl GameError {
    pub(crate) fn board(msg: impl Into<String>) -> Self {
        GameError::InvalidBoardConfiguration(msg.into())
    }
}
