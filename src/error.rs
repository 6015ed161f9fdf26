use crate::board::{Color, Square};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid move: {from:?} -> {to:?}: {reason}")]
    InvalidMove {
        from: Square,
        to: Square,
        reason: &'static str,
    },

    #[error("game is already over")]
    GameOver,

    #[error("it is {0:?}'s turn")]
    NotYourTurn(Color),

    #[error("room {0} is waiting for an opponent")]
    WaitingForOpponent(u32),

    #[error("no active game with id {0}")]
    NoActiveGame(u32),

    #[error("no moves to undo")]
    NoHistory,

    #[error("stale state: client saw version {seen}, game is at version {current}")]
    StaleState { seen: u64, current: u64 },

    #[error("only {0:?} may take back the last move")]
    UndoRefused(Color),

    #[error("computer has no legal move in room {0}; undo or reset to continue")]
    ComputerHasNoMove(u32),

    #[error("client is not seated in room {0}")]
    NotSeated(u32),

    #[error("room {0} is full")]
    RoomFull(u32),

    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Coarse classification sent to clients next to the message text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InvalidMove,
    NoActiveGame,
    NoHistory,
    StaleState,
    NotSeated,
    RoomFull,
    Malformed,
    NoLegalMove,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidMove { .. }
            | GameError::GameOver
            | GameError::NotYourTurn(_)
            | GameError::WaitingForOpponent(_)
            | GameError::UndoRefused(_) => ErrorKind::InvalidMove,
            GameError::ComputerHasNoMove(_) => ErrorKind::NoLegalMove,
            GameError::NoActiveGame(_) => ErrorKind::NoActiveGame,
            GameError::NoHistory => ErrorKind::NoHistory,
            GameError::StaleState { .. } => ErrorKind::StaleState,
            GameError::NotSeated(_) => ErrorKind::NotSeated,
            GameError::RoomFull(_) => ErrorKind::RoomFull,
            GameError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}
