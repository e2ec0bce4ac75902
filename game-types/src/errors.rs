use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },
    #[error("grid size must be positive, got {size}")]
    InvalidGridSize { size: usize },
    #[error("symbol alphabet is empty")]
    EmptyAlphabet,
    #[error("unknown line id: {line}")]
    InvalidLineId { line: String },
    #[error("already played today")]
    AlreadyPlayedToday,
    #[error("failed to record play: {message}")]
    PersistenceFailed { message: String },
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("invalid authentication token")]
    InvalidToken,
    #[error("not authorized")]
    NotAuthorized,
    #[error("internal error: {message}")]
    InternalError { message: String },
}
