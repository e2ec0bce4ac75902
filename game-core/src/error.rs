use game_types::GameError;

/// Failure reported by a record or user-state store.
#[derive(Debug, Clone, thiserror::Error)]
#[error("store error: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    /// The player already spun during the current calendar day.
    #[error("already played today")]
    AlreadyPlayed,
    /// The play could not be durably recorded, so no result may be shown.
    #[error("failed to persist play: {0}")]
    Persistence(#[from] StoreError),
    #[error("grid generation failed: {0}")]
    Generation(GameError),
}

impl From<&PlayError> for GameError {
    fn from(error: &PlayError) -> Self {
        match error {
            PlayError::AlreadyPlayed => GameError::AlreadyPlayedToday,
            PlayError::Persistence(e) => GameError::PersistenceFailed {
                message: e.message.clone(),
            },
            PlayError::Generation(e) => e.clone(),
        }
    }
}
