//! Error types for the playback layer

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No audio buffer has been loaded
    #[error("No audio loaded")]
    NoBufferLoaded,

    /// A one-shot source was asked to start a second time
    #[error("Playback source already started")]
    SourceAlreadyStarted,

    /// Seek/play position is not a finite number
    #[error("Invalid position: {0}")]
    InvalidPosition(f64),

    /// Engine configuration rejected
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl From<PlaybackError> for sculpt_core::SculptError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::InvalidConfig(msg) => sculpt_core::SculptError::Context(msg),
            other => sculpt_core::SculptError::Playback(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
