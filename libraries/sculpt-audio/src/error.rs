/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// Render context unavailable, closed, or cannot resume
    #[error("Render context error: {0}")]
    Context(String),

    /// Container/codec not recognized
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    Decode(String),

    /// Graph construction/connection failure
    #[error("Graph error: {0}")]
    Graph(String),

    /// Export encoding failure
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid audio buffer handed to a processing stage
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),
}

impl From<AudioError> for sculpt_core::SculptError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Context(msg) => sculpt_core::SculptError::Context(msg),
            AudioError::UnsupportedFormat(msg)
            | AudioError::Decode(msg)
            | AudioError::Symphonia(msg) => sculpt_core::SculptError::Decode(msg),
            AudioError::Graph(msg) | AudioError::InvalidBuffer(msg) => {
                sculpt_core::SculptError::Graph(msg)
            }
            AudioError::Export(msg) => sculpt_core::SculptError::Export(msg),
        }
    }
}
