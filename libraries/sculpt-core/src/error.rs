/// Core error types for Sculpt
use thiserror::Error;

/// Result type alias using `SculptError`
pub type Result<T> = std::result::Result<T, SculptError>;

/// Unified error surface for the engine.
///
/// Every failure a collaborator can observe falls into one of five
/// categories. The engine never retries on its own (beyond a single
/// render-context resume attempt) and is left in its previous valid state
/// after any error.
#[derive(Error, Debug)]
pub enum SculptError {
    /// Render context unavailable or cannot be resumed
    #[error("Context initialization error: {0}")]
    Context(String),

    /// Unsupported or corrupt audio input
    #[error("Decode error: {0}")]
    Decode(String),

    /// Processing-graph construction failure
    #[error("Graph initialization error: {0}")]
    Graph(String),

    /// Playback source creation/start failure
    #[error("Playback error: {0}")]
    Playback(String),

    /// Export encoding failure
    #[error("Export error: {0}")]
    Export(String),
}

impl SculptError {
    /// Create a context-initialization error
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a graph-initialization error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_category() {
        let err = SculptError::decode("bad header");
        assert_eq!(err.to_string(), "Decode error: bad header");

        let err = SculptError::graph("filter rejected parameters");
        assert!(err.to_string().starts_with("Graph initialization error"));
    }
}
