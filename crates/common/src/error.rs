//! Error types shared across GestureMouse crates.

use std::path::PathBuf;

/// Top-level error type for GestureMouse operations.
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    /// Wrist and reference knuckle coincide (or a joint is not finite), so
    /// no hand scale can be derived for this frame.
    #[error("Degenerate hand geometry (hand scale {scale})")]
    DegenerateHand { scale: f64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input sink error: {message}")]
    Sink { message: String },

    #[error("Frame source error: {message}")]
    FrameSource { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GestureError.
pub type GestureResult<T> = Result<T, GestureError>;

impl GestureError {
    pub fn degenerate_hand(scale: f64) -> Self {
        Self::DegenerateHand { scale }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn frame_source(msg: impl Into<String>) -> Self {
        Self::FrameSource {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_names_path() {
        let err = GestureError::FileNotFound {
            path: PathBuf::from("/tmp/frames.jsonl"),
        };
        assert_eq!(err.to_string(), "File not found: /tmp/frames.jsonl");
    }

    #[test]
    fn test_error_messages() {
        let err = GestureError::config("bad field");
        assert_eq!(err.to_string(), "Configuration error: bad field");
    }
}
