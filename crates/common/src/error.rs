//! Error types shared across Playtrace crates.

/// Top-level error type for Playtrace operations.
#[derive(Debug, thiserror::Error)]
pub enum PlaytraceError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Merge error: {message}")]
    Merge { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A key release was observed with no matching press in the active set.
    #[error("Inconsistent key state: release of '{key}' at {timestamp_secs}s without a prior press")]
    InconsistentKeyState { key: String, timestamp_secs: f64 },

    /// Fewer than two dataset items, or a non-positive time span: no
    /// average rate exists.
    #[error("Cannot derive an average frame rate: {items} item(s) over no usable time span")]
    DegenerateRate { items: usize },

    #[error("Session produced no dataset items")]
    EmptySession,

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PlaytraceError.
pub type PlaytraceResult<T> = Result<T, PlaytraceError>;

impl PlaytraceError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn merge(msg: impl Into<String>) -> Self {
        Self::Merge {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
