//! Error types shared across Clipweave crates.
//!
//! The engine distinguishes between failures that are absorbed locally
//! (missing ids, per-item decode failures, malformed animations) and
//! failures that must reach the caller. Only the latter are represented
//! here; the former are logged at the call site and skipped.

/// Top-level error type for Clipweave operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipweaveError {
    /// A single media resource could not be resolved or decoded.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// A persisted project could not be read under any known layout.
    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipweaveError.
pub type ClipweaveResult<T> = Result<T, ClipweaveError>;

impl ClipweaveError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    /// Whether this error means the persisted bytes themselves are unusable.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
