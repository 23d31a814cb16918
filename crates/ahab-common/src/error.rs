//! Unified error types for the ahab workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum AhabError {
    /// The container identity or permission policy could not be resolved.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The container runtime could not be launched.
    #[error("failed to launch {program}: {reason}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Why the launch failed.
        reason: String,
    },

    /// The container runtime ran but exited unsuccessfully.
    #[error("`{command}` exited with status {code}")]
    RuntimeExit {
        /// Rendered command line that failed.
        command: String,
        /// Exit code reported by the runtime.
        code: i32,
    },
}

impl AhabError {
    /// Process exit code this error should terminate with.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::RuntimeExit { code, .. } => *code,
            Self::Config { .. } | Self::Io { .. } | Self::Spawn { .. } => 1,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AhabError>;
