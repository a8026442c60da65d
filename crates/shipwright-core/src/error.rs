//! Error types for Shipwright.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("command exited with nonzero status: {command}")]
    ExecutionFailed {
        command: String,
        code: Option<i32>,
    },

    #[error("credential permission setup failed: {0}")]
    PermissionSetupFailed(String),

    #[error("workspace setup failed: {0}")]
    WorkspaceSetup(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
