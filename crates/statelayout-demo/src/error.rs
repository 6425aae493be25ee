use std::path::PathBuf;

use statelayout::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("request still failing after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl DemoError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } | Self::MissingPath { .. } => 2,
            Self::RetriesExhausted { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
