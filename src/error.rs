use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::{DomainError, InvalidStateError, NotFoundError, ValidationError};
use crate::port::Collection;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Persistence errors raised by store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection {collection} is corrupt: {source}")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The domain rule that was violated, if any.
    #[must_use]
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<InvalidStateError> for Error {
    fn from(err: InvalidStateError) -> Self {
        Self::Domain(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
