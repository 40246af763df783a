//! Error handling - closed, matchable error taxonomy

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials file missing or malformed
    Config,
    /// Request payload not parseable or not an object
    Payload,
    /// Signature computation failed
    Signing,
    /// Network, DNS, TLS or timeout failure
    Transport,
}

/// shadow-call error hierarchy
#[derive(Debug, Error)]
pub enum Error {
    /// No home directory to locate the credentials file in
    #[error("Configuration error: HOME is not set, cannot locate credentials file")]
    HomeNotSet,

    /// Credentials file absent or unreadable
    #[error("Configuration error: credentials file not found: {}", path.display())]
    CredentialsNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required section or field absent, or empty
    #[error("Configuration error: malformed or incomplete credentials in {}: {reason}", path.display())]
    MalformedCredentials { path: PathBuf, reason: String },

    /// Payload is not a JSON object
    #[error("Payload error: {0}")]
    Payload(String),

    /// Payload text is not valid JSON, or serialization failed
    #[error("Payload error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signature computation failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Network/IO errors, including the request timeout
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HomeNotSet | Self::CredentialsNotFound { .. } | Self::MalformedCredentials { .. } => {
                ErrorKind::Config
            }
            Self::Payload(_) | Self::Json(_) => ErrorKind::Payload,
            Self::Signing(_) => ErrorKind::Signing,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    /// True when the transport gave up waiting for the remote end.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedCredentials {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
