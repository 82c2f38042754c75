//! Client error types.

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::credential::CredentialError;

/// Problems detected before a connection task is started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("match id must be non-empty and alphanumeric, got: {0:?}")]
    InvalidMatchId(String),
    #[error("server url must start with ws:// or wss://, got: {0:?}")]
    InvalidServerUrl(String),
}

/// Any error surfaced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
