// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

#[allow(clippy::result_large_err)]
#[derive(Debug, Error)]
pub enum RancherError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token looks invalid: expected the form username:password")]
    InvalidCredentialFormat,

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}")]
    RemoteApi { status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Invalid login method type: {0} (expected \"local\" or \"ldap\")")]
    UnsupportedMethod(String),

    #[error("Invalid cluster name specified: {0}")]
    UnknownCluster(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Credential prompt failed: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for RancherError {
    fn from(e: serde_json::Error) -> Self {
        RancherError::Decode(e.to_string())
    }
}

impl RancherError {
    /// HTTP status carried by a [`RancherError::RemoteApi`] failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            RancherError::RemoteApi { status } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RancherError>;
