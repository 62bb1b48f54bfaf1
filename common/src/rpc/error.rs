use std::time::Duration;

use serde_json::Error as SerdeError;
use thiserror::Error;

use super::JsonRpcError;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Invalid node address '{0}': {1}")]
    InvalidAddress(String, url::ParseError),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),
    #[error("Connection failed: {0}")]
    Connect(reqwest::Error),
    #[error("Network error: {0}")]
    Transport(reqwest::Error),
    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] SerdeError),
    #[error("No result in response")]
    MissingResult,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    // The node could not be reached or did not answer in time.
    // Such a request may or may not have been processed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connect(_) | Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    // The node answered and refused the request
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}
