use reelchain_common::{
    crypto::{CryptoError, Digest, ObjectId},
    rpc::RpcError,
    transaction::{builder::BuilderError, SigningError},
    utils::AmountError,
};
use thiserror::Error;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Manifest '{path}' is unavailable: {reason}")]
    ManifestUnavailable { path: String, reason: String },
    #[error("Logical name cannot be empty")]
    EmptyLogicalName,
    #[error("No object named '{0}' in manifest")]
    NameNotFound(String),
    #[error("No capability of type {capability_type} owned by {owner}")]
    CapabilityNotFound {
        owner: String,
        capability_type: String,
    },
    #[error("Object {0} does not exist")]
    ObjectNotFound(ObjectId),
    #[error("Found {} capabilities of type {capability_type}, expected one", .candidates.len())]
    AmbiguousResult {
        capability_type: String,
        candidates: Vec<ObjectId>,
    },
    #[error("Capability {0} is not owned by the caller")]
    CapabilityNotOwned(ObjectId),
    #[error("Remote ledger unavailable: {0}")]
    RemoteUnavailable(#[source] RpcError),
    #[error("Unexpected answer from remote ledger: {0}")]
    RemoteError(#[source] RpcError),
    #[error("Transaction rejected by the node: {0}")]
    SubmissionError(#[source] RpcError),
    #[error("Transaction {digest} failed: {error}")]
    ConfirmationError { digest: Digest, error: String },
    #[error("Transaction {digest} was submitted but its outcome is unknown: {source}")]
    ConfirmationUnknown {
        digest: Digest,
        #[source]
        source: RpcError,
    },
    #[error("Malformed {event_type} event: {reason}")]
    MalformedEvent { event_type: String, reason: String },
    #[error("Malformed object {object_id}: {reason}")]
    MalformedObject { object_id: ObjectId, reason: String },
    #[error("Invalid key: {0}")]
    InvalidKey(#[source] CryptoError),
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("Invalid address: {0}")]
    InvalidAddress(#[source] CryptoError),
    #[error("Insufficient gas: budget is {required} but only {available} is available")]
    InsufficientGas { required: u64, available: u64 },
    #[error(transparent)]
    Builder(#[from] BuilderError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Failed to encode transaction: {0}")]
    Encoding(#[from] bcs::Error),
}

impl ClientError {
    // Read paths only: a transient failure becomes RemoteUnavailable
    pub fn remote(error: RpcError) -> Self {
        if error.is_transient() {
            Self::RemoteUnavailable(error)
        } else {
            Self::RemoteError(error)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NameNotFound(_) | Self::CapabilityNotFound { .. } | Self::ObjectNotFound(_)
        )
    }

    // Whether repeating the same operation is safe and may succeed.
    // A submission with an unknown outcome is never safe to repeat blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_))
    }
}

impl From<RpcError> for ClientError {
    fn from(error: RpcError) -> Self {
        Self::remote(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rpc_error_mapping() {
        let err = ClientError::from(RpcError::Timeout(Duration::from_secs(30)));
        assert!(matches!(err, ClientError::RemoteUnavailable(_)));
        assert!(err.is_retryable());

        let err = ClientError::from(RpcError::MissingResult);
        assert!(matches!(err, ClientError::RemoteError(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unknown_outcome_is_not_retryable() {
        let err = ClientError::ConfirmationUnknown {
            digest: Digest::zero(),
            source: RpcError::Timeout(Duration::from_secs(30)),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("11111111111111111111111111111111"));
    }

    #[test]
    fn test_not_found_family() {
        assert!(ClientError::NameNotFound("package".to_owned()).is_not_found());
        assert!(ClientError::ObjectNotFound(ObjectId::ZERO).is_not_found());
        assert!(!ClientError::EmptyLogicalName.is_not_found());
    }

    #[test]
    fn test_ambiguous_message() {
        let err = ClientError::AmbiguousResult {
            capability_type: "0x1::profile::ProfileOwnerCap".to_owned(),
            candidates: vec![ObjectId::from_u8(1), ObjectId::from_u8(2)],
        };
        assert_eq!(
            err.to_string(),
            "Found 2 capabilities of type 0x1::profile::ProfileOwnerCap, expected one"
        );
    }
}
