use thiserror::Error;

use crate::auth::IdentityError;

/// Errors raised while building, hashing, endorsing or assembling a transaction.
///
/// Every variant carries enough context for the caller to log the exact check
/// that failed. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum TxError {
    /// A required input was missing or empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A nested message could not be decoded. `layer` names the message type
    /// that was being decoded so the failing nesting level is obvious.
    #[error("Could not decode {layer}: {source}")]
    Decode {
        layer: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    /// A message could not be encoded.
    #[error("Could not serialize {0}")]
    Serialization(String),

    /// An endorser reported a non-success execution status.
    #[error("Proposal response {index} was not successful, error code {status}, msg {message}")]
    EndorsementFailed {
        index: usize,
        status: i32,
        message: String,
    },

    /// Two endorsers produced different response payloads.
    #[error("Endorsement mismatch between endorser {reference} and endorser {index}")]
    EndorsementMismatch { reference: usize, index: usize },

    /// The reference response endorses a different proposal than the one
    /// being assembled.
    #[error("Proposal response does not endorse this proposal")]
    ProposalHashMismatch,

    /// The signer is not the creator declared in the proposal header.
    #[error("Signer {identifier} is not the creator referenced in the proposal header")]
    IdentityMismatch { identifier: String },

    /// An endorsement signature does not verify against its endorser.
    #[error("Endorsement {index} has an invalid signature")]
    InvalidEndorsement { index: usize },

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TxError {
    /// Endorsement failures and mismatches can be recovered by re-proposing or
    /// collecting endorsements from different peers. Everything else points at
    /// corrupted input, schema skew or misconfiguration.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            TxError::EndorsementFailed { .. } | TxError::EndorsementMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        let failed = TxError::EndorsementFailed {
            index: 0,
            status: 500,
            message: "execution failed".into(),
        };
        let mismatch = TxError::EndorsementMismatch { reference: 0, index: 2 };
        let identity = TxError::IdentityMismatch { identifier: "peer0".into() };

        assert!(failed.is_retriable());
        assert!(mismatch.is_retriable());
        assert!(!identity.is_retriable());
        assert!(!TxError::ProposalHashMismatch.is_retriable());
        assert!(!TxError::Serialization("Payload".into()).is_retriable());
    }

    #[test]
    fn test_mismatch_message_names_both_endorsers() {
        let err = TxError::EndorsementMismatch { reference: 0, index: 2 };
        assert_eq!(err.to_string(), "Endorsement mismatch between endorser 0 and endorser 2");
    }
}
