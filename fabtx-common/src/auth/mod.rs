pub mod ed25519;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Could not serialize the signing identity for {identifier}: {reason}")]
    Serialization { identifier: String, reason: String },

    #[error("Could not sign with identity {identifier}: {reason}")]
    Signing { identifier: String, reason: String },

    #[error("Invalid identity: {0}")]
    Invalid(String),
}

/// A cryptographic signer, abstracted away from key storage.
///
/// Implementations are supplied by the caller; this crate never constructs or
/// validates identities beyond comparing serialized bytes.
pub trait SigningIdentity: Send + Sync {
    /// Human readable name, used only in diagnostics.
    fn identifier(&self) -> String;

    /// Self-describing credential, the value stored as `creator` / `endorser`.
    fn serialize(&self) -> Result<Vec<u8>, IdentityError>;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError>;
}

/// Checks a signature given only the signer's serialized identity.
pub trait SignatureVerifier: Send + Sync {
    fn verify(
        &self,
        serialized_identity: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, IdentityError>;
}
