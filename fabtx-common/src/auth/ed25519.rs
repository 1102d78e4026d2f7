use std::fs;
use std::path::Path;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use super::{IdentityError, SignatureVerifier, SigningIdentity};
use crate::errors::TxError;
use crate::protos::msp::SerializedIdentity;
use crate::protos::{marshal, unmarshal};

/// Ed25519 signing identity issued by a membership provider `msp_id`.
///
/// Serializes to a `SerializedIdentity` whose `id_bytes` is the 32-byte
/// verifying key.
pub struct Ed25519Identity {
    msp_id: String,
    keypair: SigningKey,
}

impl Ed25519Identity {
    pub fn new(msp_id: impl Into<String>, keypair: SigningKey) -> Self {
        Self {
            msp_id: msp_id.into(),
            keypair,
        }
    }

    pub fn generate(msp_id: impl Into<String>) -> Self {
        let mut csprng = OsRng;
        Self::new(msp_id, SigningKey::generate(&mut csprng))
    }

    pub fn from_bytes(msp_id: impl Into<String>, bytes: &[u8]) -> Result<Self, IdentityError> {
        let seed: &[u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityError::Invalid("Invalid key length".to_string()))?;
        Ok(Self::new(msp_id, SigningKey::from_bytes(seed)))
    }

    /// Loads a hex encoded 32-byte seed.
    pub fn load_from_file<P: AsRef<Path>>(msp_id: impl Into<String>, path: P) -> Result<Self, TxError> {
        let encoded = fs::read_to_string(path)?;
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| IdentityError::Invalid(format!("seed is not hex: {}", e)))?;
        Ok(Self::from_bytes(msp_id, &bytes)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TxError> {
        fs::write(path, hex::encode(self.keypair.to_bytes()))?;
        Ok(())
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.verifying_key().to_bytes().to_vec()
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, IdentityError> {
        verify_with_key(&self.keypair.verifying_key(), message, signature)
    }
}

impl SigningIdentity for Ed25519Identity {
    fn identifier(&self) -> String {
        format!("{}:{}", self.msp_id, hex::encode(&self.public_key()[..8]))
    }

    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        let sid = SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.public_key(),
        };
        marshal(&sid, "SerializedIdentity").map_err(|e| IdentityError::Serialization {
            identifier: self.identifier(),
            reason: e.to_string(),
        })
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let signature = self.keypair.sign(message);
        Ok(signature.to_vec())
    }
}

/// Verifies Ed25519 signatures from `SerializedIdentity` bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        serialized_identity: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, IdentityError> {
        let sid: SerializedIdentity = unmarshal(serialized_identity, "SerializedIdentity")
            .map_err(|e| IdentityError::Invalid(e.to_string()))?;
        let key_bytes: &[u8; 32] = sid
            .id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdentityError::Invalid("Invalid public key length".to_string()))?;
        let verifying_key = VerifyingKey::from_bytes(key_bytes)
            .map_err(|e| IdentityError::Invalid(e.to_string()))?;
        verify_with_key(&verifying_key, message, signature)
    }
}

fn verify_with_key(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &[u8],
) -> Result<bool, IdentityError> {
    let signature = Signature::from_slice(signature).map_err(|e| IdentityError::Invalid(e.to_string()))?;

    match verifying_key.verify(message, &signature) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
