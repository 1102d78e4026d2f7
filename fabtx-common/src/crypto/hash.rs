use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

use crate::errors::TxError;

/// Digest functions every cooperating party can be configured with.
///
/// Endorsers, submitters and committers of one network must agree on the
/// algorithm; hashes computed with different algorithms never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha3-256")]
    Sha3_256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3-256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha2-256" => Ok(HashAlgorithm::Sha256),
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            other => Err(TxError::Hashing(format!("unsupported hash algorithm: {}", other))),
        }
    }
}

/// Produces a digest over an ordered list of byte segments.
///
/// Segments are fed to a single hash instance in order, so
/// `digest(&[a, b]) == digest(&[a ++ b])`.
pub trait HashingService: Send + Sync {
    fn algorithm(&self) -> HashAlgorithm;

    fn digest(&self, segments: &[&[u8]]) -> Vec<u8>;
}

/// [`HashingService`] backed by the `sha2` / `sha3` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestHasher {
    algorithm: HashAlgorithm,
}

impl DigestHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl HashingService for DigestHasher {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn digest(&self, segments: &[&[u8]]) -> Vec<u8> {
        match self.algorithm {
            HashAlgorithm::Sha256 => feed::<Sha256>(segments),
            HashAlgorithm::Sha3_256 => feed::<Sha3_256>(segments),
        }
    }
}

fn feed<D: Digest>(segments: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for segment in segments {
        hasher.update(segment);
    }
    hasher.finalize().to_vec()
}

/// Shared hasher using the default algorithm.
pub fn default_hasher() -> Arc<dyn HashingService> {
    Arc::new(DigestHasher::default())
}

/// Computes the SHA-256 digest of the given data and returns it as a hex string.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
