use std::{fs, io, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use fabtx_common::crypto::{DigestHasher, HashAlgorithm, HashingService};
use fabtx_common::errors::{Result, TxError};

/// Settings shared by endorsers and submitters.
///
/// Every party of one network must run with the same `hash_algorithm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Check the status of every proposal response, not only the first one.
    pub strict_status_check: bool,
    pub hash_algorithm: HashAlgorithm,
    /// Version stamped on proposal responses built by this node.
    pub response_version: i32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            strict_status_check: false,
            hash_algorithm: HashAlgorithm::default(),
            response_version: 1,
        }
    }
}

impl ProtocolConfig {
    pub fn hasher(&self) -> Arc<dyn HashingService> {
        Arc::new(DigestHasher::new(self.hash_algorithm))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str::<ProtocolConfig>(&data).map_err(|e| TxError::Config(e.to_string()))
    }
}
