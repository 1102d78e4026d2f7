use tracing::warn;

use fabtx_common::crypto::HashingService;
use fabtx_common::errors::Result;
use fabtx_common::protos::marshal;
use fabtx_common::protos::peer::ChaincodeProposalPayload;

/// How much of a proposal payload is disclosed in the ledger record.
///
/// Closed set of policies. Only `HashOnly` exists today: the ledger carries a
/// digest of the transient-free payload, never its plaintext.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadVisibility {
    #[default]
    HashOnly,
}

impl PayloadVisibility {
    pub const HASH_ONLY_TAG: &'static [u8] = b"HASH_ONLY";

    /// Maps a header tag to a policy. Empty and unrecognised tags fall back to
    /// `HashOnly` so that newer tags do not break older parties.
    pub fn from_tag(tag: &[u8]) -> Self {
        match tag {
            b"" | b"HASH_ONLY" => PayloadVisibility::HashOnly,
            other => {
                warn!(tag = %hex::encode(other), "Unknown payload visibility, falling back to hash-only");
                PayloadVisibility::HashOnly
            }
        }
    }

    pub fn tag(&self) -> &'static [u8] {
        match self {
            PayloadVisibility::HashOnly => Self::HASH_ONLY_TAG,
        }
    }
}

/// Returns the bytes of `payload` that go into the transaction, according to
/// `visibility`.
///
/// The transient field is always dropped before anything is encoded or hashed.
pub fn sanitize_for_tx(
    hasher: &dyn HashingService,
    payload: &ChaincodeProposalPayload,
    visibility: &[u8],
) -> Result<Vec<u8>> {
    let stripped = ChaincodeProposalPayload {
        input: payload.input.clone(),
        transient: Vec::new(),
    };
    let stripped_bytes = marshal(&stripped, "ChaincodeProposalPayload")?;

    match PayloadVisibility::from_tag(visibility) {
        PayloadVisibility::HashOnly => Ok(hasher.digest(&[stripped_bytes.as_slice()])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabtx_common::crypto::DigestHasher;

    fn payload(input: &[u8], transient: &[u8]) -> ChaincodeProposalPayload {
        ChaincodeProposalPayload {
            input: input.to_vec(),
            transient: transient.to_vec(),
        }
    }

    #[test]
    fn test_transient_never_affects_result() {
        let hasher = DigestHasher::default();
        let a = sanitize_for_tx(&hasher, &payload(b"move(a,b)", b"secret"), b"").unwrap();
        let b = sanitize_for_tx(&hasher, &payload(b"move(a,b)", b"other secret"), b"").unwrap();
        let c = sanitize_for_tx(&hasher, &payload(b"move(a,b)", b""), b"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_hash_only_discloses_digest_of_input() {
        let hasher = DigestHasher::default();
        let sanitized = sanitize_for_tx(&hasher, &payload(b"move(a,b)", b"secret"), b"").unwrap();

        let expected_bytes = marshal(&payload(b"move(a,b)", b""), "ChaincodeProposalPayload").unwrap();
        assert_eq!(sanitized, hasher.digest(&[expected_bytes.as_slice()]));
        assert_eq!(sanitized.len(), 32);
    }

    #[test]
    fn test_unknown_visibility_falls_back_to_hash_only() {
        let hasher = DigestHasher::default();
        let p = payload(b"query(a)", b"");
        let default = sanitize_for_tx(&hasher, &p, b"").unwrap();
        let tagged = sanitize_for_tx(&hasher, &p, PayloadVisibility::HASH_ONLY_TAG).unwrap();
        let unknown = sanitize_for_tx(&hasher, &p, b"FULL_PLAINTEXT").unwrap();
        assert_eq!(default, tagged);
        assert_eq!(default, unknown);
    }

    #[test]
    fn test_visibility_tags() {
        assert_eq!(PayloadVisibility::from_tag(b""), PayloadVisibility::HashOnly);
        assert_eq!(PayloadVisibility::from_tag(b"HASH_ONLY"), PayloadVisibility::HashOnly);
        assert_eq!(PayloadVisibility::HashOnly.tag(), b"HASH_ONLY");
    }
}
