//! Canonical proposal hash, the value every endorser embeds in its response
//! and every committer recomputes.
//!
//! Both entry points hash `header || sanitized_payload` and agree for the same
//! logical proposal; the assembler relies on that when cross-checking
//! endorsements.

use tracing::debug;

use fabtx_common::crypto::HashingService;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::peer::ChaincodeProposalPayload;
use fabtx_common::protos::unmarshal;

use crate::sanitizer::sanitize_for_tx;

/// Hash for callers that already hold the disclosed payload bytes, e.g. a
/// committer reading a finalized block where visibility was already applied.
pub fn hash_from_raw_payload(
    hasher: &dyn HashingService,
    header: &[u8],
    sanitized_payload: &[u8],
) -> Result<Vec<u8>> {
    if header.is_empty() || sanitized_payload.is_empty() {
        return Err(TxError::InvalidArgument(
            "proposal header and sanitized payload are required".to_string(),
        ));
    }

    Ok(hasher.digest(&[header, sanitized_payload]))
}

/// Hash for callers holding the original, unsanitized `ChaincodeProposalPayload`
/// bytes. Applies the visibility policy first.
pub fn hash_from_proposal_payload(
    hasher: &dyn HashingService,
    header: &[u8],
    chaincode_proposal_payload: &[u8],
    visibility: &[u8],
) -> Result<Vec<u8>> {
    if header.is_empty() || chaincode_proposal_payload.is_empty() {
        return Err(TxError::InvalidArgument(
            "proposal header and chaincode proposal payload are required".to_string(),
        ));
    }

    let payload: ChaincodeProposalPayload =
        unmarshal(chaincode_proposal_payload, "ChaincodeProposalPayload")?;
    let sanitized = sanitize_for_tx(hasher, &payload, visibility)?;

    let hash = hash_from_raw_payload(hasher, header, &sanitized)?;
    debug!(
        algorithm = %hasher.algorithm(),
        hash = %hex::encode(&hash),
        "Computed proposal hash"
    );
    Ok(hash)
}
