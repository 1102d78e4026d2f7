use tracing::{debug, warn};

use fabtx_common::auth::SignatureVerifier;
use fabtx_common::crypto::HashingService;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::marshal;
use fabtx_common::protos::peer::ChaincodeEndorsedAction;

use super::UnpackedTransaction;
use crate::proposal_hash::hash_from_raw_payload;

/// Recomputes the proposal hash from the committed header and disclosed
/// payload and compares it with the hash the endorsers signed.
///
/// The header is re-encoded from its decoded form; this matches the proposal
/// header bytes as long as the client encoded it canonically.
pub fn verify_proposal_hash(hasher: &dyn HashingService, tx: &UnpackedTransaction) -> Result<bool> {
    let header_bytes = marshal(&tx.header, "Header")?;
    let expected = hash_from_raw_payload(
        hasher,
        &header_bytes,
        &tx.action_payload.chaincode_proposal_payload,
    )?;

    let matches = expected == tx.response_payload.proposal_hash;
    if !matches {
        warn!("Committed proposal hash does not match the endorsed one");
    }
    Ok(matches)
}

/// Checks every endorsement signature over `payload || endorser`.
pub fn verify_endorsements(
    action: &ChaincodeEndorsedAction,
    verifier: &dyn SignatureVerifier,
) -> Result<()> {
    if action.endorsements.is_empty() {
        return Err(TxError::InvalidArgument("action carries no endorsements".to_string()));
    }

    for (index, endorsement) in action.endorsements.iter().enumerate() {
        let message = [
            action.proposal_response_payload.as_slice(),
            endorsement.endorser.as_slice(),
        ]
        .concat();

        if !verifier.verify(&endorsement.endorser, &message, &endorsement.signature)? {
            warn!(index, "Endorsement signature does not verify");
            return Err(TxError::InvalidEndorsement { index });
        }
    }

    debug!(count = action.endorsements.len(), "Verified endorsements");
    Ok(())
}
