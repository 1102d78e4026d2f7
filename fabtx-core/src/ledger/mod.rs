//! Reading transactions back out of ledger bytes.
//!
//! Each nesting level is decoded on its own, so a failure names the layer
//! (`Envelope`, `Payload`, `Transaction`, ...) where the bytes went wrong.

pub mod verify;

use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::common::{Envelope, Header, Payload, SignatureHeader};
use fabtx_common::protos::peer::{
    ChaincodeAction, ChaincodeActionPayload, ProposalResponsePayload, Transaction, TransactionAction,
};
use fabtx_common::protos::unmarshal;

pub use verify::{verify_endorsements, verify_proposal_hash};

/// An endorser transaction decoded level by level from its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedTransaction {
    pub header: Header,
    pub signature_header: SignatureHeader,
    pub action_payload: ChaincodeActionPayload,
    pub response_payload: ProposalResponsePayload,
    pub chaincode_action: ChaincodeAction,
}

/// Every block data entry begins with an envelope.
pub fn envelope_from_block_data(data: &[u8]) -> Result<Envelope> {
    unmarshal(data, "Envelope")
}

/// Decodes the chaincode action payload of `action` and the simulation
/// output embedded in its endorsed response payload.
pub fn get_payloads(action: &TransactionAction) -> Result<(ChaincodeActionPayload, ChaincodeAction)> {
    let (action_payload, _, chaincode_action) = decode_action(action)?;
    Ok((action_payload, chaincode_action))
}

pub fn unpack_envelope(envelope: &Envelope) -> Result<UnpackedTransaction> {
    let payload: Payload = unmarshal(&envelope.payload, "Payload")?;
    let header = payload
        .header
        .ok_or_else(|| TxError::InvalidArgument("envelope payload has no header".to_string()))?;

    let transaction: Transaction = unmarshal(&payload.data, "Transaction")?;
    let action = match transaction.actions.as_slice() {
        [action] => action,
        actions => {
            return Err(TxError::InvalidArgument(format!(
                "expected exactly one transaction action, found {}",
                actions.len()
            )))
        }
    };

    let signature_header: SignatureHeader = unmarshal(&action.header, "SignatureHeader")?;
    let (action_payload, response_payload, chaincode_action) = decode_action(action)?;

    Ok(UnpackedTransaction {
        header,
        signature_header,
        action_payload,
        response_payload,
        chaincode_action,
    })
}

fn decode_action(
    action: &TransactionAction,
) -> Result<(ChaincodeActionPayload, ProposalResponsePayload, ChaincodeAction)> {
    let action_payload: ChaincodeActionPayload = unmarshal(&action.payload, "ChaincodeActionPayload")?;

    let endorsed = action_payload
        .action
        .as_ref()
        .filter(|a| !a.proposal_response_payload.is_empty())
        .ok_or_else(|| TxError::InvalidArgument("no payload in ChaincodeActionPayload".to_string()))?;

    let response_payload: ProposalResponsePayload =
        unmarshal(&endorsed.proposal_response_payload, "ProposalResponsePayload")?;
    if response_payload.extension.is_empty() {
        return Err(TxError::InvalidArgument(
            "proposal response payload carries no chaincode action".to_string(),
        ));
    }

    let chaincode_action: ChaincodeAction = unmarshal(&response_payload.extension, "ChaincodeAction")?;
    Ok((action_payload, response_payload, chaincode_action))
}
