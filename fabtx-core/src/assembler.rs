//! Submitter-side assembly of endorsed transactions.
//!
//! Given the original proposal and the responses collected from endorsers,
//! the assembler checks that the endorsers agree, builds the single-action
//! transaction and wraps it in an envelope. The envelope is either returned
//! unsigned or signed by the proposal's creator.

use std::sync::Arc;

use tracing::{debug, warn};

use fabtx_common::auth::SigningIdentity;
use fabtx_common::crypto::HashingService;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::common::{Envelope, Payload};
use fabtx_common::protos::peer::{
    ChaincodeActionPayload, ChaincodeEndorsedAction, ChaincodeProposalPayload, Endorsement, Proposal,
    ProposalResponse, ProposalResponsePayload, Transaction, TransactionAction,
};
use fabtx_common::protos::{marshal, unmarshal};

use crate::config::ProtocolConfig;
use crate::proposal::{chaincode_header_extension, decode_header, signature_header};
use crate::proposal_hash::hash_from_raw_payload;
use crate::sanitizer::sanitize_for_tx;

pub struct TransactionAssembler {
    hasher: Arc<dyn HashingService>,
    strict_status_check: bool,
}

impl TransactionAssembler {
    pub fn new(hasher: Arc<dyn HashingService>) -> Self {
        Self {
            hasher,
            strict_status_check: false,
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            hasher: config.hasher(),
            strict_status_check: config.strict_status_check,
        }
    }

    /// When set, every response must report success. Otherwise only the
    /// first (reference) response is status-checked and later ones are only
    /// compared byte-for-byte against it.
    pub fn with_strict_status_check(mut self, strict: bool) -> Self {
        self.strict_status_check = strict;
        self
    }

    /// Builds the transaction envelope for `proposal` without signing it.
    ///
    /// Endorsements are kept in the order of `responses`. The reference
    /// response must carry the hash of this proposal's header and sanitized
    /// payload.
    pub fn assemble_unsigned(
        &self,
        proposal: &Proposal,
        responses: &[ProposalResponse],
    ) -> Result<Envelope> {
        if responses.is_empty() {
            return Err(TxError::InvalidArgument(
                "At least one proposal response is necessary".to_string(),
            ));
        }

        let header = decode_header(&proposal.header)?;
        let payload: ChaincodeProposalPayload =
            unmarshal(&proposal.payload, "ChaincodeProposalPayload")?;
        let extension = chaincode_header_extension(&header)?;

        self.check_agreement(responses)?;

        let sanitized = sanitize_for_tx(self.hasher.as_ref(), &payload, &extension.payload_visibility)?;
        self.check_proposal_hash(proposal, &sanitized, &responses[0])?;

        let endorsements = responses
            .iter()
            .enumerate()
            .map(|(n, r)| {
                r.endorsement.clone().ok_or_else(|| {
                    TxError::InvalidArgument(format!("proposal response {} is not endorsed", n))
                })
            })
            .collect::<Result<Vec<Endorsement>>>()?;

        let endorsed_action = ChaincodeEndorsedAction {
            proposal_response_payload: responses[0].payload.clone(),
            endorsements,
        };

        let action_payload = ChaincodeActionPayload {
            chaincode_proposal_payload: sanitized,
            action: Some(endorsed_action),
        };

        let signature_header_bytes = marshal(signature_header(&header)?, "SignatureHeader")?;
        let transaction = Transaction {
            actions: vec![TransactionAction {
                header: signature_header_bytes,
                payload: marshal(&action_payload, "ChaincodeActionPayload")?,
            }],
        };

        let envelope_payload = Payload {
            header: Some(header),
            data: marshal(&transaction, "Transaction")?,
        };

        debug!(endorsements = responses.len(), "Assembled unsigned transaction envelope");

        Ok(Envelope {
            payload: marshal(&envelope_payload, "Payload")?,
            signature: Vec::new(),
        })
    }

    /// Signs `envelope` with `identity`, which must be the creator named in
    /// `proposal_header`. Returns a new envelope; the input is not modified.
    ///
    /// The creator comparison only guards against misuse. Forged creators are
    /// caught when the envelope signature is verified downstream.
    pub fn sign(
        &self,
        envelope: &Envelope,
        identity: &dyn SigningIdentity,
        proposal_header: &[u8],
    ) -> Result<Envelope> {
        let header = decode_header(proposal_header)?;
        let creator = &signature_header(&header)?.creator;

        let signer = identity.serialize()?;
        if &signer != creator {
            warn!(signer = %identity.identifier(), "Signer does not match proposal creator");
            return Err(TxError::IdentityMismatch {
                identifier: identity.identifier(),
            });
        }

        let signature = identity.sign(&envelope.payload)?;

        Ok(Envelope {
            payload: envelope.payload.clone(),
            signature,
        })
    }

    /// Assembles and signs in one step, stopping at the first failure.
    pub fn create_signed_tx(
        &self,
        proposal: &Proposal,
        identity: &dyn SigningIdentity,
        responses: &[ProposalResponse],
    ) -> Result<Envelope> {
        let unsigned = self.assemble_unsigned(proposal, responses)?;
        self.sign(&unsigned, identity, &proposal.header)
    }

    fn check_agreement(&self, responses: &[ProposalResponse]) -> Result<()> {
        let reference = &responses[0].payload;

        for (n, r) in responses.iter().enumerate() {
            if n == 0 || self.strict_status_check {
                check_status(n, r)?;
            }

            if n > 0 && &r.payload != reference {
                warn!(reference = 0, index = n, "Proposal response payloads do not match");
                return Err(TxError::EndorsementMismatch { reference: 0, index: n });
            }
        }

        Ok(())
    }

    fn check_proposal_hash(
        &self,
        proposal: &Proposal,
        sanitized: &[u8],
        reference: &ProposalResponse,
    ) -> Result<()> {
        let endorsed: ProposalResponsePayload =
            unmarshal(&reference.payload, "ProposalResponsePayload")?;
        let expected = hash_from_raw_payload(self.hasher.as_ref(), &proposal.header, sanitized)?;

        if endorsed.proposal_hash != expected {
            warn!("Reference response was endorsed for a different proposal");
            return Err(TxError::ProposalHashMismatch);
        }
        Ok(())
    }
}

fn check_status(index: usize, response: &ProposalResponse) -> Result<()> {
    let status = response.response.as_ref().ok_or_else(|| {
        TxError::InvalidArgument(format!("proposal response {} carries no status", index))
    })?;

    if !status.is_ok() {
        warn!(index, status = status.status, message = %status.message, "Proposal response was not successful");
        return Err(TxError::EndorsementFailed {
            index,
            status: status.status,
            message: status.message.clone(),
        });
    }

    Ok(())
}
