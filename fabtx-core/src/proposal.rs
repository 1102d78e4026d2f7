use tracing::debug;

use fabtx_common::auth::SigningIdentity;
use fabtx_common::crypto::HashingService;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::common::{ChainHeader, Header, HeaderType, SignatureHeader, Timestamp};
use fabtx_common::protos::peer::{
    ChaincodeHeaderExtension, ChaincodeId, ChaincodeProposalPayload, Proposal, SignedProposal,
};
use fabtx_common::protos::{marshal, unmarshal};
use fabtx_common::utils::{generate_nonce, now_timestamp};

use crate::sanitizer::PayloadVisibility;

pub fn decode_header(bytes: &[u8]) -> Result<Header> {
    unmarshal(bytes, "Header")
}

pub fn signature_header(header: &Header) -> Result<&SignatureHeader> {
    header
        .signature_header
        .as_ref()
        .ok_or_else(|| TxError::InvalidArgument("header carries no signature header".to_string()))
}

/// Decodes the chaincode extension of the chain header. An empty extension
/// yields the default (hash-only visibility, no chaincode id).
pub fn chaincode_header_extension(header: &Header) -> Result<ChaincodeHeaderExtension> {
    let chain_header = header
        .chain_header
        .as_ref()
        .ok_or_else(|| TxError::InvalidArgument("header carries no chain header".to_string()))?;
    unmarshal(&chain_header.extension, "ChaincodeHeaderExtension")
}

/// Transaction id derived from the header nonce and creator, so that it is
/// bound to the signer and unique per proposal.
pub fn compute_tx_id(hasher: &dyn HashingService, nonce: &[u8], creator: &[u8]) -> String {
    hex::encode(hasher.digest(&[nonce, creator]))
}

/// Signs the encoded proposal with the client's identity.
pub fn sign_proposal(proposal: &Proposal, identity: &dyn SigningIdentity) -> Result<SignedProposal> {
    if proposal.header.is_empty() {
        return Err(TxError::InvalidArgument("proposal has no header".to_string()));
    }

    let proposal_bytes = marshal(proposal, "Proposal")?;
    let signature = identity.sign(&proposal_bytes)?;

    Ok(SignedProposal {
        proposal_bytes,
        signature,
    })
}

/// Client side construction of a chaincode invocation proposal.
#[derive(Debug, Clone)]
pub struct ProposalBuilder {
    chain_id: String,
    chaincode_id: ChaincodeId,
    input: Vec<u8>,
    transient: Vec<u8>,
    visibility: Vec<u8>,
    nonce: Option<Vec<u8>>,
    timestamp: Option<Timestamp>,
}

impl ProposalBuilder {
    pub fn new(chain_id: impl Into<String>, chaincode_name: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            chaincode_id: ChaincodeId {
                name: chaincode_name.into(),
                ..Default::default()
            },
            input: Vec::new(),
            transient: Vec::new(),
            visibility: PayloadVisibility::default().tag().to_vec(),
            nonce: None,
            timestamp: None,
        }
    }

    pub fn chaincode_version(mut self, version: impl Into<String>) -> Self {
        self.chaincode_id.version = version.into();
        self
    }

    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = input.into();
        self
    }

    pub fn transient(mut self, transient: impl Into<Vec<u8>>) -> Self {
        self.transient = transient.into();
        self
    }

    pub fn visibility(mut self, tag: impl Into<Vec<u8>>) -> Self {
        self.visibility = tag.into();
        self
    }

    /// Fixes the nonce instead of drawing a random one.
    pub fn nonce(mut self, nonce: impl Into<Vec<u8>>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Fails on an empty `input`: its payload would encode to zero bytes,
    /// which the proposal hash treats as missing.
    pub fn build(self, creator: &dyn SigningIdentity, hasher: &dyn HashingService) -> Result<Proposal> {
        if self.input.is_empty() {
            return Err(TxError::InvalidArgument("chaincode input is empty".to_string()));
        }

        let creator_bytes = creator.serialize()?;
        let nonce = self.nonce.unwrap_or_else(|| generate_nonce().to_vec());
        let tx_id = compute_tx_id(hasher, &nonce, &creator_bytes);

        let extension = ChaincodeHeaderExtension {
            payload_visibility: self.visibility,
            chaincode_id: Some(self.chaincode_id),
        };

        let header = Header {
            chain_header: Some(ChainHeader {
                r#type: HeaderType::EndorserTransaction as i32,
                version: 0,
                timestamp: Some(self.timestamp.unwrap_or_else(now_timestamp)),
                chain_id: self.chain_id,
                tx_id: tx_id.clone(),
                epoch: 0,
                extension: marshal(&extension, "ChaincodeHeaderExtension")?,
            }),
            signature_header: Some(SignatureHeader {
                creator: creator_bytes,
                nonce,
            }),
        };

        let payload = ChaincodeProposalPayload {
            input: self.input,
            transient: self.transient,
        };

        debug!(tx_id = %tx_id, creator = %creator.identifier(), "Built chaincode proposal");

        Ok(Proposal {
            header: marshal(&header, "Header")?,
            payload: marshal(&payload, "ChaincodeProposalPayload")?,
            extension: Vec::new(),
        })
    }
}
