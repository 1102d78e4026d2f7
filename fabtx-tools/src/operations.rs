use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use fabtx_common::auth::ed25519::{Ed25519Identity, Ed25519Verifier};
use fabtx_common::auth::SigningIdentity;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::common::Envelope;
use fabtx_common::protos::marshal;
use fabtx_core::{
    envelope_from_block_data, unpack_envelope, verify_endorsements, verify_proposal_hash,
    ProposalBuilder, ProposalResponseBuilder, ProtocolConfig, TransactionAssembler,
};

#[derive(Debug, Serialize)]
pub struct EndorsementView {
    #[serde(with = "hex::serde")]
    pub endorser: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

/// JSON rendering of a decoded envelope.
#[derive(Debug, Serialize)]
pub struct EnvelopeView {
    pub chain_id: String,
    pub tx_id: String,
    #[serde(with = "hex::serde")]
    pub creator: Vec<u8>,
    pub signed: bool,
    #[serde(with = "hex::serde")]
    pub chaincode_proposal_payload: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub proposal_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub results: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub events: Vec<u8>,
    pub endorsements: Vec<EndorsementView>,
    pub proposal_hash_valid: bool,
    pub endorsements_valid: bool,
}

pub fn generate_identity(out: &Path, msp_id: &str) -> Result<()> {
    let identity = Ed25519Identity::generate(msp_id);
    identity.save_to_file(out)?;

    info!(identifier = %identity.identifier(), "Generated identity");
    println!("Identifier: {}", identity.identifier());
    println!("PubHex: {}", hex::encode(identity.public_key()));
    Ok(())
}

/// Runs a full proposal -> endorsement -> assembly round with throwaway
/// identities and writes the signed envelope to `out`.
pub fn run_demo(config: &ProtocolConfig, endorsers: usize, input: &[u8], out: &Path) -> Result<Envelope> {
    if endorsers == 0 {
        return Err(TxError::InvalidArgument("at least one endorser is required".to_string()));
    }

    let hasher = config.hasher();
    let client = Ed25519Identity::generate("Org1MSP");
    let proposal = ProposalBuilder::new("demochannel", "democc")
        .input(input.to_vec())
        .transient(b"demo-transient".to_vec())
        .build(&client, hasher.as_ref())?;

    let builder = ProposalResponseBuilder::from_config(config);
    let responses = (0..endorsers)
        .map(|n| {
            let peer = Ed25519Identity::generate(format!("Org{}MSP", n + 1));
            builder.create_proposal_response(
                &proposal.header,
                &proposal.payload,
                b"demo-results",
                b"",
                b"",
                &peer,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let envelope = TransactionAssembler::from_config(config).create_signed_tx(&proposal, &client, &responses)?;
    fs::write(out, marshal(&envelope, "Envelope")?)?;

    info!(endorsers, out = %out.display(), "Wrote signed envelope");
    Ok(envelope)
}

pub fn describe_envelope(config: &ProtocolConfig, envelope: &Envelope) -> Result<EnvelopeView> {
    let tx = unpack_envelope(envelope)?;
    let chain_header = tx.header.chain_header.clone().unwrap_or_default();
    let action = tx.action_payload.action.clone().unwrap_or_default();

    let proposal_hash_valid = verify_proposal_hash(config.hasher().as_ref(), &tx)?;
    let endorsements_valid = verify_endorsements(&action, &Ed25519Verifier).is_ok();

    Ok(EnvelopeView {
        chain_id: chain_header.chain_id,
        tx_id: chain_header.tx_id,
        creator: tx.signature_header.creator,
        signed: envelope.is_signed(),
        chaincode_proposal_payload: tx.action_payload.chaincode_proposal_payload,
        proposal_hash: tx.response_payload.proposal_hash,
        results: tx.chaincode_action.results,
        events: tx.chaincode_action.events,
        endorsements: action
            .endorsements
            .into_iter()
            .map(|e| EndorsementView {
                endorser: e.endorser,
                signature: e.signature,
            })
            .collect(),
        proposal_hash_valid,
        endorsements_valid,
    })
}

pub fn inspect_envelope(config: &ProtocolConfig, path: &Path) -> Result<()> {
    let bytes = fs::read(path)?;
    let envelope = envelope_from_block_data(&bytes)?;
    let view = describe_envelope(config, &envelope)?;

    let json = serde_json::to_string_pretty(&view).map_err(|e| TxError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_envelope_inspects_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tx.bin");
        let config = ProtocolConfig::default();

        let envelope = run_demo(&config, 3, b"move(a,b)", &out).unwrap();
        let from_disk = envelope_from_block_data(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(from_disk, envelope);

        let view = describe_envelope(&config, &from_disk).unwrap();
        assert!(view.signed);
        assert_eq!(view.chain_id, "demochannel");
        assert_eq!(view.endorsements.len(), 3);
        assert_eq!(view.results, b"demo-results");
        assert!(view.proposal_hash_valid);
        assert!(view.endorsements_valid);

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains(&hex::encode(b"demo-results")));
    }

    #[test]
    fn test_demo_requires_endorsers() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_demo(&ProtocolConfig::default(), 0, b"x", &dir.path().join("tx.bin")).unwrap_err();
        assert!(matches!(err, TxError::InvalidArgument(_)));
    }

    #[test]
    fn test_generate_identity_writes_seed() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("peer.key");
        generate_identity(&out, "Org1MSP").unwrap();
        assert!(Ed25519Identity::load_from_file("Org1MSP", &out).is_ok());
    }
}
