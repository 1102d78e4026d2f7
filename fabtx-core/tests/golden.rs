use std::sync::Arc;

use fabtx_common::auth::{IdentityError, SigningIdentity};
use fabtx_common::crypto::{HashAlgorithm, HashingService};
use fabtx_common::errors::TxError;
use fabtx_common::protos::common::{ChainHeader, Header, HeaderType, SignatureHeader};
use fabtx_common::protos::marshal;
use fabtx_common::protos::peer::{ChaincodeProposalPayload, Proposal, ProposalResponsePayload};
use fabtx_common::protos::unmarshal;
use fabtx_core::{
    hash_from_proposal_payload, hash_from_raw_payload, unpack_envelope, ProposalResponseBuilder,
    TransactionAssembler,
};

/// Wraps the concatenated segments in `H[...]` so digests can be read back.
struct FramingHasher;

impl HashingService for FramingHasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    fn digest(&self, segments: &[&[u8]]) -> Vec<u8> {
        let mut out = b"H[".to_vec();
        for segment in segments {
            out.extend_from_slice(segment);
        }
        out.push(b']');
        out
    }
}

/// Identity whose signature is `SIG[message]`.
struct FixedIdentity(&'static [u8]);

impl SigningIdentity for FixedIdentity {
    fn identifier(&self) -> String {
        String::from_utf8_lossy(self.0).into_owned()
    }

    fn serialize(&self) -> Result<Vec<u8>, IdentityError> {
        Ok(self.0.to_vec())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        Ok([&b"SIG["[..], message, &b"]"[..]].concat())
    }
}

fn proposal() -> Proposal {
    let header = Header {
        chain_header: Some(ChainHeader {
            r#type: HeaderType::EndorserTransaction as i32,
            chain_id: "mychannel".to_string(),
            tx_id: "tx1".to_string(),
            ..Default::default()
        }),
        signature_header: Some(SignatureHeader {
            creator: b"client-cert".to_vec(),
            nonce: b"n1".to_vec(),
        }),
    };
    let payload = ChaincodeProposalPayload {
        input: b"move(a,b)".to_vec(),
        transient: b"secret".to_vec(),
    };
    Proposal {
        header: marshal(&header, "Header").unwrap(),
        payload: marshal(&payload, "ChaincodeProposalPayload").unwrap(),
        extension: Vec::new(),
    }
}

const SANITIZED: &[u8] = b"H[\x0a\x09move(a,b)]";

#[test]
fn test_proposal_hash_layout() {
    let p = proposal();
    let expected = [&b"H["[..], p.header.as_slice(), SANITIZED, &b"]"[..]].concat();

    assert_eq!(hash_from_proposal_payload(&FramingHasher, &p.header, &p.payload, b"").unwrap(), expected);
    assert_eq!(hash_from_raw_payload(&FramingHasher, &p.header, SANITIZED).unwrap(), expected);
}

#[test]
fn test_endorsement_signature_layout() {
    let p = proposal();
    let resp = ProposalResponseBuilder::new(Arc::new(FramingHasher))
        .create_proposal_response(&p.header, &p.payload, b"ok", b"", b"", &FixedIdentity(b"peer-a"))
        .unwrap();

    let endorsement = resp.endorsement.unwrap();
    assert_eq!(endorsement.endorser, b"peer-a");
    assert_eq!(endorsement.signature, [&b"SIG["[..], resp.payload.as_slice(), &b"peer-a"[..], &b"]"[..]].concat());

    let prp: ProposalResponsePayload = unmarshal(&resp.payload, "ProposalResponsePayload").unwrap();
    assert_eq!(prp.proposal_hash, [&b"H["[..], p.header.as_slice(), SANITIZED, &b"]"[..]].concat());
}

#[test]
fn test_envelope_is_deterministic_and_signed_over_payload() {
    let p = proposal();
    let builder = ProposalResponseBuilder::new(Arc::new(FramingHasher));
    let responses = vec![
        builder
            .create_proposal_response(&p.header, &p.payload, b"ok", b"", b"", &FixedIdentity(b"peer-a"))
            .unwrap(),
        builder
            .create_proposal_response(&p.header, &p.payload, b"ok", b"", b"", &FixedIdentity(b"peer-b"))
            .unwrap(),
    ];
    let assembler = TransactionAssembler::new(Arc::new(FramingHasher));

    let first = assembler.assemble_unsigned(&p, &responses).unwrap();
    let second = assembler.assemble_unsigned(&p, &responses).unwrap();
    assert_eq!(first, second);

    let tx = unpack_envelope(&first).unwrap();
    assert_eq!(tx.action_payload.chaincode_proposal_payload, SANITIZED);
    assert_eq!(marshal(&tx.header, "Header").unwrap(), p.header);

    let signed = assembler.sign(&first, &FixedIdentity(b"client-cert"), &p.header).unwrap();
    assert_eq!(signed.signature, [&b"SIG["[..], first.payload.as_slice(), &b"]"[..]].concat());
}

#[test]
fn test_identity_binding() {
    let p = proposal();
    let responses = vec![ProposalResponseBuilder::new(Arc::new(FramingHasher))
        .create_proposal_response(&p.header, &p.payload, b"ok", b"", b"", &FixedIdentity(b"peer-a"))
        .unwrap()];

    let err = TransactionAssembler::new(Arc::new(FramingHasher))
        .create_signed_tx(&p, &FixedIdentity(b"someone-else"), &responses)
        .unwrap_err();
    match err {
        TxError::IdentityMismatch { identifier } => assert_eq!(identifier, "someone-else"),
        other => panic!("unexpected error: {other:?}"),
    }
}
