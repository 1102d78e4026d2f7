use std::sync::Arc;

use tracing::debug;

use fabtx_common::auth::SigningIdentity;
use fabtx_common::crypto::HashingService;
use fabtx_common::errors::{Result, TxError};
use fabtx_common::protos::marshal;
use fabtx_common::protos::peer::{
    ChaincodeAction, Endorsement, ProposalResponse, ProposalResponsePayload, Response, STATUS_OK,
};
use fabtx_common::utils::now_timestamp;

use crate::config::ProtocolConfig;
use crate::proposal_hash::hash_from_proposal_payload;

/// Endorser-side construction of proposal responses.
pub struct ProposalResponseBuilder {
    hasher: Arc<dyn HashingService>,
    version: i32,
}

impl ProposalResponseBuilder {
    pub fn new(hasher: Arc<dyn HashingService>) -> Self {
        Self { hasher, version: 1 }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self {
            hasher: config.hasher(),
            version: config.response_version,
        }
    }

    /// Builds a successful response with an empty endorsement.
    ///
    /// `header` and `chaincode_proposal_payload` are the raw bytes from the
    /// proposal; `results` and `events` are the simulation output.
    pub fn build_unsigned(
        &self,
        header: &[u8],
        chaincode_proposal_payload: &[u8],
        results: &[u8],
        events: &[u8],
        visibility: &[u8],
    ) -> Result<ProposalResponse> {
        let proposal_hash =
            hash_from_proposal_payload(self.hasher.as_ref(), header, chaincode_proposal_payload, visibility)
                .map_err(|e| TxError::Hashing(format!("Could not compute proposal hash: {}", e)))?;

        let action = ChaincodeAction {
            results: results.to_vec(),
            events: events.to_vec(),
        };
        let response_payload = ProposalResponsePayload {
            proposal_hash,
            extension: marshal(&action, "ChaincodeAction")?,
        };

        Ok(ProposalResponse {
            version: self.version,
            timestamp: Some(now_timestamp()),
            response: Some(Response {
                status: STATUS_OK,
                message: "OK".to_string(),
                payload: Vec::new(),
            }),
            payload: marshal(&response_payload, "ProposalResponsePayload")?,
            endorsement: Some(Endorsement::default()),
        })
    }

    /// Returns a copy of `unsigned` endorsed by `identity`.
    ///
    /// The signature covers `payload || serialized endorser`, no separator.
    pub fn endorse(
        &self,
        unsigned: &ProposalResponse,
        identity: &dyn SigningIdentity,
    ) -> Result<ProposalResponse> {
        let endorser = identity.serialize()?;

        let mut message = Vec::with_capacity(unsigned.payload.len() + endorser.len());
        message.extend_from_slice(&unsigned.payload);
        message.extend_from_slice(&endorser);
        let signature = identity.sign(&message)?;

        debug!(endorser = %identity.identifier(), "Endorsed proposal response");

        let mut signed = unsigned.clone();
        signed.endorsement = Some(Endorsement { endorser, signature });
        Ok(signed)
    }

    /// [`build_unsigned`](Self::build_unsigned) followed by
    /// [`endorse`](Self::endorse).
    pub fn create_proposal_response(
        &self,
        header: &[u8],
        chaincode_proposal_payload: &[u8],
        results: &[u8],
        events: &[u8],
        visibility: &[u8],
        identity: &dyn SigningIdentity,
    ) -> Result<ProposalResponse> {
        let unsigned =
            self.build_unsigned(header, chaincode_proposal_payload, results, events, visibility)?;
        self.endorse(&unsigned, identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabtx_common::auth::ed25519::Ed25519Identity;
    use fabtx_common::auth::IdentityError;
    use fabtx_common::crypto::default_hasher;
    use fabtx_common::protos::peer::ChaincodeProposalPayload;
    use fabtx_common::protos::unmarshal;

    struct BrokenIdentity;

    impl SigningIdentity for BrokenIdentity {
        fn identifier(&self) -> String {
            "broken".to_string()
        }

        fn serialize(&self) -> std::result::Result<Vec<u8>, IdentityError> {
            Err(IdentityError::Serialization {
                identifier: self.identifier(),
                reason: "no certificate".to_string(),
            })
        }

        fn sign(&self, _message: &[u8]) -> std::result::Result<Vec<u8>, IdentityError> {
            Ok(vec![0u8; 64])
        }
    }

    fn payload_bytes() -> Vec<u8> {
        let payload = ChaincodeProposalPayload {
            input: b"move(a,b)".to_vec(),
            transient: b"secret".to_vec(),
        };
        marshal(&payload, "ChaincodeProposalPayload").unwrap()
    }

    #[test]
    fn test_build_unsigned() {
        let builder = ProposalResponseBuilder::new(default_hasher());
        let resp = builder
            .build_unsigned(b"hdr", &payload_bytes(), b"ok", b"", b"")
            .unwrap();

        assert_eq!(resp.version, 1);
        let status = resp.response.as_ref().unwrap();
        assert_eq!((status.status, status.message.as_str()), (200, "OK"));
        assert_eq!(resp.endorsement, Some(Endorsement::default()));

        let prp: ProposalResponsePayload = unmarshal(&resp.payload, "ProposalResponsePayload").unwrap();
        let expected_hash =
            hash_from_proposal_payload(default_hasher().as_ref(), b"hdr", &payload_bytes(), b"").unwrap();
        assert_eq!(prp.proposal_hash, expected_hash);

        let action: ChaincodeAction = unmarshal(&prp.extension, "ChaincodeAction").unwrap();
        assert_eq!(action.results, b"ok");
        assert!(action.events.is_empty());
    }

    #[test]
    fn test_build_unsigned_reports_hashing_error() {
        let builder = ProposalResponseBuilder::new(default_hasher());
        let err = builder.build_unsigned(b"", &payload_bytes(), b"ok", b"", b"").unwrap_err();
        assert!(matches!(err, TxError::Hashing(_)));
    }

    #[test]
    fn test_endorse_signs_payload_then_endorser() {
        let builder = ProposalResponseBuilder::new(default_hasher());
        let peer = Ed25519Identity::generate("Org1MSP");
        let unsigned = builder.build_unsigned(b"hdr", &payload_bytes(), b"ok", b"", b"").unwrap();

        let signed = builder.endorse(&unsigned, &peer).unwrap();
        let endorsement = signed.endorsement.as_ref().unwrap();
        assert_eq!(endorsement.endorser, peer.serialize().unwrap());

        let message = [signed.payload.as_slice(), endorsement.endorser.as_slice()].concat();
        assert!(peer.verify(&message, &endorsement.signature).unwrap());

        // the input is left untouched
        assert_eq!(unsigned.endorsement, Some(Endorsement::default()));
        assert_eq!(signed.payload, unsigned.payload);
    }

    #[test]
    fn test_endorse_surfaces_identity_error() {
        let builder = ProposalResponseBuilder::new(default_hasher());
        let unsigned = builder.build_unsigned(b"hdr", &payload_bytes(), b"ok", b"", b"").unwrap();

        let err = builder.endorse(&unsigned, &BrokenIdentity).unwrap_err();
        assert!(matches!(err, TxError::Identity(IdentityError::Serialization { .. })));
    }

    #[test]
    fn test_version_comes_from_config() {
        let config = ProtocolConfig {
            response_version: 3,
            ..Default::default()
        };
        let peer = Ed25519Identity::generate("Org1MSP");
        let resp = ProposalResponseBuilder::from_config(&config)
            .create_proposal_response(b"hdr", &payload_bytes(), b"ok", b"", b"", &peer)
            .unwrap();
        assert_eq!(resp.version, 3);
        assert!(resp.endorsement.unwrap().signature.len() == 64);
    }
}
