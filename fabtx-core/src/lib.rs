// lib.rs
pub mod assembler;
pub mod config;
pub mod ledger;
pub mod proposal;
pub mod proposal_hash;
pub mod response;
pub mod sanitizer;

pub use assembler::TransactionAssembler;
pub use config::ProtocolConfig;
pub use ledger::{
    envelope_from_block_data,
    get_payloads,
    unpack_envelope,
    verify_endorsements,
    verify_proposal_hash,
    UnpackedTransaction,
};
pub use proposal::{sign_proposal, ProposalBuilder};
pub use proposal_hash::{hash_from_proposal_payload, hash_from_raw_payload};
pub use response::ProposalResponseBuilder;
pub use sanitizer::{sanitize_for_tx, PayloadVisibility};
