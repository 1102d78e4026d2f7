//! Wire messages exchanged between clients, endorsers, orderers and committers.
//!
//! Field numbers follow the network-wide schema, so bytes produced here are
//! interchangeable with any other implementation of that schema. Many fields
//! are themselves encoded messages (`bytes`); each level is encoded and decoded
//! explicitly through [`marshal`] and [`unmarshal`].

pub mod common;
pub mod msp;
pub mod peer;

use prost::Message;

use crate::errors::{Result, TxError};

/// Encodes a message, naming `layer` in the error if encoding fails.
pub fn marshal<M: Message>(msg: &M, layer: &'static str) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(msg.encoded_len());
    msg.encode(&mut buf)
        .map_err(|e| TxError::Serialization(format!("{}: {}", layer, e)))?;
    Ok(buf)
}

/// Decodes a message, naming `layer` in the error if decoding fails.
pub fn unmarshal<M: Message + Default>(bytes: &[u8], layer: &'static str) -> Result<M> {
    M::decode(bytes).map_err(|source| TxError::Decode { layer, source })
}
