use rand::{rngs::OsRng, RngCore};

/// Length of the anti-replay nonce placed in every signature header.
pub const NONCE_LEN: usize = 24;

pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}
