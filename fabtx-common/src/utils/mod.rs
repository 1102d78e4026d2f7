pub mod security;
pub mod time;

pub use security::generate_nonce;
pub use time::now_timestamp;
