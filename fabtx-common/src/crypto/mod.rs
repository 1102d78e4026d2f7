pub mod hash;

pub use hash::{default_hasher, DigestHasher, HashAlgorithm, HashingService};
