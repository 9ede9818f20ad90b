pub mod hash;

pub use hash::{TraceDigest, hash_snapshot};
