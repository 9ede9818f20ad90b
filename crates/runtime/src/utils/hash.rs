//! Hashing utilities for pool traces.
//!
//! Provides the reproducibility digest of a run: identical seeds and scenarios
//! must produce identical digests.

use rune_core::{PoolSnapshot, SimTime};
use sha2::{Digest, Sha256};

use crate::error::{Result, RuntimeError};

/// Running SHA-256 over bincode-encoded `(time, snapshot)` frames.
#[derive(Clone, Debug, Default)]
pub struct TraceDigest {
    hasher: Sha256,
    frames: u64,
}

impl TraceDigest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at: SimTime, snapshot: &PoolSnapshot) -> Result<()> {
        let bytes = encode_frame(at, snapshot)?;
        self.hasher.update(&bytes);
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Hex-encoded SHA-256 of every recorded frame.
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Compute a short hash of one snapshot for compact logging.
///
/// Returns the first 8 bytes of the SHA-256 as hex.
pub fn hash_snapshot(at: SimTime, snapshot: &PoolSnapshot) -> Result<String> {
    let bytes = encode_frame(at, snapshot)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(&digest[..8]))
}

fn encode_frame(at: SimTime, snapshot: &PoolSnapshot) -> Result<Vec<u8>> {
    bincode::serialize(&(at.as_millis(), snapshot)).map_err(RuntimeError::Digest)
}
