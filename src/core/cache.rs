use crate::utils::error::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Content-addressed fetch cache. Entries are keyed by a hash of the step's
/// input parameters and expire after a fixed interval; an expired entry is
/// simply overwritten by the next store.
pub struct FetchCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FetchCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn key(input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    fn entry_path(&self, input: &str) -> PathBuf {
        self.dir.join(Self::key(input))
    }

    /// Returns the cached bytes for `input` if a fresh entry exists.
    pub fn lookup(&self, input: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(input);
        let metadata = fs::metadata(&path).ok()?;
        let age = metadata.modified().ok()?.elapsed().ok()?;
        if age >= self.ttl {
            tracing::debug!("Cache entry for {} expired ({:?} old)", input, age);
            return None;
        }
        tracing::debug!("Cache hit for {}", input);
        fs::read(&path).ok()
    }

    pub fn store(&self, input: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.entry_path(input), data)?;
        Ok(())
    }
}
