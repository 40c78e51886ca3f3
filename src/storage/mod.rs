//! Shard storage access.
//!
//! [`ShardSource`] is the seam to whatever object store holds the shard
//! files. The crate ships a filesystem-backed implementation
//! ([`DirSource`]) as the reference; cloud-backed implementations plug in
//! the same trait from outside.

mod dir;

pub use dir::DirSource;

use crate::error::{Error, Result};
use crate::locator::Locator;

/// File extensions recognized as shard objects.
const SHARD_EXTENSIONS: [&str; 2] = [".json", ".json.gz"];

/// Check whether an object key names a shard file.
pub fn is_shard_key(key: &str) -> bool {
    SHARD_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}

/// Access to serialized document shards in an object store.
///
/// Implementations perform I/O only; they keep no mutable state between
/// calls, and retry policy belongs to the implementation, not to callers
/// of this trait.
pub trait ShardSource {
    /// List object keys under a locator, in a stable enumeration order.
    fn list(&self, locator: &Locator) -> Result<Vec<String>>;

    /// Fetch one object's bytes.
    fn fetch(&self, locator: &Locator, key: &str) -> Result<Vec<u8>>;

    /// Fetch all shard buffers under a locator, in listed order.
    ///
    /// Non-shard objects (wrong extension) are skipped. Returns `NotFound`
    /// when no shard objects match.
    fn read_shards(&self, locator: &Locator) -> Result<Vec<Vec<u8>>> {
        let keys: Vec<String> = self
            .list(locator)?
            .into_iter()
            .filter(|key| is_shard_key(key))
            .collect();

        if keys.is_empty() {
            return Err(Error::NotFound(format!("no shard files under {locator}")));
        }

        log::debug!("fetching {} shard file(s) from {locator}", keys.len());
        keys.iter().map(|key| self.fetch(locator, key)).collect()
    }
}
