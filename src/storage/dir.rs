//! Filesystem-backed shard source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::storage::ShardSource;

/// A [`ShardSource`] over a local directory tree.
///
/// Buckets map to directories under the root, and object keys to file
/// paths inside them. This is the reference implementation used by the
/// test suite and by local workflows on downloaded batch output.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, locator: &Locator) -> PathBuf {
        let mut dir = self.root.join(&locator.bucket);
        if !locator.prefix.is_empty() {
            dir.push(&locator.prefix);
        }
        dir
    }
}

impl ShardSource for DirSource {
    fn list(&self, locator: &Locator) -> Result<Vec<String>> {
        let dir = self.bucket_dir(locator);
        let entries = fs::read_dir(&dir).map_err(|e| map_io_error(e, &dir, locator))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        // read_dir order is platform-dependent; sort for a stable listing.
        keys.sort();
        Ok(keys)
    }

    fn fetch(&self, locator: &Locator, key: &str) -> Result<Vec<u8>> {
        let path = self.bucket_dir(locator).join(key);
        fs::read(&path).map_err(|e| map_io_error(e, &path, locator))
    }
}

fn map_io_error(err: io::Error, path: &Path, locator: &Locator) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => {
            Error::NotFound(format!("{locator} ({})", path.display()))
        }
        io::ErrorKind::PermissionDenied => {
            Error::PermissionDenied(format!("{locator} ({})", path.display()))
        }
        _ => Error::Io(err),
    }
}
