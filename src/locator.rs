//! Storage locators for sharded document output.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// URI scheme for shard store locators.
const URI_SCHEME: &str = "gs://";

/// Matches prefixes that name a single file (contain an extension).
fn file_check_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*\..*$").expect("valid regex"))
}

/// Location of a sharded document in an object store: bucket plus key prefix.
///
/// A locator points at a *folder* of shard objects, so the prefix must not
/// name a single file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// Bucket name, without scheme.
    pub bucket: String,

    /// Key prefix of the shard objects inside the bucket.
    pub prefix: String,
}

impl Locator {
    /// Create a locator from bucket and prefix parts.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Result<Self> {
        let locator = Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        };
        locator.validate()?;
        Ok(locator)
    }

    /// Parse a locator from its URI form `gs://{bucket}/{prefix}`.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix(URI_SCHEME).ok_or_else(|| {
            Error::InvalidLocator(format!(
                "locator must follow format '{URI_SCHEME}{{bucket}}/{{prefix}}', got '{uri}'"
            ))
        })?;

        let (bucket, prefix) = rest.split_once('/').ok_or_else(|| {
            Error::InvalidLocator(format!(
                "locator must follow format '{URI_SCHEME}{{bucket}}/{{prefix}}', got '{uri}'"
            ))
        })?;

        if bucket.is_empty() {
            return Err(Error::InvalidLocator(format!("empty bucket in '{uri}'")));
        }

        Self::new(bucket, prefix.trim_end_matches('/'))
    }

    /// Form the full URI for an object key under this locator.
    pub fn join(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            format!("{URI_SCHEME}{}/{}", self.bucket, key)
        } else {
            format!("{URI_SCHEME}{}/{}/{}", self.bucket, self.prefix, key)
        }
    }

    fn validate(&self) -> Result<()> {
        if file_check_regex().is_match(&self.prefix) {
            return Err(Error::InvalidLocator(format!(
                "prefix cannot name a single file: '{}'",
                self.prefix
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{URI_SCHEME}{}/{}", self.bucket, self.prefix)
    }
}
