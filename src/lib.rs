//! # docstitch
//!
//! Navigable in-memory document model stitched from sharded
//! document-processing API output.
//!
//! Batch processing of a large document yields several JSON shards, each
//! covering a slice of the pages with text offsets local to the shard.
//! This library decodes those shards, validates that they belong to the
//! same logical document, re-bases every text span into the concatenated
//! full text, and exposes the result as immutable [`Document`], [`Page`],
//! and [`Entity`] wrappers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstitch::stitch_dir;
//!
//! fn main() -> docstitch::Result<()> {
//!     // A directory of shard-*.json files from one batch output
//!     let doc = stitch_dir("./output")?;
//!
//!     println!("{} pages, {} entities", doc.page_count(), doc.entity_count());
//!     for entity in doc.entities_by_type("invoice_date") {
//!         println!("{} ({:.2})", entity.value(), entity.confidence);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Shard stitching**: ordering, shard-count validation, text-offset
//!   re-basing across shards
//! - **Navigable model**: pages, layout elements, tables, form fields,
//!   entities with normalized-value fallback
//! - **Storage seam**: [`ShardSource`] trait with a filesystem reference
//!   implementation
//! - **hOCR export**: render the page/layout tree as standard hOCR XHTML
//! - **Parallel decoding**: shard buffers decode on Rayon, with identical
//!   output regardless of parallelism

pub mod error;
pub mod locator;
pub mod merge;
pub mod model;
pub mod render;
pub mod shard;
pub mod storage;

// Re-export commonly used types
pub use error::{Error, Result};
pub use locator::Locator;
pub use merge::MergeOptions;
pub use model::{
    BoundingBox, Document, Entity, FormField, Page, PageElement, Span, Table, TextAnchor,
};
pub use shard::{decode_shard, ShardDocument};
pub use storage::{DirSource, ShardSource};

use std::path::Path;

/// Stitch a document from in-memory shard buffers.
///
/// Each buffer holds one serialized shard (plain or gzip-compressed JSON).
///
/// # Example
///
/// ```no_run
/// use docstitch::stitch_bytes;
///
/// let shards = vec![std::fs::read("shard-0.json").unwrap()];
/// let doc = stitch_bytes(&shards).unwrap();
/// println!("{}", doc.text());
/// ```
pub fn stitch_bytes(buffers: &[Vec<u8>]) -> Result<Document> {
    stitch_bytes_with_options(buffers, &MergeOptions::default())
}

/// Stitch a document from in-memory shard buffers with custom options.
pub fn stitch_bytes_with_options(
    buffers: &[Vec<u8>],
    options: &MergeOptions,
) -> Result<Document> {
    let merged = merge::merge_buffers(buffers, options)?;
    Document::from_merged(merged, None)
}

/// Stitch a document from a local path.
///
/// `path` is either a single shard file or a directory containing the
/// shard files of one document.
///
/// # Example
///
/// ```no_run
/// use docstitch::stitch_dir;
///
/// let doc = stitch_dir("./output").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn stitch_dir<P: AsRef<Path>>(path: P) -> Result<Document> {
    stitch_dir_with_options(path, &MergeOptions::default())
}

/// Stitch a document from a local path with custom options.
pub fn stitch_dir_with_options<P: AsRef<Path>>(
    path: P,
    options: &MergeOptions,
) -> Result<Document> {
    let path = path.as_ref();
    let buffers = if path.is_dir() {
        let mut names: Vec<String> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| storage::is_shard_key(name))
            .collect();
        names.sort();

        if names.is_empty() {
            return Err(Error::NotFound(format!(
                "no shard files in {}",
                path.display()
            )));
        }

        names
            .iter()
            .map(|name| std::fs::read(path.join(name)).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![std::fs::read(path)?]
    };

    stitch_bytes_with_options(&buffers, options)
}

/// Stitch a document from a shard store.
///
/// Lists and fetches shard objects under `locator`, then merges them.
///
/// # Example
///
/// ```no_run
/// use docstitch::{stitch_source, DirSource, Locator};
///
/// let source = DirSource::new("/var/cache/batch-output");
/// let locator = Locator::parse("gs://bucket/operation-123").unwrap();
/// let doc = stitch_source(&source, &locator).unwrap();
/// ```
pub fn stitch_source<S: ShardSource>(source: &S, locator: &Locator) -> Result<Document> {
    stitch_source_with_options(source, locator, &MergeOptions::default())
}

/// Stitch a document from a shard store with custom options.
pub fn stitch_source_with_options<S: ShardSource>(
    source: &S,
    locator: &Locator,
    options: &MergeOptions,
) -> Result<Document> {
    let buffers = source.read_shards(locator)?;
    let merged = merge::merge_buffers(&buffers, options)?;
    Document::from_merged(merged, Some(locator.clone()))
}
