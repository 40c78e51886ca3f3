//! Shard merging: ordering, validation, and offset re-basing.
//!
//! The merge is a pure function over the wire representation: shards go in,
//! one merged wire document comes out, with every text segment re-based
//! into the concatenated document text and every entity page reference
//! re-based past the pages of preceding shards. Final ordering depends only
//! on input order and declared shard indices, never on decode timing.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::shard::{
    decode_shard, RawEntity, RawLayout, RawPage, RawTextAnchor, ShardDocument,
};

/// Options for stitching shards into a document.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Whether to decode shard buffers in parallel.
    pub parallel: bool,
}

impl MergeOptions {
    /// Create new merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel shard decoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel shard decoding.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Decode a set of shard buffers, preserving input order.
pub fn decode_shards(buffers: &[Vec<u8>], options: &MergeOptions) -> Result<Vec<ShardDocument>> {
    if options.parallel && buffers.len() > 1 {
        buffers
            .par_iter()
            .map(|buffer| decode_shard(buffer))
            .collect()
    } else {
        buffers.iter().map(|buffer| decode_shard(buffer)).collect()
    }
}

/// Merge shards of one logical document into a single wire document.
///
/// Shards are ordered by their declared shard index, validated for shard
/// count and document identity, and their text segments re-based by the
/// cumulative length of preceding shard text. Any malformed shard aborts
/// the whole merge.
pub fn merge_raw(mut shards: Vec<ShardDocument>) -> Result<ShardDocument> {
    if shards.is_empty() {
        return Err(Error::NotFound("no shards to merge".to_string()));
    }

    if shards.len() > 1 {
        order_and_validate(&mut shards)?;
    }

    let uri = shards
        .iter()
        .find(|shard| !shard.uri.is_empty())
        .map(|shard| shard.uri.clone())
        .unwrap_or_default();

    let mut merged = ShardDocument {
        uri,
        ..ShardDocument::default()
    };

    let mut page_offset: i64 = 0;
    for mut shard in shards {
        let text_offset = merged.text.len() as i64;

        if let Some(info) = &shard.shard_info {
            if info.text_offset != text_offset {
                log::warn!(
                    "shard {} declares text offset {} but cumulative length is {}",
                    info.shard_index,
                    info.text_offset,
                    text_offset
                );
            }
        }

        let shard_pages = shard.pages.len() as i64;
        for page in &mut shard.pages {
            offset_page(page, text_offset);
        }
        for entity in &mut shard.entities {
            offset_entity(entity, text_offset, page_offset);
        }

        merged.text.push_str(&shard.text);
        merged.pages.append(&mut shard.pages);
        merged.entities.append(&mut shard.entities);
        page_offset += shard_pages;
    }

    sort_merged(&mut merged);
    Ok(merged)
}

/// Decode and merge shard buffers in one step.
pub fn merge_buffers(buffers: &[Vec<u8>], options: &MergeOptions) -> Result<ShardDocument> {
    merge_raw(decode_shards(buffers, options)?)
}

fn order_and_validate(shards: &mut [ShardDocument]) -> Result<()> {
    let total = shards.len() as i64;

    for shard in shards.iter() {
        let info = shard.shard_info.as_ref().ok_or_else(|| {
            Error::Decode(format!(
                "sharded document with {total} shards is missing shard info"
            ))
        })?;
        if info.shard_count != total {
            return Err(Error::Decode(format!(
                "declared shard count ({}) does not match number of shards ({total})",
                info.shard_count
            )));
        }
    }

    let mut uris = shards.iter().map(|s| &s.uri).filter(|u| !u.is_empty());
    if let Some(first) = uris.next() {
        if let Some(other) = uris.find(|uri| *uri != first) {
            return Err(Error::SchemaMismatch(format!(
                "shards belong to different documents: '{first}' vs '{other}'"
            )));
        }
    }

    shards.sort_by_key(|shard| {
        shard
            .shard_info
            .as_ref()
            .map(|info| info.shard_index)
            .unwrap_or_default()
    });
    Ok(())
}

/// Apply the original output's deterministic ordering: pages by page number,
/// entities by numeric id when every entity carries one.
fn sort_merged(merged: &mut ShardDocument) {
    if merged.pages.len() > 1 && merged.pages[0].page_number > 0 {
        merged.pages.sort_by_key(|page| page.page_number);
    }

    if merged.entities.len() > 1 && !merged.entities[0].id.is_empty() {
        let ids: Option<Vec<i64>> = merged
            .entities
            .iter()
            .map(|entity| entity.id.parse::<i64>().ok())
            .collect();
        match ids {
            Some(ids) => {
                let mut keyed: Vec<(i64, RawEntity)> =
                    ids.into_iter().zip(merged.entities.drain(..)).collect();
                keyed.sort_by_key(|(id, _)| *id);
                merged.entities = keyed.into_iter().map(|(_, entity)| entity).collect();
            }
            None => log::warn!("entities carry non-numeric ids, keeping shard order"),
        }
    }
}

fn offset_page(page: &mut RawPage, text_offset: i64) {
    offset_layout(page.layout.as_mut(), text_offset);
    for element in page
        .blocks
        .iter_mut()
        .chain(page.paragraphs.iter_mut())
        .chain(page.lines.iter_mut())
        .chain(page.tokens.iter_mut())
    {
        offset_layout(element.layout.as_mut(), text_offset);
    }
    for table in &mut page.tables {
        offset_layout(table.layout.as_mut(), text_offset);
        for row in table.header_rows.iter_mut().chain(table.body_rows.iter_mut()) {
            for cell in &mut row.cells {
                offset_layout(cell.layout.as_mut(), text_offset);
            }
        }
    }
    for field in &mut page.form_fields {
        offset_layout(field.field_name.as_mut(), text_offset);
        offset_layout(field.field_value.as_mut(), text_offset);
    }
}

fn offset_entity(entity: &mut RawEntity, text_offset: i64, page_offset: i64) {
    offset_anchor(entity.text_anchor.as_mut(), text_offset);
    if let Some(page_anchor) = &mut entity.page_anchor {
        for page_ref in &mut page_anchor.page_refs {
            page_ref.page += page_offset;
        }
    }
    for property in &mut entity.properties {
        offset_entity(property, text_offset, page_offset);
    }
}

fn offset_layout(layout: Option<&mut RawLayout>, text_offset: i64) {
    if let Some(layout) = layout {
        offset_anchor(layout.text_anchor.as_mut(), text_offset);
    }
}

fn offset_anchor(anchor: Option<&mut RawTextAnchor>, text_offset: i64) {
    if let Some(anchor) = anchor {
        for segment in &mut anchor.text_segments {
            segment.start_index += text_offset;
            segment.end_index += text_offset;
        }
    }
}
