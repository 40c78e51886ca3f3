//! Shard buffer decoding.

use std::io::Read;

use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::shard::ShardDocument;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check whether a shard buffer is gzip-compressed.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[..2] == GZIP_MAGIC
}

/// Decode one shard buffer into its wire representation.
///
/// Accepts plain JSON as produced by batch processing output, or the same
/// JSON gzip-compressed. Unknown fields are ignored.
pub fn decode_shard(data: &[u8]) -> Result<ShardDocument> {
    if data.is_empty() {
        return Err(Error::Decode("empty shard buffer".to_string()));
    }

    if is_gzip(data) {
        log::debug!("inflating gzip-compressed shard ({} bytes)", data.len());
        let mut decoder = GzDecoder::new(data);
        let mut inflated = Vec::new();
        decoder
            .read_to_end(&mut inflated)
            .map_err(|e| Error::Decode(format!("gzip inflation failed: {e}")))?;
        return decode_json(&inflated);
    }

    decode_json(data)
}

fn decode_json(data: &[u8]) -> Result<ShardDocument> {
    serde_json::from_slice(data).map_err(Error::from)
}
