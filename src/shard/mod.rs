//! Wire-level shard representation and decoding.

mod decode;
mod raw;

pub use decode::{decode_shard, is_gzip};
pub use raw::{
    RawBoundingPoly, RawDimension, RawEntity, RawFormField, RawLayout, RawNormalizedValue,
    RawNormalizedVertex, RawPage, RawPageAnchor, RawPageElement, RawPageRef, RawTable,
    RawTableCell, RawTableRow, RawTextAnchor, RawTextSegment, RawVertex, ShardDocument, ShardInfo,
};
