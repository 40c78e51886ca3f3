//! Wire model of a single shard.
//!
//! Mirrors the processing service's proto-JSON rendering of a document:
//! camelCase keys, and 64-bit integer fields serialized as decimal strings.
//! Unknown fields are ignored on decode.

use serde::{Deserialize, Deserializer, Serialize};

/// One serialized unit of API output covering part of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShardDocument {
    /// URI of the source document this shard belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// UTF-8 text covered by this shard, in reading order.
    pub text: String,

    /// Pages covered by this shard.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<RawPage>,

    /// Entities extracted from this shard.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<RawEntity>,

    /// Sharding metadata; absent for single-shard output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_info: Option<ShardInfo>,
}

/// Placement of a shard within a sharded document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShardInfo {
    /// 0-based index of this shard.
    #[serde(deserialize_with = "int64_value")]
    pub shard_index: i64,

    /// Total number of shards of the document.
    #[serde(deserialize_with = "int64_value")]
    pub shard_count: i64,

    /// Offset of this shard's text within the full document text.
    #[serde(deserialize_with = "int64_value")]
    pub text_offset: i64,
}

/// One page of a shard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPage {
    /// 1-based physical page number.
    #[serde(deserialize_with = "int64_value")]
    pub page_number: i64,

    /// Page dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<RawDimension>,

    /// Layout covering the whole page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<RawLayout>,

    /// Visually detected text blocks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<RawPageElement>,

    /// Visually detected paragraphs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<RawPageElement>,

    /// Visually detected lines.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<RawPageElement>,

    /// Visually detected tokens (words).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<RawPageElement>,

    /// Detected tables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<RawTable>,

    /// Detected form fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub form_fields: Vec<RawFormField>,
}

/// Page dimensions in the service's layout units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDimension {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
    /// Dimension unit, e.g. "pixels".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub unit: String,
}

/// A layout element wrapping a text anchor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPageElement {
    /// Layout of the element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<RawLayout>,
}

/// Visual and textual placement of an element on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLayout {
    /// Anchor into the full document text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<RawTextAnchor>,

    /// Detection confidence.
    pub confidence: f32,

    /// Bounding polygon of the element on the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_poly: Option<RawBoundingPoly>,
}

/// Bounding polygon of a layout element, in absolute or normalized
/// coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBoundingPoly {
    /// Vertices in page units, clockwise from the top-left.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<RawVertex>,

    /// Vertices normalized to [0, 1], clockwise from the top-left.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub normalized_vertices: Vec<RawNormalizedVertex>,
}

/// A 2D point in page units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVertex {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

/// A 2D point normalized against the page dimensions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNormalizedVertex {
    /// X coordinate in [0, 1].
    pub x: f32,
    /// Y coordinate in [0, 1].
    pub y: f32,
}

/// Reference into the document text as a list of half-open segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTextAnchor {
    /// Text segments, each an index range into the full document text.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text_segments: Vec<RawTextSegment>,

    /// Literal content, populated when the anchor carries no segments.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// A half-open `[start, end)` index range into the document text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTextSegment {
    /// Inclusive start offset.
    #[serde(deserialize_with = "int64_value")]
    pub start_index: i64,

    /// Exclusive end offset.
    #[serde(deserialize_with = "int64_value")]
    pub end_index: i64,
}

/// A detected table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTable {
    /// Table layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<RawLayout>,

    /// Header rows.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub header_rows: Vec<RawTableRow>,

    /// Body rows.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body_rows: Vec<RawTableRow>,
}

/// One row of a detected table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTableRow {
    /// Cells in the row.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<RawTableCell>,
}

/// One cell of a detected table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTableCell {
    /// Cell layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<RawLayout>,

    /// Number of rows the cell spans.
    #[serde(deserialize_with = "int64_value")]
    pub row_span: i64,

    /// Number of columns the cell spans.
    #[serde(deserialize_with = "int64_value")]
    pub col_span: i64,
}

/// A detected form field (name/value pair).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFormField {
    /// Layout of the field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<RawLayout>,

    /// Layout of the field value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_value: Option<RawLayout>,
}

/// An extracted semantic entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntity {
    /// Entity id, unique within the document.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Entity type from the processor schema, e.g. "invoice_date".
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub entity_type: String,

    /// Text value in the document. Empty when the entity is not
    /// present in the text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mention_text: String,

    /// Extraction confidence.
    pub confidence: f32,

    /// Normalized value, when the processor produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_value: Option<RawNormalizedValue>,

    /// Anchor into the document text; absent when not text-anchored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<RawTextAnchor>,

    /// Anchor to the pages the entity appears on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_anchor: Option<RawPageAnchor>,

    /// Nested sub-entities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<RawEntity>,
}

/// Normalized entity value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNormalizedValue {
    /// Normalized text representation.
    pub text: String,
}

/// Anchor to the pages an entity appears on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPageAnchor {
    /// Referenced pages, in order of appearance.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub page_refs: Vec<RawPageRef>,
}

/// Reference to one page of the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPageRef {
    /// 0-based page index within the document.
    #[serde(deserialize_with = "int64_value")]
    pub page: i64,
}

/// Deserialize a proto-JSON int64, which arrives either as a JSON number
/// or as a decimal string.
fn int64_value<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64Repr {
        Number(i64),
        Text(String),
    }

    match Int64Repr::deserialize(deserializer)? {
        Int64Repr::Number(n) => Ok(n),
        Int64Repr::Text(s) => s.parse::<i64>().map_err(serde::de::Error::custom),
    }
}
