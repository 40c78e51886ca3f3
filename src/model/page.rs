//! Page-level types.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{clamp_confidence, Span, TextAnchor};
use crate::shard::{
    RawBoundingPoly, RawFormField, RawLayout, RawPage, RawPageElement, RawTable, RawTableRow,
};

/// Axis-aligned bounding box of a layout element, in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl BoundingBox {
    /// Derive a box from a wire bounding polygon, denormalizing against the
    /// page dimensions when only normalized vertices are present.
    fn from_raw(poly: Option<&RawBoundingPoly>, width: f32, height: f32) -> Option<Self> {
        let poly = poly?;
        if poly.vertices.len() >= 3 {
            let (a, c) = (&poly.vertices[0], &poly.vertices[2]);
            return Some(Self {
                min_x: a.x,
                min_y: a.y,
                max_x: c.x,
                max_y: c.y,
            });
        }
        if poly.normalized_vertices.len() >= 3 {
            let (a, c) = (&poly.normalized_vertices[0], &poly.normalized_vertices[2]);
            return Some(Self {
                min_x: a.x * width,
                min_y: a.y * height,
                max_x: c.x * width,
                max_y: c.y * height,
            });
        }
        None
    }
}

/// A single page of the document and its layout elements.
///
/// All element sequences preserve the wire data's order. Elements slice the
/// owning document's text through their anchors; nothing here owns text of
/// its own.
#[derive(Debug, Clone)]
pub struct Page {
    doc_text: Arc<str>,

    /// 1-based physical page number.
    pub page_number: u32,

    /// Page width in the service's layout units.
    pub width: f32,

    /// Page height in the service's layout units.
    pub height: f32,

    /// Anchor covering the whole page.
    pub anchor: TextAnchor,

    /// Bounding box covering the whole page, when the wire data carries one.
    pub bounding_box: Option<BoundingBox>,

    /// Visually detected text blocks.
    pub blocks: Vec<PageElement>,

    /// Visually detected paragraphs.
    pub paragraphs: Vec<PageElement>,

    /// Visually detected lines.
    pub lines: Vec<PageElement>,

    /// Visually detected tokens (words).
    pub tokens: Vec<PageElement>,

    /// Detected tables.
    pub tables: Vec<Table>,

    /// Detected form fields.
    pub form_fields: Vec<FormField>,
}

impl Page {
    pub(crate) fn from_raw(raw: &RawPage, ordinal: u32, doc_text: &Arc<str>) -> Result<Self> {
        let page_number = if raw.page_number > 0 {
            raw.page_number as u32
        } else {
            ordinal
        };

        let (width, height) = raw
            .dimension
            .as_ref()
            .map(|d| (d.width, d.height))
            .unwrap_or_default();

        Ok(Self {
            doc_text: Arc::clone(doc_text),
            page_number,
            width,
            height,
            anchor: anchor_of(raw.layout.as_ref(), doc_text)?,
            bounding_box: bounding_box_of(raw.layout.as_ref(), width, height),
            blocks: elements_from_raw(&raw.blocks, doc_text, width, height)?,
            paragraphs: elements_from_raw(&raw.paragraphs, doc_text, width, height)?,
            lines: elements_from_raw(&raw.lines, doc_text, width, height)?,
            tokens: elements_from_raw(&raw.tokens, doc_text, width, height)?,
            tables: raw
                .tables
                .iter()
                .map(|table| Table::from_raw(table, doc_text))
                .collect::<Result<Vec<_>>>()?,
            form_fields: raw
                .form_fields
                .iter()
                .map(|field| FormField::from_raw(field, doc_text))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Plain text of the page, sliced from the owning document's text.
    pub fn text(&self) -> String {
        self.anchor.text_of(&self.doc_text)
    }

    /// Page dimensions as (width, height).
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Check if the page carries no layout elements.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
            && self.paragraphs.is_empty()
            && self.lines.is_empty()
            && self.tokens.is_empty()
            && self.tables.is_empty()
            && self.form_fields.is_empty()
    }
}

/// One layout element on a page (block, paragraph, line, or token).
#[derive(Debug, Clone)]
pub struct PageElement {
    doc_text: Arc<str>,

    /// Anchor into the document text.
    pub anchor: TextAnchor,

    /// Detection confidence, clamped into [0, 1].
    pub confidence: f32,

    /// Bounding box of the element on its page, when the wire data
    /// carries one.
    pub bounding_box: Option<BoundingBox>,
}

impl PageElement {
    fn from_raw(raw: &RawPageElement, doc_text: &Arc<str>, width: f32, height: f32) -> Result<Self> {
        Ok(Self {
            doc_text: Arc::clone(doc_text),
            anchor: anchor_of(raw.layout.as_ref(), doc_text)?,
            confidence: clamp_confidence(
                raw.layout.as_ref().map(|l| l.confidence).unwrap_or_default(),
                "layout element",
            ),
            bounding_box: bounding_box_of(raw.layout.as_ref(), width, height),
        })
    }

    /// Text of the element, sliced from the owning document's text.
    pub fn text(&self) -> String {
        self.anchor.text_of(&self.doc_text)
    }

    /// Overall span of the element in the document text.
    pub fn span(&self) -> Option<Span> {
        self.anchor.span()
    }
}

/// A detected table with its cell text materialized.
#[derive(Debug, Clone)]
pub struct Table {
    /// Anchor covering the whole table.
    pub anchor: TextAnchor,

    /// Header rows, as cell text with newlines stripped.
    pub header_rows: Vec<Vec<String>>,

    /// Body rows, as cell text with newlines stripped.
    pub body_rows: Vec<Vec<String>>,
}

impl Table {
    fn from_raw(raw: &RawTable, doc_text: &Arc<str>) -> Result<Self> {
        Ok(Self {
            anchor: anchor_of(raw.layout.as_ref(), doc_text)?,
            header_rows: rows_from_raw(&raw.header_rows, doc_text)?,
            body_rows: rows_from_raw(&raw.body_rows, doc_text)?,
        })
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.body_rows.len()
    }

    /// Number of columns, based on the first header or body row.
    pub fn column_count(&self) -> usize {
        self.header_rows
            .first()
            .or_else(|| self.body_rows.first())
            .map(|row| row.len())
            .unwrap_or(0)
    }

    /// Check if the table has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.header_rows.is_empty() && self.body_rows.is_empty()
    }
}

/// A detected form field as a trimmed name/value pair.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name, trimmed.
    pub name: String,

    /// Field value, trimmed.
    pub value: String,

    /// Anchor of the field name in the document text.
    pub name_anchor: TextAnchor,

    /// Anchor of the field value in the document text.
    pub value_anchor: TextAnchor,
}

impl FormField {
    fn from_raw(raw: &RawFormField, doc_text: &Arc<str>) -> Result<Self> {
        let name_anchor = anchor_of(raw.field_name.as_ref(), doc_text)?;
        let value_anchor = anchor_of(raw.field_value.as_ref(), doc_text)?;
        Ok(Self {
            name: trim_text(&name_anchor.text_of(doc_text)),
            value: trim_text(&value_anchor.text_of(doc_text)),
            name_anchor,
            value_anchor,
        })
    }
}

fn anchor_of(layout: Option<&RawLayout>, text: &str) -> Result<TextAnchor> {
    TextAnchor::from_raw(layout.and_then(|l| l.text_anchor.as_ref()), text)
}

fn bounding_box_of(layout: Option<&RawLayout>, width: f32, height: f32) -> Option<BoundingBox> {
    BoundingBox::from_raw(layout.and_then(|l| l.bounding_poly.as_ref()), width, height)
}

fn elements_from_raw(
    raw: &[RawPageElement],
    doc_text: &Arc<str>,
    width: f32,
    height: f32,
) -> Result<Vec<PageElement>> {
    raw.iter()
        .map(|element| PageElement::from_raw(element, doc_text, width, height))
        .collect()
}

fn rows_from_raw(rows: &[RawTableRow], doc_text: &Arc<str>) -> Result<Vec<Vec<String>>> {
    rows.iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| {
                    let anchor = anchor_of(cell.layout.as_ref(), doc_text)?;
                    Ok(anchor.text_of(doc_text).replace('\n', ""))
                })
                .collect()
        })
        .collect()
}

/// Collapse whitespace the way extracted field text is usually consumed:
/// trim the ends and flatten newlines to spaces.
fn trim_text(text: &str) -> String {
    text.trim().replace('\n', " ")
}
