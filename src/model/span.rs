//! Text spans and anchors.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::shard::{RawTextAnchor, RawTextSegment};

/// A half-open `[start, end)` byte range into a document's full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,

    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check that the span fits `text` and lands on char boundaries.
    pub fn validate(&self, text: &str) -> Result<()> {
        if self.start > self.end
            || self.end > text.len()
            || !text.is_char_boundary(self.start)
            || !text.is_char_boundary(self.end)
        {
            return Err(Error::InvalidSpan {
                start: self.start,
                end: self.end,
                len: text.len(),
            });
        }
        Ok(())
    }

    /// Slice `text` under this span.
    ///
    /// Returns `InvalidSpan` when the span does not fit the text.
    pub fn slice<'a>(&self, text: &'a str) -> Result<&'a str> {
        text.get(self.start..self.end).ok_or(Error::InvalidSpan {
            start: self.start,
            end: self.end,
            len: text.len(),
        })
    }

    fn from_raw(segment: &RawTextSegment) -> Result<Self> {
        if segment.start_index < 0 || segment.end_index < 0 {
            return Err(Error::Decode(format!(
                "negative text segment [{}, {})",
                segment.start_index, segment.end_index
            )));
        }
        Ok(Self::new(
            segment.start_index as usize,
            segment.end_index as usize,
        ))
    }
}

/// Reference into the document text as an ordered list of spans.
///
/// Most anchors carry a single segment; multi-segment anchors occur when an
/// element's text is discontiguous in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    /// Segments in reading order.
    pub segments: Vec<Span>,
}

impl TextAnchor {
    /// Build an anchor from wire segments, validating against `text`.
    pub fn from_raw(raw: Option<&RawTextAnchor>, text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        if let Some(raw) = raw {
            for segment in &raw.text_segments {
                let span = Span::from_raw(segment)?;
                span.validate(text)?;
                segments.push(span);
            }
        }
        Ok(Self { segments })
    }

    /// Check if the anchor references no text.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The overall envelope of the anchor, from the first segment's start
    /// to the last segment's end.
    pub fn span(&self) -> Option<Span> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some(Span::new(first.start, last.end))
    }

    /// Join the text slices under all segments.
    pub fn text_of(&self, text: &str) -> String {
        self.segments
            .iter()
            .filter_map(|span| text.get(span.start..span.end))
            .collect()
    }
}
