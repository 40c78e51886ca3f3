//! Entity-level types.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{clamp_confidence, Span, TextAnchor};
use crate::shard::RawEntity;

/// An extracted semantic entity: a typed value with its mention in the
/// document text.
///
/// Read-only view over merged shard data. The entity holds a reference to
/// the owning document's text for excerpt lookup, never its own copy.
#[derive(Debug, Clone)]
pub struct Entity {
    doc_text: Arc<str>,

    /// Entity id, when the processor assigned one.
    pub id: Option<String>,

    /// Entity type from the processor schema, e.g. "invoice_date".
    pub entity_type: String,

    /// Text value in the document. Empty when the entity is not present
    /// in the text.
    pub mention_text: String,

    /// Normalized value, when the processor produced one.
    pub normalized_value: Option<String>,

    /// Extraction confidence, clamped into [0, 1].
    pub confidence: f32,

    /// Anchor into the document text; empty when not text-anchored.
    pub anchor: TextAnchor,

    /// First page the entity appears on (0-based).
    pub start_page: Option<u32>,

    /// Last page the entity appears on (0-based).
    pub end_page: Option<u32>,

    /// Nested sub-entities.
    pub properties: Vec<Entity>,
}

impl Entity {
    pub(crate) fn from_raw(raw: &RawEntity, doc_text: &Arc<str>) -> Result<Self> {
        let anchor = TextAnchor::from_raw(raw.text_anchor.as_ref(), doc_text)?;

        let normalized_value = raw
            .normalized_value
            .as_ref()
            .filter(|value| !value.text.is_empty())
            .map(|value| value.text.clone());

        let page_refs = raw
            .page_anchor
            .as_ref()
            .map(|anchor| anchor.page_refs.as_slice())
            .unwrap_or_default();
        let start_page = page_refs.first().map(|r| r.page.max(0) as u32);
        let end_page = page_refs.last().map(|r| r.page.max(0) as u32);

        let properties = raw
            .properties
            .iter()
            .map(|property| Entity::from_raw(property, doc_text))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            doc_text: Arc::clone(doc_text),
            id: (!raw.id.is_empty()).then(|| raw.id.clone()),
            entity_type: raw.entity_type.clone(),
            mention_text: raw.mention_text.clone(),
            normalized_value,
            confidence: clamp_confidence(raw.confidence, "entity"),
            anchor,
            start_page,
            end_page,
            properties,
        })
    }

    /// The entity's value: the normalized value when present, falling back
    /// to the mention text.
    pub fn value(&self) -> &str {
        self.normalized_value
            .as_deref()
            .unwrap_or(&self.mention_text)
    }

    /// Overall span of the entity in the document text, `None` when the
    /// entity is not text-anchored.
    pub fn span(&self) -> Option<Span> {
        self.anchor.span()
    }

    /// Document text under the entity's anchor, `None` when the entity is
    /// not text-anchored.
    pub fn excerpt(&self) -> Option<String> {
        if self.anchor.is_empty() {
            return None;
        }
        Some(self.anchor.text_of(&self.doc_text))
    }
}
