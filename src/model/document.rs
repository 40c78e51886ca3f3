//! Document-level types.

use std::collections::BTreeMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::model::{Entity, FormField, Page, Span};
use crate::shard::ShardDocument;

/// A logical document stitched together from one or more shards.
///
/// Immutable once constructed: the document owns its pages and entities
/// exclusively, and its full text is shared with them for lookup. All
/// entity and layout spans have been validated against the text at
/// construction time.
#[derive(Debug, Clone)]
pub struct Document {
    text: Arc<str>,
    locator: Option<Locator>,
    pages: Vec<Page>,
    entities: Vec<Entity>,
    raw: ShardDocument,
}

impl Document {
    /// Build a document from an already-merged wire document.
    pub(crate) fn from_merged(raw: ShardDocument, locator: Option<Locator>) -> Result<Self> {
        let text: Arc<str> = Arc::from(raw.text.as_str());

        let pages = raw
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| Page::from_raw(page, index as u32 + 1, &text))
            .collect::<Result<Vec<_>>>()?;

        let entities = raw
            .entities
            .iter()
            .map(|entity| Entity::from_raw(entity, &text))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            text,
            locator,
            pages,
            entities,
            raw,
        })
    }

    /// Full extracted text of the document, in reading order.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The storage locator the document was loaded from, when known.
    pub fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }

    /// URI of the original input file, when the shards declared one.
    pub fn uri(&self) -> Option<&str> {
        (!self.raw.uri.is_empty()).then_some(self.raw.uri.as_str())
    }

    /// Pages in physical order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Top-level entities in merged order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Number of top-level entities in the document.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get a page by its physical page number (1-based).
    ///
    /// Lookup is by the page's declared number, not by position, so a
    /// document with gaps in its page numbering returns `None` for the
    /// missing numbers.
    pub fn get_page(&self, page_number: u32) -> Option<&Page> {
        self.pages
            .iter()
            .find(|page| page.page_number == page_number)
    }

    /// Plain text of a page, by its physical page number (1-based).
    pub fn page_text(&self, page_number: u32) -> Result<String> {
        self.get_page(page_number)
            .map(|page| page.text())
            .ok_or_else(|| Error::PageOutOfRange(page_number, self.page_count()))
    }

    /// Plain-text excerpt of the document under `span`.
    pub fn excerpt(&self, span: Span) -> Result<&str> {
        span.slice(&self.text)
    }

    /// All entities of `entity_type`, including nested sub-entities.
    pub fn entities_by_type(&self, entity_type: &str) -> Vec<&Entity> {
        fn walk<'a>(entities: &'a [Entity], entity_type: &str, found: &mut Vec<&'a Entity>) {
            for entity in entities {
                if entity.entity_type == entity_type {
                    found.push(entity);
                }
                walk(&entity.properties, entity_type, found);
            }
        }

        let mut found = Vec::new();
        walk(&self.entities, entity_type, &mut found);
        found
    }

    /// Entity values grouped by type, including nested sub-entities.
    pub fn entities_to_map(&self) -> BTreeMap<String, Vec<String>> {
        fn walk(entities: &[Entity], map: &mut BTreeMap<String, Vec<String>>) {
            for entity in entities {
                map.entry(entity.entity_type.clone())
                    .or_default()
                    .push(entity.mention_text.clone());
                walk(&entity.properties, map);
            }
        }

        let mut map = BTreeMap::new();
        walk(&self.entities, &mut map);
        map
    }

    /// Pages whose text contains `needle`.
    pub fn search_pages(&self, needle: &str) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|page| page.text().contains(needle))
            .collect()
    }

    /// Pages whose text matches the regex `pattern`.
    pub fn search_pages_regex(&self, pattern: &str) -> Result<Vec<&Page>> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(self
            .pages
            .iter()
            .filter(|page| regex.is_match(&page.text()))
            .collect())
    }

    /// Form fields whose name contains `name`, case-insensitively, across
    /// all pages.
    pub fn form_fields_by_name(&self, name: &str) -> Vec<&FormField> {
        let name = name.to_lowercase();
        self.pages
            .iter()
            .flat_map(|page| &page.form_fields)
            .filter(|field| field.name.to_lowercase().contains(&name))
            .collect()
    }

    /// The merged wire document backing this wrapper, with all shard
    /// offsets already applied.
    pub fn to_merged_raw(&self) -> &ShardDocument {
        &self.raw
    }

    /// Serialize the merged wire document to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(&self.raw)
        } else {
            serde_json::to_string(&self.raw)
        };
        json.map_err(Error::from)
    }

    /// Render the page/layout tree as an hOCR document.
    ///
    /// `title` names the source image in the output, typically the input
    /// file name.
    pub fn to_hocr(&self, title: &str) -> String {
        crate::render::to_hocr(self, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::{
        RawEntity, RawFormField, RawLayout, RawPage, RawTextAnchor, RawTextSegment,
    };

    fn layout(start: i64, end: i64) -> RawLayout {
        RawLayout {
            text_anchor: Some(RawTextAnchor {
                text_segments: vec![RawTextSegment {
                    start_index: start,
                    end_index: end,
                }],
                content: String::new(),
            }),
            confidence: 1.0,
            bounding_poly: None,
        }
    }

    fn merged_fixture() -> ShardDocument {
        ShardDocument {
            uri: "gs://bucket/input.pdf".to_string(),
            text: "Invoice 42\nTotal due soon".to_string(),
            pages: vec![
                RawPage {
                    page_number: 1,
                    layout: Some(layout(0, 11)),
                    ..RawPage::default()
                },
                RawPage {
                    page_number: 2,
                    layout: Some(layout(11, 25)),
                    ..RawPage::default()
                },
            ],
            entities: vec![RawEntity {
                entity_type: "invoice_id".to_string(),
                mention_text: "42".to_string(),
                confidence: 0.97,
                text_anchor: Some(RawTextAnchor {
                    text_segments: vec![RawTextSegment {
                        start_index: 8,
                        end_index: 10,
                    }],
                    content: String::new(),
                }),
                ..RawEntity::default()
            }],
            shard_info: None,
        }
    }

    #[test]
    fn test_accessors() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        assert_eq!(doc.text(), "Invoice 42\nTotal due soon");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.entity_count(), 1);
        assert_eq!(doc.uri(), Some("gs://bucket/input.pdf"));
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_get_page_is_one_indexed() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        assert!(doc.get_page(0).is_none());
        assert_eq!(doc.get_page(1).unwrap().page_number, 1);
        assert!(doc.get_page(3).is_none());
        assert!(matches!(
            doc.page_text(3),
            Err(Error::PageOutOfRange(3, 2))
        ));
        assert_eq!(doc.page_text(2).unwrap(), "Total due soon");
    }

    #[test]
    fn test_get_page_honors_noncontiguous_numbering() {
        let mut raw = merged_fixture();
        raw.pages[1].page_number = 3;

        let doc = Document::from_merged(raw, None).unwrap();
        assert_eq!(doc.get_page(3).unwrap().page_number, 3);
        assert!(doc.get_page(2).is_none());
        assert!(matches!(
            doc.page_text(2),
            Err(Error::PageOutOfRange(2, 2))
        ));
        assert_eq!(doc.page_text(3).unwrap(), "Total due soon");
    }

    #[test]
    fn test_form_fields_by_name() {
        let mut raw = merged_fixture();
        // "Total" at [11, 16), "due" at [17, 20) in the fixture text.
        raw.pages[1].form_fields.push(RawFormField {
            field_name: Some(layout(11, 16)),
            field_value: Some(layout(17, 20)),
        });

        let doc = Document::from_merged(raw, None).unwrap();
        let fields = doc.form_fields_by_name("total");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "Total");
        assert_eq!(fields[0].value, "due");
        assert!(doc.form_fields_by_name("subtotal").is_empty());
    }

    #[test]
    fn test_excerpt() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        assert_eq!(doc.excerpt(Span::new(8, 10)).unwrap(), "42");
        assert!(doc.excerpt(Span::new(0, 100)).is_err());
    }

    #[test]
    fn test_entities_by_type() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        let found = doc.entities_by_type("invoice_id");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].mention_text, "42");
        assert!(doc.entities_by_type("missing").is_empty());
    }

    #[test]
    fn test_entities_by_type_recurses_into_properties() {
        let mut raw = merged_fixture();
        raw.entities[0].properties.push(RawEntity {
            entity_type: "line_item".to_string(),
            mention_text: "Total".to_string(),
            confidence: 0.8,
            ..RawEntity::default()
        });

        let doc = Document::from_merged(raw, None).unwrap();
        assert_eq!(doc.entities_by_type("line_item").len(), 1);
        let map = doc.entities_to_map();
        assert_eq!(map["line_item"], vec!["Total"]);
        assert_eq!(map["invoice_id"], vec!["42"]);
    }

    #[test]
    fn test_search_pages() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        let hits = doc.search_pages("Total");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].page_number, 2);

        let hits = doc.search_pages_regex(r"Invoice \d+").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].page_number, 1);

        assert!(matches!(
            doc.search_pages_regex("(unclosed"),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_rejects_entity_span_outside_text() {
        let mut raw = merged_fixture();
        raw.entities[0]
            .text_anchor
            .as_mut()
            .unwrap()
            .text_segments[0]
            .end_index = 999;
        assert!(Document::from_merged(raw, None).is_err());
    }

    #[test]
    fn test_to_json_roundtrip() {
        let doc = Document::from_merged(merged_fixture(), None).unwrap();
        let json = doc.to_json(false).unwrap();
        let back: ShardDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, doc.text());
        assert_eq!(back.pages.len(), 2);
    }
}
