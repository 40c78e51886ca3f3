//! Document object model.
//!
//! Immutable wrapper types built once from merged shard data and queried
//! thereafter. A built [`Document`] is safely readable from multiple
//! threads without locks.

mod document;
mod entity;
mod page;
mod span;

pub use document::Document;
pub use entity::Entity;
pub use page::{BoundingBox, FormField, Page, PageElement, Table};
pub use span::{Span, TextAnchor};

/// Clamp a confidence score into [0, 1], logging out-of-range input.
/// NaN maps to 0.
pub(crate) fn clamp_confidence(value: f32, context: &str) -> f32 {
    if value.is_nan() {
        log::warn!("{context} confidence is NaN, using 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&value) {
        log::warn!("{context} confidence {value} outside [0, 1], clamping");
    }
    value.clamp(0.0, 1.0)
}
