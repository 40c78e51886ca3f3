//! Rendering of the document model to output formats.

mod hocr;

pub use hocr::to_hocr;
