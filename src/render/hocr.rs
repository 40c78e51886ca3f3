//! hOCR rendering of the page layout tree.
//!
//! hOCR is the de-facto interchange format for OCR output: XHTML with
//! `ocr_*` classes and per-element `bbox` annotations. Layout nesting
//! (block > paragraph > line > word) is reconstructed by text-span
//! containment, since the wire data keeps the four element lists flat.

use crate::model::{BoundingBox, Document, Page, PageElement, Span};

/// Render a document's pages as an hOCR document.
///
/// `title` names the source image in the page annotations, typically the
/// input file name.
pub fn to_hocr(doc: &Document, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n",
    );
    out.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"unknown\" lang=\"unknown\">\n");
    out.push_str("<head>\n");
    out.push_str(&format!("<title>{}</title>\n", escape(title)));
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html;charset=utf-8\" />\n");
    out.push_str("<meta name=\"ocr-system\" content=\"docstitch\" />\n");
    out.push_str("<meta name=\"ocr-langs\" content=\"unknown\" />\n");
    out.push_str(&format!(
        "<meta name=\"ocr-number-of-pages\" content=\"{}\" />\n",
        doc.page_count()
    ));
    out.push_str(
        "<meta name=\"ocr-capabilities\" content=\"ocr_page ocr_carea ocr_par ocr_line ocrx_word\" />\n",
    );
    out.push_str("</head>\n<body>\n");

    for (pidx, page) in doc.pages().iter().enumerate() {
        render_page(&mut out, page, pidx, title);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_page(out: &mut String, page: &Page, pidx: usize, title: &str) {
    out.push_str(&format!(
        "<div class='ocr_page' lang='unknown' title='image \"{}\";{}'>\n",
        escape(title),
        bbox_title(page.bounding_box)
    ));

    for (bidx, block) in page.blocks.iter().enumerate() {
        out.push_str(&format!(
            "<span class='ocr_carea' id='block_{pidx}_{bidx}' title='{}'>\n",
            bbox_title(block.bounding_box)
        ));

        let paragraphs = children(block, &page.paragraphs);
        for (paridx, paragraph) in paragraphs.iter().enumerate() {
            out.push_str(&format!(
                "<span class='ocr_par' id='par_{pidx}_{bidx}_{paridx}' title='{}'>\n",
                bbox_title(paragraph.bounding_box)
            ));

            let lines = children(paragraph, &page.lines);
            for (lidx, line) in lines.iter().enumerate() {
                out.push_str(&format!(
                    "<span class='ocr_line' id='line_{pidx}_{bidx}_{paridx}_{lidx}' title='{}'>{}</span>\n",
                    bbox_title(line.bounding_box),
                    escape(&line.text())
                ));

                for (widx, word) in children(line, &page.tokens).iter().enumerate() {
                    out.push_str(&format!(
                        "<span class='ocrx_word' id='word_{pidx}_{bidx}_{paridx}_{lidx}_{widx}' title='{}'>{}</span>\n",
                        bbox_title(word.bounding_box),
                        escape(&word.text())
                    ));
                }
            }

            out.push_str("</span>\n");
        }

        out.push_str("</span>\n");
    }

    out.push_str("</div>\n");
}

/// Elements of `pool` whose span falls inside the parent's span.
fn children<'a>(parent: &PageElement, pool: &'a [PageElement]) -> Vec<&'a PageElement> {
    pool.iter()
        .filter(|element| contains(parent.span(), element.span()))
        .collect()
}

fn contains(outer: Option<Span>, inner: Option<Span>) -> bool {
    match (outer, inner) {
        (Some(outer), Some(inner)) => inner.start >= outer.start && inner.end <= outer.end,
        _ => false,
    }
}

fn bbox_title(bbox: Option<BoundingBox>) -> String {
    match bbox {
        Some(b) => format!(
            "bbox {} {} {} {}",
            b.min_x as i64, b.min_y as i64, b.max_x as i64, b.max_y as i64
        ),
        None => "bbox 0 0 0 0".to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
