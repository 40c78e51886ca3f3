//! Integration tests for shard stitching.

use docstitch::{stitch_bytes, Error, MergeOptions, Span};
use serde_json::json;

/// Build a shard the way batch output serializes one: camelCase keys and
/// string-encoded integer offsets.
fn shard_json(
    uri: &str,
    text: &str,
    shard: Option<(i64, i64, i64)>,
    entities: serde_json::Value,
    pages: serde_json::Value,
) -> Vec<u8> {
    let mut value = json!({
        "uri": uri,
        "text": text,
        "entities": entities,
        "pages": pages,
    });
    if let Some((index, count, offset)) = shard {
        value["shardInfo"] = json!({
            "shardIndex": index.to_string(),
            "shardCount": count.to_string(),
            "textOffset": offset.to_string(),
        });
    }
    serde_json::to_vec(&value).unwrap()
}

fn entity(entity_type: &str, mention: &str, start: i64, end: i64, confidence: f64) -> serde_json::Value {
    json!({
        "type": entity_type,
        "mentionText": mention,
        "confidence": confidence,
        "textAnchor": {
            "textSegments": [
                {"startIndex": start.to_string(), "endIndex": end.to_string()}
            ]
        },
    })
}

fn page(number: i64, start: i64, end: i64) -> serde_json::Value {
    json!({
        "pageNumber": number,
        "layout": {
            "textAnchor": {
                "textSegments": [
                    {"startIndex": start.to_string(), "endIndex": end.to_string()}
                ]
            },
            "confidence": 0.99,
        },
        "tokens": [
            {
                "layout": {
                    "textAnchor": {
                        "textSegments": [
                            {"startIndex": start.to_string(), "endIndex": end.to_string()}
                        ]
                    },
                    "confidence": 0.9,
                }
            }
        ],
    })
}

#[test]
fn test_single_shard_entity_excerpt() {
    let shards = vec![shard_json(
        "gs://b/in.pdf",
        "Hello",
        None,
        json!([entity("greeting", "Hello", 0, 5, 0.9)]),
        json!([]),
    )];

    let doc = stitch_bytes(&shards).unwrap();
    assert_eq!(doc.text(), "Hello");
    let entities = doc.entities();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].span(), Some(Span::new(0, 5)));
    assert_eq!(entities[0].excerpt().as_deref(), Some("Hello"));
    assert_eq!(doc.excerpt(Span::new(0, 5)).unwrap(), "Hello");
}

#[test]
fn test_two_shard_rebase() {
    let shards = vec![
        shard_json(
            "gs://b/in.pdf",
            "Foo",
            Some((0, 2, 0)),
            json!([]),
            json!([page(1, 0, 3)]),
        ),
        shard_json(
            "gs://b/in.pdf",
            "Bar",
            Some((1, 2, 3)),
            json!([entity("word", "Bar", 0, 3, 0.8)]),
            json!([page(2, 0, 3)]),
        ),
    ];

    let doc = stitch_bytes(&shards).unwrap();
    assert_eq!(doc.text(), "FooBar");

    let entities = doc.entities();
    assert_eq!(entities[0].span(), Some(Span::new(3, 6)));
    assert_eq!(entities[0].excerpt().as_deref(), Some("Bar"));

    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.page_text(1).unwrap(), "Foo");
    assert_eq!(doc.page_text(2).unwrap(), "Bar");
    assert_eq!(doc.get_page(2).unwrap().tokens[0].text(), "Bar");
}

#[test]
fn test_merged_text_length_is_sum_of_shards() {
    let texts = ["First shard. ", "Second shard text. ", "Third."];
    let shards: Vec<Vec<u8>> = texts
        .iter()
        .enumerate()
        .scan(0i64, |offset, (i, text)| {
            let shard = shard_json(
                "gs://b/in.pdf",
                text,
                Some((i as i64, texts.len() as i64, *offset)),
                json!([]),
                json!([]),
            );
            *offset += text.len() as i64;
            Some(shard)
        })
        .collect();

    let doc = stitch_bytes(&shards).unwrap();
    let expected: usize = texts.iter().map(|t| t.len()).sum();
    assert_eq!(doc.text().len(), expected);
}

#[test]
fn test_all_spans_within_bounds_after_merge() {
    let shards = vec![
        shard_json(
            "gs://b/in.pdf",
            "Alpha beta. ",
            Some((0, 2, 0)),
            json!([entity("w", "Alpha", 0, 5, 0.9)]),
            json!([page(1, 0, 12)]),
        ),
        shard_json(
            "gs://b/in.pdf",
            "Gamma delta.",
            Some((1, 2, 12)),
            json!([entity("w", "Gamma", 0, 5, 0.9)]),
            json!([page(2, 0, 12)]),
        ),
    ];

    let doc = stitch_bytes(&shards).unwrap();
    let len = doc.text().len();

    for entity in doc.entities() {
        let span = entity.span().unwrap();
        assert!(span.start <= span.end && span.end <= len);
    }
    for page in doc.pages() {
        for token in &page.tokens {
            let span = token.span().unwrap();
            assert!(span.start <= span.end && span.end <= len);
        }
    }
}

#[test]
fn test_shards_arrive_out_of_order() {
    let shards = vec![
        shard_json("gs://b/in.pdf", "Bar", Some((1, 2, 3)), json!([]), json!([])),
        shard_json("gs://b/in.pdf", "Foo", Some((0, 2, 0)), json!([]), json!([])),
    ];
    let doc = stitch_bytes(&shards).unwrap();
    assert_eq!(doc.text(), "FooBar");
}

#[test]
fn test_schema_mismatch_on_differing_uris() {
    let shards = vec![
        shard_json("gs://b/one.pdf", "Foo", Some((0, 2, 0)), json!([]), json!([])),
        shard_json("gs://b/two.pdf", "Bar", Some((1, 2, 3)), json!([]), json!([])),
    ];
    assert!(matches!(
        stitch_bytes(&shards),
        Err(Error::SchemaMismatch(_))
    ));
}

#[test]
fn test_decode_error_on_shard_count_mismatch() {
    let shards = vec![
        shard_json("gs://b/in.pdf", "Foo", Some((0, 3, 0)), json!([]), json!([])),
        shard_json("gs://b/in.pdf", "Bar", Some((1, 3, 3)), json!([]), json!([])),
    ];
    assert!(matches!(stitch_bytes(&shards), Err(Error::Decode(_))));
}

#[test]
fn test_confidence_clamping_is_pinned() {
    let shards = vec![shard_json(
        "gs://b/in.pdf",
        "Hello",
        None,
        json!([
            entity("hot", "Hello", 0, 5, 1.5),
            entity("cold", "Hello", 0, 5, -0.25),
        ]),
        json!([]),
    )];

    let doc = stitch_bytes(&shards).unwrap();
    assert_eq!(doc.entities_by_type("hot")[0].confidence, 1.0);
    assert_eq!(doc.entities_by_type("cold")[0].confidence, 0.0);
}

#[test]
fn test_span_outside_text_is_decode_failure() {
    let shards = vec![shard_json(
        "gs://b/in.pdf",
        "Hi",
        None,
        json!([entity("w", "Hi", 0, 40, 0.9)]),
        json!([]),
    )];
    assert!(stitch_bytes(&shards).is_err());
}

#[test]
fn test_normalized_value_fallback() {
    let mut with_normalized = entity("date", "Jan 1, 2024", 0, 11, 0.9);
    with_normalized["normalizedValue"] = json!({"text": "2024-01-01"});

    let shards = vec![shard_json(
        "gs://b/in.pdf",
        "Jan 1, 2024 meeting",
        None,
        json!([with_normalized, entity("topic", "meeting", 12, 19, 0.7)]),
        json!([]),
    )];

    let doc = stitch_bytes(&shards).unwrap();
    assert_eq!(doc.entities_by_type("date")[0].value(), "2024-01-01");
    assert_eq!(doc.entities_by_type("topic")[0].value(), "meeting");
}

#[test]
fn test_sequential_and_parallel_agree() {
    let shards = vec![
        shard_json("gs://b/in.pdf", "Foo", Some((0, 2, 0)), json!([]), json!([])),
        shard_json("gs://b/in.pdf", "Bar", Some((1, 2, 3)), json!([]), json!([])),
    ];

    let parallel = stitch_bytes(&shards).unwrap();
    let sequential =
        docstitch::stitch_bytes_with_options(&shards, &MergeOptions::new().sequential()).unwrap();
    assert_eq!(parallel.text(), sequential.text());
    assert_eq!(parallel.page_count(), sequential.page_count());
}

#[test]
fn test_hocr_export_covers_all_pages() {
    let shards = vec![
        shard_json(
            "gs://b/in.pdf",
            "Foo",
            Some((0, 2, 0)),
            json!([]),
            json!([page(1, 0, 3)]),
        ),
        shard_json(
            "gs://b/in.pdf",
            "Bar",
            Some((1, 2, 3)),
            json!([]),
            json!([page(2, 0, 3)]),
        ),
    ];

    let doc = stitch_bytes(&shards).unwrap();
    let hocr = doc.to_hocr("in.pdf");

    assert!(hocr.contains("<meta name=\"ocr-number-of-pages\" content=\"2\" />"));
    assert_eq!(hocr.matches("<div class='ocr_page'").count(), 2);
    assert!(hocr.contains("image \"in.pdf\""));
    assert!(hocr.trim_end().ends_with("</html>"));
}

#[test]
fn test_merged_export_roundtrip() {
    let shards = vec![
        shard_json(
            "gs://b/in.pdf",
            "Foo",
            Some((0, 2, 0)),
            json!([entity("w", "Foo", 0, 3, 0.9)]),
            json!([page(1, 0, 3)]),
        ),
        shard_json(
            "gs://b/in.pdf",
            "Bar",
            Some((1, 2, 3)),
            json!([entity("w", "Bar", 0, 3, 0.9)]),
            json!([page(2, 0, 3)]),
        ),
    ];

    let doc = stitch_bytes(&shards).unwrap();
    let json = doc.to_json(false).unwrap();

    // The export is a self-contained single-shard document: re-stitching
    // it yields the same model.
    let restitched = stitch_bytes(&[json.into_bytes()]).unwrap();
    assert_eq!(restitched.text(), doc.text());
    assert_eq!(restitched.page_count(), doc.page_count());
    assert_eq!(
        restitched.entities()[1].span(),
        doc.entities()[1].span()
    );
}
