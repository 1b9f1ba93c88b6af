use crate::{Document, DocumentOptions, ErrorCode, parse};

#[test]
fn reload_matches_fresh_parse() {
    let first = br#"{"big":[1,2,3,{"x":[4,5,6]}],"tail":"t"}"#;
    let second = br#"[true,{"k":null}]"#;

    let mut doc = Document::new();
    doc.load(first).unwrap();
    doc.load(second).unwrap();
    let fresh = parse(second);
    assert_eq!(doc.tokens(), fresh.tokens());
    assert_eq!(doc.dump(0), fresh.dump(0));

    doc.load(second).unwrap();
    assert_eq!(doc.tokens(), fresh.tokens());
}

#[test]
fn failed_reload_invalidates() {
    let mut doc = parse(b"[1]");
    assert!(doc.is_valid());
    assert_eq!(doc.load(b"[1").unwrap_err().code, ErrorCode::Incomplete);
    assert!(!doc.is_valid());
    assert_eq!(doc.size(), 0);
    doc.load(b"[1]").unwrap();
    assert!(doc.is_valid());
    assert_eq!(doc.error(), None);
}

#[test]
fn reload_detaches_from_shared_storage() {
    let mut doc = parse(br#"{"a":[1,2]}"#);
    let a = doc.at("a").unwrap();
    doc.load(b"\"replaced\"").unwrap();

    assert_eq!(doc.to_str(), Ok("replaced"));
    assert_eq!(a.dump(0), "[1,2]");
    assert_eq!(a.at_index(1).unwrap().to_int(), Ok(2));
}

#[test]
fn clear_empties_the_document() {
    let mut doc = parse(b"[1,2]");
    doc.clear();
    assert!(!doc.is_valid());
    assert_eq!(doc.error(), None);
    assert_eq!(doc.token_count(), 0);
    assert!(doc.source().is_empty());
    assert_eq!(doc.dump(0), "");
}

#[test]
fn single_pass_reload_reuses_reserved_slots() {
    let mut doc = Document::with_options(DocumentOptions {
        reserve: 16,
        shrink_to_fit: true,
        ..DocumentOptions::default()
    });
    doc.load(b"[1,2,3]").unwrap();
    assert_eq!(doc.token_count(), 5);
    doc.load(br#"{"a":[1,2,3],"b":[4,5,6]}"#).unwrap();
    assert_eq!(doc.token_count(), 12);
    assert_eq!(doc.at("b").unwrap().at_index(2).unwrap().to_int(), Ok(6));
}
