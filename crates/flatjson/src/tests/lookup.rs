use alloc::{string::String, vec::Vec};

use crate::{BStr, ConversionError, LookupError, TokenType, parse, parse_str};

#[test]
fn sibling_skip_over_nested_object() {
    let doc = parse(br#"{"a":{"x":1,"y":2},"b":3}"#);
    let b = doc.at("b").unwrap();
    assert_eq!(b.to_int(), Ok(3));
    // The walk lands on `b` directly after skipping `a`'s subtree.
    assert_eq!(doc.tokens()[0].end(), Some(6));
    assert_eq!(doc.at("a").unwrap().token_count(), 4);
}

#[test]
fn nested_keys_are_not_direct_members() {
    let doc = parse(br#"{"outer":{"target":1,"deep":[{"target":2}]},"target":3}"#);
    assert_eq!(doc.at("target").unwrap().to_int(), Ok(3));

    let doc = parse(br#"{"outer":{"target":1}}"#);
    assert!(!doc.contains("target"));
    assert_eq!(doc.at("target").unwrap_err(), LookupError::KeyNotFound);
    assert!(doc.get("target").is_none());
}

#[test]
fn index_skips_nested_containers() {
    let doc = parse(br#"[[1,[2,3]],{"k":[4]},5]"#);
    assert_eq!(doc.size(), 3);
    assert_eq!(doc.at_index(2).unwrap().to_int(), Ok(5));
    assert!(doc.at_index(1).unwrap().is_object());
    assert_eq!(
        doc.at_index(3).unwrap_err(),
        LookupError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert!(doc.get_index(7).is_none());
}

#[test]
fn first_duplicate_key_wins() {
    let doc = parse(br#"{"k":1,"k":2}"#);
    assert_eq!(doc.size(), 2);
    assert_eq!(doc.at("k").unwrap().to_int(), Ok(1));
}

#[test]
fn keys_compare_raw_bytes() {
    let doc = parse_str(r#"{"a\"b":1,"caf\u00e9":2}"#);
    assert!(doc.contains(br#"a\"b"#));
    assert!(doc.contains(r"caf\u00e9"));
    assert!(!doc.contains("caf\u{e9}"));
}

#[test]
fn children_and_keys() {
    let doc = parse(br#"{"a":1,"b":{"c":[]},"d":[true]}"#);
    let keys: Vec<&BStr> = doc.keys().collect();
    assert_eq!(keys, [BStr::new("a"), BStr::new("b"), BStr::new("d")]);

    let kinds: Vec<TokenType> = doc.children().map(|c| c.kind()).collect();
    assert_eq!(kinds, [TokenType::Number, TokenType::Object, TokenType::Array]);

    let d = doc.at("d").unwrap();
    assert_eq!(d.keys().count(), 0);
    assert_eq!(d.children().count(), 1);
    assert_eq!(doc.at("a").unwrap().children().count(), 0);
}

#[test]
fn sub_documents_share_storage() {
    let doc = parse(br#"{"list":[1,2,3]}"#);
    let list = doc.at("list").unwrap();
    assert!(list.is_valid());
    assert_eq!(list.source(), doc.source());
    assert_eq!(list.tokens(), &doc.tokens()[1..6]);
    assert_eq!(list.dump(0), "[1,2,3]");
    list.assert_well_formed();
    drop(doc);
    assert_eq!(list.at_index(2).unwrap().to_uint(), Ok(3));
}

#[test]
fn conversions() {
    let doc = parse_str(
        r#"{"i":-7,"u":4294967295,"big":-9223372036854775808,"f":"0.25","t":true,"n":null,"s":"a\nb","h":0x10,"x":"nan"}"#,
    );
    assert_eq!(doc.at("i").unwrap().to_int(), Ok(-7));
    assert_eq!(doc.at("i").unwrap().to_uint(), Err(ConversionError::IntegerOverflow));
    assert_eq!(doc.at("u").unwrap().to_uint(), Ok(u32::MAX));
    assert_eq!(doc.at("u").unwrap().to_int(), Err(ConversionError::IntegerOverflow));
    assert_eq!(doc.at("big").unwrap().to_int64(), Ok(i64::MIN));
    assert_eq!(doc.at("f").unwrap().to_double(), Ok(0.25));
    assert_eq!(doc.at("f").unwrap().to_float(), Ok(0.25));
    assert_eq!(doc.at("f").unwrap().to_int(), Err(ConversionError::InvalidInteger));
    assert_eq!(doc.at("t").unwrap().to_bool(), Ok(true));
    assert_eq!(doc.at("t").unwrap().to_double(), Err(ConversionError::InvalidFloat));
    assert_eq!(doc.at("n").unwrap().to_bstr(), BStr::new(""));
    assert_eq!(doc.at("n").unwrap().to_int(), Err(ConversionError::InvalidInteger));
    assert_eq!(doc.at("s").unwrap().to_str(), Ok(r"a\nb"));
    assert_eq!(doc.at("s").unwrap().to_string_value(), Ok(String::from(r"a\nb")));
    assert_eq!(doc.at("h").unwrap().to_uint64(), Ok(16));
    assert_eq!(doc.at("h").unwrap().to::<u8>(), Ok(16));
    assert_eq!(doc.at("x").unwrap().to_double(), Err(ConversionError::InvalidFloat));
}

#[test]
fn invalid_document_lookups_miss() {
    let doc = parse(b"{");
    assert!(!doc.contains("a"));
    assert!(doc.get_index(0).is_none());
    assert_eq!(doc.children().count(), 0);
    assert_eq!(doc.to_bstr(), BStr::new(""));
}

#[test]
#[should_panic(expected = "cannot convert OBJECT to a scalar")]
fn converting_a_container_panics() {
    let _ = parse(b"{}").to_int();
}

#[test]
#[should_panic(expected = "expected OBJECT, found ARRAY")]
fn key_lookup_on_array_panics() {
    let _ = parse(b"[1]").get("a");
}

#[test]
#[should_panic(expected = "expected ARRAY, found NUMBER")]
fn index_lookup_on_scalar_panics() {
    let _ = parse(b"1").get_index(0);
}
