use alloc::vec;

use super::*;

fn parse_all(src: &[u8]) -> Result<alloc::vec::Vec<Token>, ParseError> {
    let count = count_tokens(src)?;
    let mut tokens = vec![Token::default(); count];
    let written = parse_into(src, &mut tokens)?;
    assert_eq!(written, count, "count and parse passes disagree");
    Ok(tokens)
}

fn code_of(src: &[u8]) -> ErrorCode {
    count_tokens(src).expect_err("expected an error").code
}

#[test]
fn scalar_root_takes_one_token() {
    assert_eq!(count_tokens(b"42"), Ok(1));
    assert_eq!(count_tokens(b"  \"x\"\n"), Ok(1));
    assert_eq!(count_tokens(b"null"), Ok(1));
}

#[test]
fn containers_take_an_end_marker() {
    assert_eq!(count_tokens(b"{}"), Ok(2));
    assert_eq!(count_tokens(b"[]"), Ok(2));
    assert_eq!(count_tokens(br#"{"a":[1,2],"b":{}}"#), Ok(8));
}

#[test]
fn nested_containers_carry_their_key() {
    let src = br#"{"a":[1,2],"b":{}}"#;
    let tokens = parse_all(src).unwrap();
    let kinds: alloc::vec::Vec<_> = tokens.iter().map(Token::kind).collect();
    assert_eq!(
        kinds,
        [
            TokenType::Object,
            TokenType::Array,
            TokenType::Number,
            TokenType::Number,
            TokenType::ArrayEnd,
            TokenType::Object,
            TokenType::ObjectEnd,
            TokenType::ObjectEnd,
        ]
    );

    assert_eq!(tokens[0].end(), Some(7));
    assert_eq!(tokens[0].child_count(), 3);
    assert_eq!(&src[tokens[1].key_range().unwrap()], b"a");
    assert_eq!(tokens[1].parent(), Some(0));
    assert_eq!(tokens[1].end(), Some(4));
    assert_eq!(tokens[1].child_count(), 3);
    assert_eq!(tokens[2].key(), None);
    assert_eq!(&src[tokens[3].value_range()], b"2");
    assert_eq!(tokens[4].parent(), Some(1));
    assert_eq!(&src[tokens[5].key_range().unwrap()], b"b");
    assert_eq!(tokens[5].end(), Some(6));
    assert_eq!(tokens[5].child_count(), 1);
    assert_eq!(tokens[7].parent(), Some(0));
}

#[test]
fn string_span_excludes_quotes_and_keeps_escapes() {
    let src = r#"["a\"bé"]"#.as_bytes();
    let tokens = parse_all(src).unwrap();
    assert_eq!(&src[tokens[1].value_range()], r#"a\"bé"#.as_bytes());
}

#[test]
fn literal_prefixes_are_incomplete() {
    for src in [&b"t"[..], b"tr", b"tru", b"fals", b"n", b"[nul"] {
        assert_eq!(code_of(src), ErrorCode::Incomplete, "{src:?}");
    }
}

#[test]
fn literal_mismatches_are_invalid() {
    for src in [&b"trUe"[..], b"nul1", b"fax", b"[tx]"] {
        assert_eq!(code_of(src), ErrorCode::Invalid, "{src:?}");
    }
}

#[test]
fn truncated_numbers_are_incomplete() {
    for src in [&b"-"[..], b"1.", b"1e", b"1e+", b"0x", b"[-"] {
        assert_eq!(code_of(src), ErrorCode::Incomplete, "{src:?}");
    }
}

#[test]
fn leading_zero_rules() {
    assert_eq!(code_of(b"012"), ErrorCode::Invalid);
    assert_eq!(code_of(b"-012"), ErrorCode::Invalid);
    assert_eq!(count_tokens(b"0"), Ok(1));
    assert_eq!(count_tokens(b"-0"), Ok(1));
    assert_eq!(count_tokens(b"0.3"), Ok(1));
    assert_eq!(count_tokens(b"0e5"), Ok(1));
    assert_eq!(count_tokens(b"0x1F"), Ok(1));
}

#[test]
fn utf8_in_strings_is_validated() {
    assert_eq!(count_tokens("\"é中😀\"".as_bytes()), Ok(1));
    // overlong, surrogate, past U+10FFFF, stray continuation
    for src in [
        &b"\"\xC0\xAF\""[..],
        b"\"\xE0\x80\xAF\"",
        b"\"\xED\xA0\x80\"",
        b"\"\xF4\x90\x80\x80\"",
        b"\"\x80\"",
        b"\"\xC3\x28\"",
    ] {
        assert_eq!(code_of(src), ErrorCode::Invalid, "{src:?}");
    }
    assert_eq!(code_of(b"\"\xE4\xB8"), ErrorCode::Incomplete);
}

#[test]
fn escapes() {
    assert_eq!(count_tokens(br#""\n\t\/\\\"\u12aF""#), Ok(1));
    assert_eq!(code_of(br#""\x""#), ErrorCode::Invalid);
    assert_eq!(code_of(br#""\u12G4""#), ErrorCode::Invalid);
    assert_eq!(code_of(br#""\u12"#), ErrorCode::Incomplete);
    assert_eq!(code_of(b"\"\\"), ErrorCode::Incomplete);
}

#[test]
fn control_bytes_in_strings_are_invalid() {
    assert_eq!(code_of(b"\"a\nb\""), ErrorCode::Invalid);
}

#[test]
fn separators() {
    assert_eq!(code_of(br#"{"a":1 "b":2}"#), ErrorCode::Invalid);
    assert_eq!(code_of(b"[1 2]"), ErrorCode::Invalid);
    assert_eq!(code_of(b"[1,]"), ErrorCode::Invalid);
    assert_eq!(code_of(br#"{"a":1,}"#), ErrorCode::Invalid);
    assert_eq!(code_of(br#"{"a" 1}"#), ErrorCode::Invalid);
    assert_eq!(code_of(b"{1:2}"), ErrorCode::Invalid);
}

#[test]
fn trailing_bytes_after_root() {
    assert_eq!(count_tokens(b"{} \n\t"), Ok(2));
    let err = count_tokens(b"{} x").unwrap_err();
    assert_eq!(err, ParseError::new(ErrorCode::Invalid, 3));
    assert_eq!(code_of(b"1 2"), ErrorCode::Invalid);
}

#[test]
fn empty_input_is_incomplete() {
    assert_eq!(code_of(b""), ErrorCode::Incomplete);
    assert_eq!(code_of(b" \r\n"), ErrorCode::Incomplete);
    assert_eq!(code_of(b"{\"a\":"), ErrorCode::Incomplete);
    assert_eq!(code_of(b"[1,"), ErrorCode::Incomplete);
}

#[test]
fn error_offset_points_at_offending_byte() {
    let err = count_tokens(b"[1, ?]").unwrap_err();
    assert_eq!(err.offset, 4);
}

#[test]
fn writer_reports_short_buffer() {
    let src = b"[1,2,3]";
    let mut tokens = vec![Token::default(); 4];
    let err = parse_into(src, &mut tokens).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoFreeTokens);
}

#[test]
fn writer_overwrites_stale_slots() {
    let mut tokens = vec![Token::default(); 8];
    parse_into(br#"{"k":{"x":1}}"#, &mut tokens).unwrap();
    let written = parse_into(b"[7]", &mut tokens).unwrap();
    assert_eq!(written, 3);
    assert_eq!(tokens[0].kind(), TokenType::Array);
    assert_eq!(tokens[0].key(), None);
    assert_eq!(tokens[0].child_count(), 2);
    assert_eq!(tokens[0].end(), Some(2));
    assert_eq!(tokens[1].parent(), Some(0));
}

#[test]
fn key_length_limit() {
    let ok = alloc::format!(r#"{{"{}":1}}"#, "k".repeat(254));
    assert_eq!(parse_all(ok.as_bytes()).map(|t| t.len()), Ok(3));

    let long = alloc::format!(r#"{{"{}":1}}"#, "k".repeat(255));
    assert_eq!(count_tokens(long.as_bytes()), Ok(3));
    let err = parse_all(long.as_bytes()).unwrap_err();
    assert_eq!(err.code, ErrorCode::KeyLenOverflow);
}

#[test]
fn depth_limit_counts_open_containers() {
    assert_eq!(count_tokens_with_depth(b"[[1]]", 2), Ok(5));
    assert_eq!(count_tokens_with_depth(br#"[[],[],{}]"#, 2), Ok(8));
    assert_eq!(count_tokens_with_depth(b"7", 0), Ok(1));

    let err = count_tokens_with_depth(b"[[[1]]]", 2).unwrap_err();
    assert_eq!(err, ParseError::new(ErrorCode::DepthOverflow, 2));
    assert_eq!(code_of_depth(br#"{"a":{"b":[]}}"#, 2), ErrorCode::DepthOverflow);
    assert_eq!(code_of_depth(b"[]", 0), ErrorCode::DepthOverflow);
}

fn code_of_depth(src: &[u8], max_depth: usize) -> ErrorCode {
    count_tokens_with_depth(src, max_depth).expect_err("expected an error").code
}

#[test]
fn writer_honors_the_depth_limit() {
    let mut tokens = vec![Token::default(); 16];
    let err = parse_into_with_depth(b"[[[1]]]", &mut tokens, 2).unwrap_err();
    assert_eq!(err.code, ErrorCode::DepthOverflow);
    assert_eq!(parse_into_with_depth(b"[[1]]", &mut tokens, 2), Ok(5));
}

#[test]
fn unterminated_deep_nesting_is_an_error() {
    let src = vec![b'['; 100_000];
    assert_eq!(code_of(&src), ErrorCode::DepthOverflow);

    let mut tokens = vec![Token::default(); 8];
    assert_eq!(parse_into(&src, &mut tokens).unwrap_err().code, ErrorCode::NoFreeTokens);
}
