//! Re-serialization of a token range back to JSON text, and the diagnostic
//! token table.
//!
//! The serializer walks the tokens once and is generic over [`Output`], so
//! measuring the dump and writing it share the same layout rules.

use alloc::{string::String, vec::Vec};
use core::{convert::Infallible, fmt};

use bstr::BStr;

use crate::token::{Token, TokenType};

const SPACES: &[u8; 64] = b"                                                                ";

/// Destination of serialized bytes.
pub(crate) trait Output {
    type Error;

    fn put(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    fn pad(&mut self, mut n: usize) -> Result<(), Self::Error> {
        while n > 0 {
            let chunk = n.min(SPACES.len());
            self.put(&SPACES[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }
}

/// Counts bytes without storing them.
#[derive(Debug, Default)]
pub(crate) struct Measure {
    pub(crate) len: usize,
}

impl Output for Measure {
    type Error = Infallible;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.len += bytes.len();
        Ok(())
    }

    #[inline]
    fn pad(&mut self, n: usize) -> Result<(), Infallible> {
        self.len += n;
        Ok(())
    }
}

impl Output for Vec<u8> {
    type Error = Infallible;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Adapts a [`fmt::Write`]. Scanned strings are valid UTF-8, so the check in
/// `put` only fails for tokens that did not come from the scanner.
pub(crate) struct FmtOutput<'w, W: ?Sized>(pub(crate) &'w mut W);

impl<W: fmt::Write + ?Sized> Output for FmtOutput<'_, W> {
    type Error = fmt::Error;

    fn put(&mut self, bytes: &[u8]) -> fmt::Result {
        let text = core::str::from_utf8(bytes).map_err(|_| fmt::Error)?;
        self.0.write_str(text)
    }
}

#[cfg(feature = "std")]
pub(crate) struct IoOutput<W>(pub(crate) W);

#[cfg(feature = "std")]
impl<W: std::io::Write> Output for IoOutput<W> {
    type Error = std::io::Error;

    fn put(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.0.write_all(bytes)
    }
}

/// Serializes a contiguous token range.
///
/// The first token is the root of the range, so its key is never written.
/// With `indent == 0` the output is minified; otherwise every member, element
/// and non-empty closer goes on its own line.
pub(crate) fn write_tokens<O: Output>(
    out: &mut O,
    tokens: &[Token],
    source: &[u8],
    indent: usize,
) -> Result<(), O::Error> {
    let mut depth = 0usize;
    let mut prev: Option<TokenType> = None;

    for (i, token) in tokens.iter().enumerate() {
        let after_opener = prev.is_some_and(TokenType::is_container);

        if token.kind.is_end() {
            depth = depth.saturating_sub(1);
            if indent > 0 && !after_opener {
                out.put(b"\n")?;
                out.pad(depth * indent)?;
            }
            out.put(if token.kind == TokenType::ObjectEnd { b"}" } else { b"]" })?;
        } else {
            if prev.is_some() && !after_opener {
                out.put(b",")?;
            }
            if i > 0 {
                if indent > 0 {
                    out.put(b"\n")?;
                    out.pad(depth * indent)?;
                }
                if let Some(key) = token.key_range() {
                    out.put(b"\"")?;
                    out.put(&source[key])?;
                    out.put(b"\":")?;
                }
            }

            let value = &source[token.value_range()];
            match token.kind {
                TokenType::Object => {
                    depth += 1;
                    out.put(b"{")?;
                }
                TokenType::Array => {
                    depth += 1;
                    out.put(b"[")?;
                }
                TokenType::String => {
                    out.put(b"\"")?;
                    out.put(value)?;
                    out.put(b"\"")?;
                }
                TokenType::Null => out.put(b"null")?,
                TokenType::Number | TokenType::Bool => out.put(value)?,
                TokenType::Invalid | TokenType::ObjectEnd | TokenType::ArrayEnd => {}
            }
        }

        prev = Some(token.kind);
    }
    Ok(())
}

pub(crate) fn dump_len(tokens: &[Token], source: &[u8], indent: usize) -> usize {
    let mut measure = Measure::default();
    let Ok(()) = write_tokens(&mut measure, tokens, source, indent);
    measure.len
}

pub(crate) fn dump_string(tokens: &[Token], source: &[u8], indent: usize) -> String {
    let mut buf = Vec::with_capacity(dump_len(tokens, source, indent));
    let Ok(()) = write_tokens(&mut buf, tokens, source, indent);
    match String::from_utf8(buf) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}

/// Diagnostic listing of a token range, one token per line.
///
/// Returned by [`Document::debug_tokens`](crate::Document::debug_tokens).
/// Indices are positions in the shared token table, so a sub-document lists
/// the same indices its tokens have in the root document.
#[derive(Debug, Clone, Copy)]
pub struct TokenTable<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) first: usize,
    pub(crate) source: &'a [u8],
}

struct Link(Option<usize>);

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(index) => fmt::Display::fmt(&index, f),
            None => f.pad("-"),
        }
    }
}

impl fmt::Display for TokenTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (offset, token) in self.tokens.iter().enumerate() {
            write!(
                f,
                "{:<5}{:<11}parent={:<5}end={:<5}children={}",
                self.first + offset,
                token.type_name(),
                Link(token.parent),
                Link(token.end),
                token.child_count,
            )?;
            if let Some(key) = token.key_range() {
                write!(f, " key={:?}", BStr::new(&self.source[key]))?;
            }
            if token.is_leaf() {
                write!(f, " value={:?}", BStr::new(&self.source[token.value_range()]))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::scanner::{count_tokens, parse_into};

    fn tokens_of(src: &[u8]) -> Vec<Token> {
        let mut tokens = vec![Token::default(); count_tokens(src).unwrap()];
        parse_into(src, &mut tokens).unwrap();
        tokens
    }

    #[test]
    fn minified_round_trip() {
        let src = br#"{"a":[1,{"b":null}],"c":{},"d":[],"e":"x\"y","f":true}"#;
        let tokens = tokens_of(src);
        assert_eq!(dump_string(&tokens, src, 0).as_bytes(), src);
        assert_eq!(dump_len(&tokens, src, 0), src.len());
    }

    #[test]
    fn pretty_layout() {
        let src = br#"{"a":[1,{}],"b":{"c":[]}}"#;
        let tokens = tokens_of(src);
        let expected = "{\n  \"a\":[\n    1,\n    {}\n  ],\n  \"b\":{\n    \"c\":[]\n  }\n}";
        assert_eq!(dump_string(&tokens, src, 2), expected);
        assert_eq!(dump_len(&tokens, src, 2), expected.len());
    }

    #[test]
    fn padding_longer_than_the_spaces_table() {
        let src = b"[[1]]";
        let tokens = tokens_of(src);
        let dumped = dump_string(&tokens, src, 40);
        assert_eq!(dump_len(&tokens, src, 40), dumped.len());
        assert!(dumped.contains(&" ".repeat(80)));
    }

    #[test]
    fn fmt_output_writes_the_same_text() {
        let src = br#"{"k":[true,false]}"#;
        let tokens = tokens_of(src);
        let mut text = String::new();
        write_tokens(&mut FmtOutput(&mut text), &tokens, src, 1).unwrap();
        assert_eq!(text, dump_string(&tokens, src, 1));
    }
}
