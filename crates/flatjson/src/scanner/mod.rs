//! Recursive-descent scanner shared by the counting and parse passes.
//!
//! The grammar is written once against [`TokenSink`]. Running it with a
//! [`Counter`] sizes the token table; running it with a [`Writer`] fills a
//! table of that size. Both passes make the same decisions on the same bytes,
//! so a successful count guarantees the parse pass never runs out of slots.
//!
//! Nested containers do not get a wrapper token of their own: the container's
//! opening token carries the member key (inside objects) and the parent link,
//! exactly like a leaf would.
//!
//! Errors are absorbing: the first one aborts the scan and is reported with
//! the byte offset at which it was detected.
//!
//! Each open container costs one level of recursion, so the scanner refuses
//! to open more than `max_depth` of them at once.

mod sink;

use core::ops::{Range, RangeInclusive};

use crate::{
    classify::{
        is_digit, is_hex_digit, is_hex_digit4, is_utf8_continuation, is_whitespace, utf8_char_len,
    },
    error::{ErrorCode, ParseError},
    token::{Token, TokenType},
};

use sink::{Counter, TokenSink, Writer};

/// Nesting depth accepted by [`count_tokens`] and [`parse_into`], and the
/// default of [`DocumentOptions::max_depth`](crate::DocumentOptions::max_depth).
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Runs the counting pass over `src` and returns the number of tokens the
/// document needs.
///
/// # Errors
///
/// Returns [`ErrorCode::Invalid`] or [`ErrorCode::Incomplete`] with the offset
/// of the offending byte, and [`ErrorCode::DepthOverflow`] for containers
/// nested deeper than [`DEFAULT_MAX_DEPTH`]. The other capacity errors are
/// only detected by [`parse_into`].
pub fn count_tokens(src: &[u8]) -> Result<usize, ParseError> {
    count_tokens_with_depth(src, DEFAULT_MAX_DEPTH)
}

/// [`count_tokens`] with an explicit nesting limit.
///
/// # Errors
///
/// As [`count_tokens`], with `max_depth` in place of the default limit.
pub fn count_tokens_with_depth(src: &[u8], max_depth: usize) -> Result<usize, ParseError> {
    let mut scanner = Scanner::new(src, Counter::default(), max_depth);
    scanner.run()?;
    Ok(scanner.sink.count)
}

/// Runs the parse pass over `src`, writing tokens into `tokens`, and returns
/// the number of tokens written.
///
/// `tokens` is normally sized with [`count_tokens`]. Slots past the returned
/// length are left untouched; slots before it are fully overwritten.
///
/// # Errors
///
/// Besides the errors of [`count_tokens`], returns
/// [`ErrorCode::NoFreeTokens`] when `tokens` is too short and the overflow
/// errors when a key, value or child count exceeds its field width.
pub fn parse_into(src: &[u8], tokens: &mut [Token]) -> Result<usize, ParseError> {
    parse_into_with_depth(src, tokens, DEFAULT_MAX_DEPTH)
}

/// [`parse_into`] with an explicit nesting limit.
///
/// # Errors
///
/// As [`parse_into`], with `max_depth` in place of the default limit.
pub fn parse_into_with_depth(
    src: &[u8],
    tokens: &mut [Token],
    max_depth: usize,
) -> Result<usize, ParseError> {
    let mut scanner = Scanner::new(src, Writer::new(tokens), max_depth);
    scanner.run()?;
    Ok(scanner.sink.len)
}

pub(crate) struct Scanner<'src, S> {
    src: &'src [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
    pub(crate) sink: S,
}

impl<'src, S: TokenSink> Scanner<'src, S> {
    pub(crate) fn new(src: &'src [u8], sink: S, max_depth: usize) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
            max_depth,
            sink,
        }
    }

    /// Scans one complete document: a value followed only by whitespace.
    pub(crate) fn run(&mut self) -> Result<(), ParseError> {
        let result = match self.parse_value(None, None) {
            Ok(()) if self.peek().is_some() => Err(ErrorCode::Invalid),
            other => other,
        };
        result.map_err(|code| ParseError::new(code, self.pos))
    }

    /// Skips whitespace and returns the next byte without consuming it.
    #[inline]
    fn peek(&mut self) -> Option<u8> {
        while let Some(&b) = self.src.get(self.pos) {
            if !is_whitespace(b) {
                return Some(b);
            }
            self.pos += 1;
        }
        None
    }

    /// Enters a container, failing once more than `max_depth` are open.
    #[inline]
    fn descend(&mut self) -> Result<(), ErrorCode> {
        if self.depth >= self.max_depth {
            return Err(ErrorCode::DepthOverflow);
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    fn expect(&mut self, expected: u8) -> Result<(), ErrorCode> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(ErrorCode::Invalid),
            None => Err(ErrorCode::Incomplete),
        }
    }

    fn parse_value(
        &mut self,
        key: Option<Range<usize>>,
        parent: Option<usize>,
    ) -> Result<(), ErrorCode> {
        let (kind, value) = match self.peek() {
            Some(b'{') => return self.parse_object(key, parent),
            Some(b'[') => return self.parse_array(key, parent),
            Some(b'"') => (TokenType::String, self.scan_string()?),
            Some(b't') => (TokenType::Bool, self.scan_literal(b"true")?),
            Some(b'f') => (TokenType::Bool, self.scan_literal(b"false")?),
            Some(b'n') => {
                let literal = self.scan_literal(b"null")?;
                (TokenType::Null, literal.start..literal.start)
            }
            Some(b'-' | b'0'..=b'9') => (TokenType::Number, self.scan_number()?),
            Some(_) => return Err(ErrorCode::Invalid),
            None => return Err(ErrorCode::Incomplete),
        };
        self.sink.leaf(kind, key, value, parent)
    }

    fn parse_object(
        &mut self,
        key: Option<Range<usize>>,
        parent: Option<usize>,
    ) -> Result<(), ErrorCode> {
        self.descend()?;
        self.pos += 1;
        let index = self.sink.open(TokenType::Object, key, parent)?;

        if self.peek() == Some(b'}') {
            self.pos += 1;
            self.depth -= 1;
            return self.sink.close(index, TokenType::ObjectEnd);
        }

        loop {
            match self.peek() {
                Some(b'"') => {}
                Some(_) => return Err(ErrorCode::Invalid),
                None => return Err(ErrorCode::Incomplete),
            }
            let member = self.scan_string()?;
            self.expect(b':')?;
            self.parse_value(Some(member), Some(index))?;

            match self.peek() {
                // A `}` right after the comma fails on the key check above.
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(ErrorCode::Invalid),
                None => return Err(ErrorCode::Incomplete),
            }
        }

        self.depth -= 1;
        self.sink.close(index, TokenType::ObjectEnd)
    }

    fn parse_array(
        &mut self,
        key: Option<Range<usize>>,
        parent: Option<usize>,
    ) -> Result<(), ErrorCode> {
        self.descend()?;
        self.pos += 1;
        let index = self.sink.open(TokenType::Array, key, parent)?;

        if self.peek() == Some(b']') {
            self.pos += 1;
            self.depth -= 1;
            return self.sink.close(index, TokenType::ArrayEnd);
        }

        loop {
            self.parse_value(None, Some(index))?;

            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => return Err(ErrorCode::Invalid),
                None => return Err(ErrorCode::Incomplete),
            }
        }

        self.depth -= 1;
        self.sink.close(index, TokenType::ArrayEnd)
    }

    /// Scans `true`, `false` or `null`. The first byte has been peeked.
    ///
    /// A prefix of the literal cut short by the end of input is incomplete.
    fn scan_literal(&mut self, literal: &'static [u8]) -> Result<Range<usize>, ErrorCode> {
        let start = self.pos;
        let available = &self.src[start..];
        let n = literal.len().min(available.len());
        if available[..n] != literal[..n] {
            let mismatch = available.iter().zip(literal).take_while(|(a, b)| a == b).count();
            self.pos = start + mismatch;
            return Err(ErrorCode::Invalid);
        }
        if n < literal.len() {
            self.pos = self.src.len();
            return Err(ErrorCode::Incomplete);
        }
        self.pos = start + literal.len();
        Ok(start..self.pos)
    }

    /// Scans a string and returns the span between its quotes. Escapes are
    /// validated but not decoded.
    fn scan_string(&mut self) -> Result<Range<usize>, ErrorCode> {
        self.pos += 1;
        let start = self.pos;
        loop {
            let Some(&b) = self.src.get(self.pos) else {
                return Err(ErrorCode::Incomplete);
            };
            match b {
                b'"' => {
                    let span = start..self.pos;
                    self.pos += 1;
                    return Ok(span);
                }
                b'\\' => self.scan_escape()?,
                0x00..=0x1F => return Err(ErrorCode::Invalid),
                0x20..=0x7F => self.pos += 1,
                _ => self.scan_utf8(b)?,
            }
        }
    }

    /// Validates the escape sequence starting at the backslash under the
    /// cursor and steps over it.
    fn scan_escape(&mut self) -> Result<(), ErrorCode> {
        match self.src.get(self.pos + 1) {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.pos += 2;
                Ok(())
            }
            Some(b'u') => {
                let digits = self.src.get(self.pos + 2..self.pos + 6);
                match digits.and_then(|d| <&[u8; 4]>::try_from(d).ok()) {
                    Some(d) if is_hex_digit4(d) => {
                        self.pos += 6;
                        Ok(())
                    }
                    Some(_) => Err(ErrorCode::Invalid),
                    None => {
                        let tail = &self.src[self.pos + 2..];
                        if tail.iter().all(|&b| is_hex_digit(b)) {
                            Err(ErrorCode::Incomplete)
                        } else {
                            Err(ErrorCode::Invalid)
                        }
                    }
                }
            }
            Some(_) => Err(ErrorCode::Invalid),
            None => Err(ErrorCode::Incomplete),
        }
    }

    /// Validates the multi-byte UTF-8 sequence led by `lead` and steps over
    /// it. Overlong encodings, surrogates and code points past U+10FFFF are
    /// rejected.
    fn scan_utf8(&mut self, lead: u8) -> Result<(), ErrorCode> {
        let len = utf8_char_len(lead);
        if len == 0 {
            return Err(ErrorCode::Invalid);
        }
        let second: RangeInclusive<u8> = match lead {
            0xE0 => 0xA0..=0xBF,
            0xED => 0x80..=0x9F,
            0xF0 => 0x90..=0xBF,
            0xF4 => 0x80..=0x8F,
            _ => 0x80..=0xBF,
        };
        for i in 1..len {
            match self.src.get(self.pos + i) {
                None => return Err(ErrorCode::Incomplete),
                Some(b) if i == 1 && !second.contains(b) => return Err(ErrorCode::Invalid),
                Some(&b) if !is_utf8_continuation(b) => return Err(ErrorCode::Invalid),
                Some(_) => {}
            }
        }
        self.pos += len;
        Ok(())
    }

    /// Scans a number. Accepts an optional minus, then either a `0x` hex
    /// literal or a decimal literal with optional fraction and exponent. A
    /// leading zero may not be followed by another digit.
    fn scan_number(&mut self) -> Result<Range<usize>, ErrorCode> {
        let start = self.pos;
        if self.src[self.pos] == b'-' {
            self.pos += 1;
        }

        match self.src.get(self.pos) {
            Some(b'0') => match self.src.get(self.pos + 1) {
                Some(b'x') => {
                    self.pos += 2;
                    self.scan_digits(is_hex_digit)?;
                    return Ok(start..self.pos);
                }
                Some(&b) if is_digit(b) => {
                    self.pos += 1;
                    return Err(ErrorCode::Invalid);
                }
                _ => self.pos += 1,
            },
            _ => self.scan_digits(is_digit)?,
        }

        if self.src.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            self.scan_digits(is_digit)?;
        }

        if matches!(self.src.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.src.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.scan_digits(is_digit)?;
        }

        Ok(start..self.pos)
    }

    /// Consumes one or more bytes matching `class`.
    #[inline]
    fn scan_digits(&mut self, class: fn(u8) -> bool) -> Result<(), ErrorCode> {
        match self.src.get(self.pos) {
            Some(&b) if class(b) => {}
            Some(_) => return Err(ErrorCode::Invalid),
            None => return Err(ErrorCode::Incomplete),
        }
        while self.src.get(self.pos).is_some_and(|&b| class(b)) {
            self.pos += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
