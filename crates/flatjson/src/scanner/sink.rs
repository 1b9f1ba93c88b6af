//! Token sinks: the only difference between the counting pass and the parse
//! pass.

use core::ops::Range;

use crate::{
    error::ErrorCode,
    token::{ChildCount, KeyLen, Span, Token, TokenType, ValueLen},
};

/// Receives the tokens recognized by the scanner, in document order.
pub(crate) trait TokenSink {
    /// Records the opening of a container and returns its index.
    fn open(
        &mut self,
        kind: TokenType,
        key: Option<Range<usize>>,
        parent: Option<usize>,
    ) -> Result<usize, ErrorCode>;

    /// Records a leaf value.
    fn leaf(
        &mut self,
        kind: TokenType,
        key: Option<Range<usize>>,
        value: Range<usize>,
        parent: Option<usize>,
    ) -> Result<(), ErrorCode>;

    /// Records the end marker of the container opened at `opener`.
    fn close(&mut self, opener: usize, kind: TokenType) -> Result<(), ErrorCode>;
}

/// Counts tokens without storing anything. Never fails.
#[derive(Debug, Default)]
pub(crate) struct Counter {
    pub(crate) count: usize,
}

impl TokenSink for Counter {
    #[inline]
    fn open(
        &mut self,
        _kind: TokenType,
        _key: Option<Range<usize>>,
        _parent: Option<usize>,
    ) -> Result<usize, ErrorCode> {
        let index = self.count;
        self.count += 1;
        Ok(index)
    }

    #[inline]
    fn leaf(
        &mut self,
        _kind: TokenType,
        _key: Option<Range<usize>>,
        _value: Range<usize>,
        _parent: Option<usize>,
    ) -> Result<(), ErrorCode> {
        self.count += 1;
        Ok(())
    }

    #[inline]
    fn close(&mut self, _opener: usize, _kind: TokenType) -> Result<(), ErrorCode> {
        self.count += 1;
        Ok(())
    }
}

/// Fills a caller-provided token slice.
///
/// Every written slot is overwritten in full, so a slice can be reused across
/// loads without clearing it first.
#[derive(Debug)]
pub(crate) struct Writer<'t> {
    tokens: &'t mut [Token],
    pub(crate) len: usize,
}

impl<'t> Writer<'t> {
    pub(crate) fn new(tokens: &'t mut [Token]) -> Self {
        Self { tokens, len: 0 }
    }

    fn take(&mut self, token: Token) -> Result<usize, ErrorCode> {
        let index = self.len;
        let slot = self.tokens.get_mut(index).ok_or(ErrorCode::NoFreeTokens)?;
        *slot = token;
        self.len += 1;
        Ok(index)
    }

    fn adopt(&mut self, parent: usize) -> Result<(), ErrorCode> {
        let count = &mut self.tokens[parent].child_count;
        if *count >= ChildCount::MAX {
            return Err(ErrorCode::ChildCountOverflow);
        }
        *count += 1;
        Ok(())
    }

    fn check_free(&self) -> Result<(), ErrorCode> {
        if self.len < self.tokens.len() {
            Ok(())
        } else {
            Err(ErrorCode::NoFreeTokens)
        }
    }
}

fn key_span(range: Range<usize>) -> Result<Span<KeyLen>, ErrorCode> {
    let len = KeyLen::try_from(range.len())
        .ok()
        .filter(|&len| len < KeyLen::MAX)
        .ok_or(ErrorCode::KeyLenOverflow)?;
    Ok(Span { start: range.start, len })
}

fn value_span(range: Range<usize>) -> Result<Span<ValueLen>, ErrorCode> {
    let len = ValueLen::try_from(range.len())
        .ok()
        .filter(|&len| len < ValueLen::MAX)
        .ok_or(ErrorCode::ValueLenOverflow)?;
    Ok(Span { start: range.start, len })
}

impl TokenSink for Writer<'_> {
    fn open(
        &mut self,
        kind: TokenType,
        key: Option<Range<usize>>,
        parent: Option<usize>,
    ) -> Result<usize, ErrorCode> {
        self.check_free()?;
        if let Some(parent) = parent {
            self.adopt(parent)?;
        }
        let key = key.map(key_span).transpose()?;
        self.take(Token {
            kind,
            key,
            value: Span::default(),
            parent,
            child_count: 0,
            end: None,
        })
    }

    fn leaf(
        &mut self,
        kind: TokenType,
        key: Option<Range<usize>>,
        value: Range<usize>,
        parent: Option<usize>,
    ) -> Result<(), ErrorCode> {
        self.check_free()?;
        if let Some(parent) = parent {
            self.adopt(parent)?;
        }
        let key = key.map(key_span).transpose()?;
        let value = value_span(value)?;
        self.take(Token {
            kind,
            key,
            value,
            parent,
            child_count: 0,
            end: None,
        })?;
        Ok(())
    }

    fn close(&mut self, opener: usize, kind: TokenType) -> Result<(), ErrorCode> {
        self.check_free()?;
        self.adopt(opener)?;
        let end = self.take(Token {
            kind,
            key: None,
            value: Span::default(),
            parent: Some(opener),
            child_count: 0,
            end: None,
        })?;
        self.tokens[opener].end = Some(end);
        Ok(())
    }
}
