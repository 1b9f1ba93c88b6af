//! The [`Document`] handle: a range of a shared token table plus the source
//! bytes it points into.

use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;

use bstr::BStr;
use tracing::{debug, trace};

use crate::{
    convert::FromScalar,
    dump::{self, FmtOutput, TokenTable},
    error::{ConversionError, ErrorCode, LookupError, ParseError},
    options::DocumentOptions,
    scanner::{count_tokens_with_depth, parse_into_with_depth},
    token::{Token, TokenType},
};

/// Parses `src` into a new document.
///
/// Parse failures are recorded on the returned document; check
/// [`Document::is_valid`] or [`Document::parse_error`].
#[must_use]
pub fn parse(src: &[u8]) -> Document<'_> {
    Document::from_slice(src)
}

/// Parses a string slice into a new document.
#[must_use]
pub fn parse_str(src: &str) -> Document<'_> {
    Document::from_slice(src.as_bytes())
}

/// A parsed JSON document, or a sub-document of one.
///
/// A document covers a contiguous range of a token table shared through an
/// [`Arc`]. Lookups such as [`at`](Self::at) return new handles over a
/// narrower range of the same table; no tokens are copied. The source bytes
/// are borrowed for `'src` and every key and value is a view into them.
///
/// A container's range includes its end marker.
#[derive(Clone)]
pub struct Document<'src> {
    source: &'src [u8],
    tokens: Arc<Vec<Token>>,
    begin: usize,
    end: usize,
    error: Option<ParseError>,
    options: DocumentOptions,
}

impl Default for Document<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("kind", &self.kind())
            .field("range", &(self.begin..self.end))
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<'src> Document<'src> {
    /// An empty document with no storage reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// An empty document with `reserve` token slots reserved. Loads into it
    /// run a single parse pass.
    #[must_use]
    pub fn with_capacity(reserve: usize) -> Self {
        Self::with_options(DocumentOptions::with_reserve(reserve))
    }

    /// An empty document using `options`.
    #[must_use]
    pub fn with_options(options: DocumentOptions) -> Self {
        Self {
            source: &[],
            tokens: Arc::new(Vec::with_capacity(options.reserve)),
            begin: 0,
            end: 0,
            error: None,
            options,
        }
    }

    /// Parses `src` into a new document. Failures are recorded on the
    /// document rather than returned.
    #[must_use]
    pub fn from_slice(src: &'src [u8]) -> Self {
        let mut doc = Self::new();
        // The error stays recorded on the document.
        let _ = doc.load(src);
        doc
    }

    /// Replaces the contents of this document by parsing `src`.
    ///
    /// The token storage is reused when this handle is its only owner;
    /// otherwise fresh storage is allocated and other handles keep seeing the
    /// old document.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] that stopped the scan. The error is also
    /// recorded on the document, which becomes invalid.
    pub fn load(&mut self, src: &'src [u8]) -> Result<(), ParseError> {
        self.source = src;
        self.begin = 0;
        self.end = 0;
        self.error = None;

        let options = self.options;
        let storage = self.storage_mut();
        let result = if options.single_pass() {
            storage.resize(options.reserve, Token::default());
            parse_into_with_depth(src, storage, options.max_depth)
        } else {
            count_tokens_with_depth(src, options.max_depth).and_then(|count| {
                trace!("counted {count} tokens in {} bytes", src.len());
                storage.resize(count, Token::default());
                parse_into_with_depth(src, storage, options.max_depth)
            })
        };

        match result {
            Ok(len) => {
                if options.shrink_to_fit {
                    storage.truncate(len);
                    storage.shrink_to_fit();
                }
                trace!("parsed {len} tokens");
                self.end = len;
                Ok(())
            }
            Err(err) => {
                debug!("failed to load document: {err}");
                self.error = Some(err);
                Err(err)
            }
        }
    }

    /// Drops the parsed contents, keeping the allocated storage when it is
    /// not shared.
    pub fn clear(&mut self) {
        self.source = &[];
        self.begin = 0;
        self.end = 0;
        self.error = None;
        self.storage_mut().clear();
    }

    fn storage_mut(&mut self) -> &mut Vec<Token> {
        if Arc::get_mut(&mut self.tokens).is_none() {
            trace!("token storage is shared, detaching");
            self.tokens = Arc::new(Vec::with_capacity(self.options.reserve));
        }
        Arc::make_mut(&mut self.tokens)
    }

    /// A handle over the subtree rooted at `index`.
    fn sub(&self, index: usize) -> Self {
        Self {
            source: self.source,
            tokens: Arc::clone(&self.tokens),
            begin: index,
            end: self.tokens[index].subtree_end(index),
            error: None,
            options: self.options,
        }
    }

    fn root(&self) -> Option<&Token> {
        if self.begin < self.end {
            self.tokens.get(self.begin)
        } else {
            None
        }
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    /// Returns `true` if the last load succeeded and the document covers at
    /// least one token.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.begin < self.end
    }

    /// The kind of error recorded by the last load.
    #[must_use]
    pub fn error(&self) -> Option<ErrorCode> {
        self.error.map(|e| e.code)
    }

    /// The error recorded by the last load, with its byte offset.
    #[must_use]
    pub fn parse_error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Upper-case name of the recorded error, or `"OK"`.
    #[must_use]
    pub fn error_string(&self) -> &'static str {
        self.error.map_or("OK", |e| e.code.as_str())
    }

    /// Number of members of an object or elements of an array; `1` for a
    /// scalar and `0` for an invalid or empty document.
    #[must_use]
    pub fn size(&self) -> usize {
        match self.root() {
            Some(t) if t.kind.is_container() => usize::from(t.child_count).saturating_sub(1),
            Some(t) if t.is_leaf() => 1,
            _ => 0,
        }
    }

    /// Returns `true` if [`size`](Self::size) is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of tokens covered by this handle, end markers included.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.end - self.begin
    }

    /// Type of the root token; [`TokenType::Invalid`] for an empty document.
    #[must_use]
    pub fn kind(&self) -> TokenType {
        self.root().map_or(TokenType::Invalid, Token::kind)
    }

    /// Upper-case name of [`kind`](Self::kind).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns `true` if the root is an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.kind() == TokenType::Array
    }

    /// Returns `true` if the root is an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind() == TokenType::Object
    }

    /// Returns `true` if the root is a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.kind() == TokenType::String
    }

    /// Returns `true` if the root is a number.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.kind() == TokenType::Number
    }

    /// Returns `true` if the root is `true` or `false`.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.kind() == TokenType::Bool
    }

    /// Returns `true` if the root is `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.kind() == TokenType::Null
    }

    /// Returns `true` if the root is a string, number, bool or null.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    /// The raw key of the root token when it is a member of an object.
    #[must_use]
    pub fn key(&self) -> Option<&'src BStr> {
        let range = self.root()?.key_range()?;
        Some(BStr::new(&self.source[range]))
    }

    // ---------------------------------------------------------------------
    // Conversions
    // ---------------------------------------------------------------------

    /// Raw value text of the root token. Empty for `null` and for an empty
    /// document.
    #[track_caller]
    fn scalar(&self) -> &'src [u8] {
        match self.root() {
            Some(t) if t.is_leaf() => &self.source[t.value_range()],
            Some(t) => panic!("cannot convert {} to a scalar", t.type_name()),
            None => &[],
        }
    }

    /// Converts the raw value text of the root token to `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the text does not represent a `T`.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to<T: FromScalar<'src>>(&self) -> Result<T, ConversionError> {
        T::from_scalar(self.scalar())
    }

    /// The raw value text as a byte string. String escapes are not decoded.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[must_use]
    #[track_caller]
    pub fn to_bstr(&self) -> &'src BStr {
        BStr::new(self.scalar())
    }

    /// The raw value text as UTF-8. String escapes are not decoded.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidUtf8`] if the text is not UTF-8.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_str(&self) -> Result<&'src str, ConversionError> {
        self.to()
    }

    /// The raw value text as an owned `String`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidUtf8`] if the text is not UTF-8.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_string_value(&self) -> Result<String, ConversionError> {
        self.to()
    }

    /// Interprets the value as `true` or `false`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidBool`] for any other text.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_bool(&self) -> Result<bool, ConversionError> {
        self.to()
    }

    /// Parses the value as an `i32`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not an integer or does not fit.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_int(&self) -> Result<i32, ConversionError> {
        self.to()
    }

    /// Parses the value as a `u32`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not an integer or does not fit.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_uint(&self) -> Result<u32, ConversionError> {
        self.to()
    }

    /// Parses the value as an `i64`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not an integer or does not fit.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_int64(&self) -> Result<i64, ConversionError> {
        self.to()
    }

    /// Parses the value as a `u64`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not an integer or does not fit.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_uint64(&self) -> Result<u64, ConversionError> {
        self.to()
    }

    /// Parses the value as an `f64`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidFloat`] if the text is not a number.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_double(&self) -> Result<f64, ConversionError> {
        self.to()
    }

    /// Parses the value as an `f32`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidFloat`] if the text is not a number.
    ///
    /// # Panics
    ///
    /// Panics if the root is an object or an array.
    #[track_caller]
    pub fn to_float(&self) -> Result<f32, ConversionError> {
        self.to()
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    /// Checks that the root has type `expected`. An empty document passes
    /// and simply has no children.
    #[track_caller]
    fn require(&self, expected: TokenType) {
        let kind = self.kind();
        assert!(
            kind == expected || kind == TokenType::Invalid,
            "expected {}, found {}",
            expected.name(),
            kind.name()
        );
    }

    fn find_key(&self, key: &[u8]) -> Option<usize> {
        self.child_indices().find(|&i| {
            self.tokens[i]
                .key_range()
                .is_some_and(|range| &self.source[range] == key)
        })
    }

    /// Indices of the direct children, skipping over nested subtrees.
    fn child_indices(&self) -> ChildIndices<'_> {
        let stop = self.root().and_then(Token::end).unwrap_or(self.begin);
        ChildIndices {
            tokens: self.tokens.as_slice(),
            next: self.begin + 1,
            stop,
        }
    }

    /// Returns `true` if the object has a member named `key`.
    ///
    /// # Panics
    ///
    /// Panics if the root is a valid token other than an object.
    #[must_use]
    #[track_caller]
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.require(TokenType::Object);
        self.find_key(key.as_ref()).is_some()
    }

    /// The member named `key`. Keys compare byte for byte against the raw,
    /// still-escaped key text; the first match wins.
    ///
    /// # Errors
    ///
    /// [`LookupError::KeyNotFound`] if there is no such member.
    ///
    /// # Panics
    ///
    /// Panics if the root is a valid token other than an object.
    #[track_caller]
    pub fn at(&self, key: impl AsRef<[u8]>) -> Result<Self, LookupError> {
        self.require(TokenType::Object);
        self.find_key(key.as_ref())
            .map(|i| self.sub(i))
            .ok_or(LookupError::KeyNotFound)
    }

    /// Like [`at`](Self::at), returning `None` on a miss.
    ///
    /// # Panics
    ///
    /// Panics if the root is a valid token other than an object.
    #[must_use]
    #[track_caller]
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Self> {
        self.at(key).ok()
    }

    /// The array element at `index`.
    ///
    /// # Errors
    ///
    /// [`LookupError::IndexOutOfRange`] if the array is too short.
    ///
    /// # Panics
    ///
    /// Panics if the root is a valid token other than an array.
    #[track_caller]
    pub fn at_index(&self, index: usize) -> Result<Self, LookupError> {
        self.require(TokenType::Array);
        self.child_indices()
            .nth(index)
            .map(|i| self.sub(i))
            .ok_or_else(|| LookupError::IndexOutOfRange {
                index,
                len: self.size(),
            })
    }

    /// Like [`at_index`](Self::at_index), returning `None` on a miss.
    ///
    /// # Panics
    ///
    /// Panics if the root is a valid token other than an array.
    #[must_use]
    #[track_caller]
    pub fn get_index(&self, index: usize) -> Option<Self> {
        self.at_index(index).ok()
    }

    /// The direct children of an object or array, in document order. Empty
    /// for scalars.
    #[must_use]
    pub fn children(&self) -> Children<'_, 'src> {
        Children {
            doc: self,
            indices: self.child_indices(),
        }
    }

    /// The raw keys of an object's members, in document order. Empty for
    /// anything but an object.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, 'src> {
        Keys {
            source: self.source,
            indices: self.child_indices(),
        }
    }

    /// The tokens covered by this handle. Parent and end links inside are
    /// indices into the root document's table.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens[self.begin..self.end]
    }

    /// The source bytes the document was parsed from.
    #[must_use]
    pub fn source(&self) -> &'src [u8] {
        self.source
    }

    // ---------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------

    /// Serializes the document. `indent == 0` produces minified output;
    /// otherwise members and elements go on separate lines indented by
    /// `indent` spaces per level.
    #[must_use]
    pub fn dump(&self, indent: usize) -> String {
        dump::dump_string(self.tokens(), self.source, indent)
    }

    /// Length in bytes of [`dump`](Self::dump) with the same `indent`,
    /// computed without allocating.
    #[must_use]
    pub fn dump_len(&self, indent: usize) -> usize {
        dump::dump_len(self.tokens(), self.source, indent)
    }

    /// Serializes the document into a [`fmt::Write`].
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn dump_to<W: fmt::Write + ?Sized>(&self, out: &mut W, indent: usize) -> fmt::Result {
        dump::write_tokens(&mut FmtOutput(out), self.tokens(), self.source, indent)
    }

    /// Serializes the document into an [`std::io::Write`].
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    #[cfg(feature = "std")]
    pub fn write_to<W: std::io::Write>(&self, out: W, indent: usize) -> std::io::Result<()> {
        dump::write_tokens(&mut dump::IoOutput(out), self.tokens(), self.source, indent)
    }

    /// A printable table of the tokens covered by this handle.
    #[must_use]
    pub fn debug_tokens(&self) -> TokenTable<'_> {
        TokenTable {
            tokens: self.tokens(),
            first: self.begin,
            source: self.source,
        }
    }

    /// Panics unless the covered tokens obey the table's structural rules:
    /// parent links follow nesting, only object members carry keys, and every
    /// opener's `end` and child count match its contents.
    #[cfg(any(test, feature = "fuzzing"))]
    #[doc(hidden)]
    #[track_caller]
    pub fn assert_well_formed(&self) {
        let mut open: Vec<usize> = Vec::new();
        for (offset, token) in self.tokens().iter().enumerate() {
            let index = self.begin + offset;
            if offset > 0 {
                assert_eq!(token.parent, open.last().copied(), "parent of token {index}");
                let in_object = token
                    .parent
                    .is_some_and(|p| self.tokens[p].kind == TokenType::Object);
                assert_eq!(
                    token.key.is_some(),
                    in_object && !token.kind.is_end(),
                    "key of token {index}"
                );
            }
            if token.kind.is_container() {
                open.push(index);
            } else if token.kind.is_end() {
                let opener = open.pop().expect("end marker without an opener");
                assert_eq!(self.tokens[opener].end, Some(index), "end of token {opener}");
                let children = self.sub(opener).child_indices().count() + 1;
                assert_eq!(
                    usize::from(self.tokens[opener].child_count),
                    children,
                    "child count of token {opener}"
                );
            }
        }
        assert!(open.is_empty(), "unclosed containers {open:?}");
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump_to(f, 0)
    }
}

#[derive(Debug, Clone)]
struct ChildIndices<'a> {
    tokens: &'a [Token],
    next: usize,
    stop: usize,
}

impl Iterator for ChildIndices<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next >= self.stop {
            return None;
        }
        let index = self.next;
        self.next = self.tokens[index].subtree_end(index);
        Some(index)
    }
}

/// Iterator over the direct children of a document. See
/// [`Document::children`].
#[derive(Debug, Clone)]
pub struct Children<'a, 'src> {
    doc: &'a Document<'src>,
    indices: ChildIndices<'a>,
}

impl<'src> Iterator for Children<'_, 'src> {
    type Item = Document<'src>;

    fn next(&mut self) -> Option<Document<'src>> {
        self.indices.next().map(|i| self.doc.sub(i))
    }
}

/// Iterator over the raw member keys of an object. See [`Document::keys`].
#[derive(Debug, Clone)]
pub struct Keys<'a, 'src> {
    source: &'src [u8],
    indices: ChildIndices<'a>,
}

impl<'src> Iterator for Keys<'_, 'src> {
    type Item = &'src BStr;

    fn next(&mut self) -> Option<&'src BStr> {
        let index = self.indices.next()?;
        let range = self.indices.tokens[index].key_range()?;
        Some(BStr::new(&self.source[range]))
    }
}
