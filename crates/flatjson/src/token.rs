//! The flat token table.
//!
//! A parsed document is a `Vec<Token>` in document order. Containers are
//! followed by their descendants and closed by a matching end marker, whose
//! index the opener stores in `end`. All links are indices into the same
//! vector and all text is a [`Span`] into the source bytes.

use core::ops::Range;

/// Width of a key length. Keys of `KeyLen::MAX` bytes or more are rejected.
pub type KeyLen = u8;
/// Width of a value length. Values of `ValueLen::MAX` bytes or more are
/// rejected.
pub type ValueLen = u32;
/// Width of a container's child count. The count includes the end marker and
/// cannot exceed `ChildCount::MAX`.
pub type ChildCount = u16;

/// The type tag of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TokenType {
    /// An unfilled slot, or the root of a document that failed to load.
    #[default]
    Invalid = 0,
    /// A string; the value span excludes the quotes.
    String,
    /// A number, verbatim.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`.
    Null,
    /// The opening of an object.
    Object,
    /// The marker closing an object.
    ObjectEnd,
    /// The opening of an array.
    Array,
    /// The marker closing an array.
    ArrayEnd,
}

const LEAF_TABLE: [bool; 9] = [false, true, true, true, true, false, false, false, false];

impl TokenType {
    /// Upper-case name of the type, e.g. `"OBJECT_END"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::Object => "OBJECT",
            Self::ObjectEnd => "OBJECT_END",
            Self::Array => "ARRAY",
            Self::ArrayEnd => "ARRAY_END",
        }
    }

    /// Returns `true` for `String`, `Number`, `Bool` and `Null`.
    #[inline]
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        LEAF_TABLE[self as usize]
    }

    /// Returns `true` for `Object` and `Array`.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Returns `true` for `ObjectEnd` and `ArrayEnd`.
    #[inline]
    #[must_use]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::ObjectEnd | Self::ArrayEnd)
    }
}

/// A byte range `start..start + len` into the source, with the length stored
/// in a fixed-width integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span<L> {
    /// Offset of the first byte.
    pub start: usize,
    /// Number of bytes.
    pub len: L,
}

macro_rules! impl_span_len {
    ($($len:ty),*) => {$(
        impl Span<$len> {
            /// The span as a `Range` of byte offsets.
            #[inline]
            #[must_use]
            #[allow(clippy::cast_possible_truncation)]
            pub fn range(&self) -> Range<usize> {
                self.start..self.start + self.len as usize
            }

            /// Returns `true` if the span covers no bytes.
            #[inline]
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.len == 0
            }
        }
    )*};
}

impl_span_len!(KeyLen, ValueLen);

/// One record of the flat token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Token {
    pub(crate) kind: TokenType,
    pub(crate) key: Option<Span<KeyLen>>,
    pub(crate) value: Span<ValueLen>,
    pub(crate) parent: Option<usize>,
    pub(crate) child_count: ChildCount,
    pub(crate) end: Option<usize>,
}

impl Token {
    /// The type tag.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TokenType {
        self.kind
    }

    /// Upper-case name of the type tag.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns `true` unless the slot is [`TokenType::Invalid`].
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.kind != TokenType::Invalid
    }

    /// Returns `true` for leaf tokens.
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// The key span, present only for members of an object.
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<Span<KeyLen>> {
        self.key
    }

    /// Byte range of the key in the source.
    #[inline]
    #[must_use]
    pub fn key_range(&self) -> Option<Range<usize>> {
        self.key.map(|k| k.range())
    }

    /// The raw value span. Empty for containers and end markers.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Span<ValueLen> {
        self.value
    }

    /// Byte range of the raw value in the source.
    #[inline]
    #[must_use]
    pub fn value_range(&self) -> Range<usize> {
        self.value.range()
    }

    /// Index of the enclosing container, `None` for the root.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Number of direct children of a container, counting its end marker.
    #[inline]
    #[must_use]
    pub fn child_count(&self) -> ChildCount {
        self.child_count
    }

    /// Index of the matching end marker of a container.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Index one past the last token of the subtree rooted at `index`.
    #[inline]
    pub(crate) fn subtree_end(&self, index: usize) -> usize {
        match self.end {
            Some(end) => end + 1,
            None => index + 1,
        }
    }
}
