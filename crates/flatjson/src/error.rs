use thiserror::Error;

/// The kind of failure reported by a parse.
///
/// `Invalid` and `Incomplete` are grammar errors; the remaining variants are
/// capacity limits of the token table and say nothing about the input's
/// syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorCode {
    /// The input violates the JSON grammar.
    #[error("invalid JSON")]
    Invalid,
    /// The input ended in the middle of a value.
    #[error("unexpected end of input")]
    Incomplete,
    /// The token buffer is smaller than the document requires.
    #[error("no free tokens left in the token buffer")]
    NoFreeTokens,
    /// A key is too long for the key length field.
    #[error("key length overflow")]
    KeyLenOverflow,
    /// A value is too long for the value length field.
    #[error("value length overflow")]
    ValueLenOverflow,
    /// A container has too many children for the child count field.
    #[error("child count overflow")]
    ChildCountOverflow,
    /// Containers are nested deeper than the configured maximum depth.
    #[error("nesting depth overflow")]
    DepthOverflow,
}

impl ErrorCode {
    /// Upper-case name of the error kind, e.g. `"INCOMPLETE"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Incomplete => "INCOMPLETE",
            Self::NoFreeTokens => "NO_FREE_TOKENS",
            Self::KeyLenOverflow => "KLEN_OVERFLOW",
            Self::ValueLenOverflow => "VLEN_OVERFLOW",
            Self::ChildCountOverflow => "CHILDS_OVERFLOW",
            Self::DepthOverflow => "DEPTH_OVERFLOW",
        }
    }

    /// Returns `true` for the errors caused by a fixed-width field, a buffer
    /// or the nesting limit rather than by the input's syntax.
    #[must_use]
    pub const fn is_capacity(self) -> bool {
        matches!(
            self,
            Self::NoFreeTokens
                | Self::KeyLenOverflow
                | Self::ValueLenOverflow
                | Self::ChildCountOverflow
                | Self::DepthOverflow
        )
    }
}

/// A parse failure and the byte offset at which it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{code} at byte {offset}")]
pub struct ParseError {
    /// What went wrong.
    pub code: ErrorCode,
    /// Offset into the source where scanning stopped.
    pub offset: usize,
}

impl ParseError {
    pub(crate) const fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The object has no member with the requested key.
    #[error("key not found")]
    KeyNotFound,
    /// The array has fewer elements than the requested index.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of elements in the array.
        len: usize,
    },
}

/// A scalar value whose text cannot be represented as the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The text is not an integer literal.
    #[error("not an integer")]
    InvalidInteger,
    /// The integer does not fit the target type.
    #[error("integer out of range for target type")]
    IntegerOverflow,
    /// The text is not a floating point literal.
    #[error("not a number")]
    InvalidFloat,
    /// The text is neither `true` nor `false`.
    #[error("not a boolean")]
    InvalidBool,
    /// The text is not valid UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
