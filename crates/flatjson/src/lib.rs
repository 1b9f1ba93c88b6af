//! A flat-token JSON indexer.
//!
//! `flatjson` turns a JSON document into a single contiguous table of
//! [`Token`]s instead of a tree of heap nodes. Parsing runs in two passes over
//! the same grammar: a counting pass that only sizes the table, and a parse
//! pass that fills a table of exactly that size. Containers record the index
//! of their closing marker, so walking the direct children of an object or
//! array skips nested subtrees in one step.
//!
//! Tokens never copy source bytes: keys and values are spans into the input
//! slice, and a [`Document`] borrows that slice for its whole lifetime.
//!
//! ```rust
//! let doc = flatjson::parse(br#"{"a":1,"b":[2,3],"c":"x"}"#);
//! assert!(doc.is_valid());
//! assert_eq!(doc.size(), 3);
//!
//! let b = doc.at("b").unwrap();
//! assert_eq!(b.size(), 2);
//! assert_eq!(b.at_index(1).unwrap().to_int(), Ok(3));
//! assert_eq!(doc.at("c").unwrap().to_str(), Ok("x"));
//! assert!(!doc.contains("z"));
//!
//! assert_eq!(doc.dump(0), r#"{"a":1,"b":[2,3],"c":"x"}"#);
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod classify;
mod convert;
mod document;
mod dump;
mod error;
mod options;
mod scanner;
mod token;

#[cfg(test)]
mod tests;

pub use classify::{is_digit, is_hex_digit, is_hex_digit4, utf8_char_len};
pub use convert::FromScalar;
pub use document::{Children, Document, Keys, parse, parse_str};
pub use dump::TokenTable;
pub use error::{ConversionError, ErrorCode, LookupError, ParseError};
pub use options::DocumentOptions;
pub use scanner::{
    DEFAULT_MAX_DEPTH, count_tokens, count_tokens_with_depth, parse_into, parse_into_with_depth,
};
pub use token::{ChildCount, KeyLen, Span, Token, TokenType, ValueLen};

#[doc(hidden)]
pub use bstr::BStr;
