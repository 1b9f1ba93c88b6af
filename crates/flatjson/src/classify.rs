//! Byte classification tables used by the scanner.
//!
//! Every predicate is a single lookup into a 256-entry table built at compile
//! time, so the hot loops in the scanner never branch on byte ranges.

const DIGIT: u8 = 0b0000_0001;
const HEX_DIGIT: u8 = 0b0000_0010;
const WHITESPACE: u8 = 0b0000_0100;

const CLASS_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        let mut flags = 0u8;
        if c.is_ascii_digit() {
            flags |= DIGIT | HEX_DIGIT;
        }
        if matches!(c, b'a'..=b'f' | b'A'..=b'F') {
            flags |= HEX_DIGIT;
        }
        if matches!(c, b' ' | b'\t' | b'\n' | b'\r') {
            flags |= WHITESPACE;
        }
        table[i] = flags;
        i += 1;
    }
    table
};

// Length of the UTF-8 sequence introduced by a lead byte; 0 for bytes that
// can never start a well-formed sequence (continuations, overlong 0xC0/0xC1,
// and everything past 0xF4).
const UTF8_LEN_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = match i {
            0x00..=0x7F => 1,
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => 0,
        };
        i += 1;
    }
    table
};

/// Returns `true` for ASCII `0`–`9`.
#[inline]
#[must_use]
pub const fn is_digit(b: u8) -> bool {
    CLASS_TABLE[b as usize] & DIGIT != 0
}

/// Returns `true` for ASCII `0`–`9`, `a`–`f` and `A`–`F`.
#[inline]
#[must_use]
pub const fn is_hex_digit(b: u8) -> bool {
    CLASS_TABLE[b as usize] & HEX_DIGIT != 0
}

/// Returns `true` if all four bytes are hex digits (the payload of a `\uXXXX`
/// escape).
#[inline]
#[must_use]
pub const fn is_hex_digit4(b: &[u8; 4]) -> bool {
    is_hex_digit(b[0]) && is_hex_digit(b[1]) && is_hex_digit(b[2]) && is_hex_digit(b[3])
}

#[inline]
pub(crate) const fn is_whitespace(b: u8) -> bool {
    CLASS_TABLE[b as usize] & WHITESPACE != 0
}

/// Returns the length in bytes (1–4) of the UTF-8 sequence that starts with
/// `lead`, or `0` if `lead` cannot start a well-formed sequence.
#[inline]
#[must_use]
pub const fn utf8_char_len(lead: u8) -> usize {
    UTF8_LEN_TABLE[lead as usize] as usize
}

#[inline]
pub(crate) const fn is_utf8_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}
