//! Conversions from the raw text of a scalar token.
//!
//! Values are stored verbatim, so conversions work on whatever the source
//! contains: a number token, a quoted number inside a string (common in
//! exchange payloads), a bool, or the empty text of `null`. String escapes are
//! never decoded.

use alloc::string::String;

use bstr::BStr;

use crate::error::ConversionError;

/// Types that can be produced from the raw bytes of a scalar token.
pub trait FromScalar<'src>: Sized {
    /// Converts the raw value text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the text is not a valid
    /// representation of `Self`.
    fn from_scalar(raw: &'src [u8]) -> Result<Self, ConversionError>;
}

impl<'src> FromScalar<'src> for &'src [u8] {
    fn from_scalar(raw: &'src [u8]) -> Result<Self, ConversionError> {
        Ok(raw)
    }
}

impl<'src> FromScalar<'src> for &'src BStr {
    fn from_scalar(raw: &'src [u8]) -> Result<Self, ConversionError> {
        Ok(BStr::new(raw))
    }
}

impl<'src> FromScalar<'src> for &'src str {
    fn from_scalar(raw: &'src [u8]) -> Result<Self, ConversionError> {
        core::str::from_utf8(raw).map_err(|_| ConversionError::InvalidUtf8)
    }
}

impl FromScalar<'_> for String {
    fn from_scalar(raw: &[u8]) -> Result<Self, ConversionError> {
        <&str>::from_scalar(raw).map(String::from)
    }
}

impl FromScalar<'_> for bool {
    fn from_scalar(raw: &[u8]) -> Result<Self, ConversionError> {
        match raw {
            b"true" => Ok(true),
            b"false" => Ok(false),
            _ => Err(ConversionError::InvalidBool),
        }
    }
}

/// Bytes that may appear in a decimal number literal. `fast_float2` also
/// accepts `inf`, `infinity` and `nan`, which are not JSON numbers.
fn is_decimal_text(raw: &[u8]) -> bool {
    raw.iter()
        .all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'))
}

macro_rules! impl_from_scalar_float {
    ($($ty:ty),*) => {$(
        impl FromScalar<'_> for $ty {
            fn from_scalar(raw: &[u8]) -> Result<Self, ConversionError> {
                if !is_decimal_text(raw) {
                    return Err(ConversionError::InvalidFloat);
                }
                fast_float2::parse(raw).map_err(|_| ConversionError::InvalidFloat)
            }
        }
    )*};
}

impl_from_scalar_float!(f32, f64);

/// Splits an integer literal into its sign and magnitude.
///
/// Accepts an optional `-`, then either decimal digits or `0x` followed by
/// hex digits.
fn parse_magnitude(raw: &[u8]) -> Result<(bool, u64), ConversionError> {
    let (negative, digits) = match raw.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, raw),
    };
    let (radix, digits) = match digits.strip_prefix(b"0x") {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if digits.is_empty() {
        return Err(ConversionError::InvalidInteger);
    }

    let mut magnitude: u64 = 0;
    for &b in digits {
        let digit = char::from(b)
            .to_digit(radix)
            .ok_or(ConversionError::InvalidInteger)?;
        magnitude = magnitude
            .checked_mul(u64::from(radix))
            .and_then(|m| m.checked_add(u64::from(digit)))
            .ok_or(ConversionError::IntegerOverflow)?;
    }
    Ok((negative, magnitude))
}

macro_rules! impl_from_scalar_unsigned {
    ($($ty:ty),*) => {$(
        impl FromScalar<'_> for $ty {
            fn from_scalar(raw: &[u8]) -> Result<Self, ConversionError> {
                match parse_magnitude(raw)? {
                    (true, m) if m != 0 => Err(ConversionError::IntegerOverflow),
                    (_, m) => <$ty>::try_from(m).map_err(|_| ConversionError::IntegerOverflow),
                }
            }
        }
    )*};
}

macro_rules! impl_from_scalar_signed {
    ($($ty:ty),*) => {$(
        impl FromScalar<'_> for $ty {
            fn from_scalar(raw: &[u8]) -> Result<Self, ConversionError> {
                let (negative, magnitude) = parse_magnitude(raw)?;
                let value = if negative {
                    0i64.checked_sub_unsigned(magnitude)
                } else {
                    i64::try_from(magnitude).ok()
                };
                value
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or(ConversionError::IntegerOverflow)
            }
        }
    )*};
}

impl_from_scalar_unsigned!(u8, u16, u32, u64, usize);
impl_from_scalar_signed!(i8, i16, i32, i64, isize);
