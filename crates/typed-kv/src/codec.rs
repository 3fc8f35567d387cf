//! Typed value codec
//!
//! Values are stored without a type tag; the reader picks the decoding by
//! naming the target type. Each category has a fixed textual form:
//!
//! | Category | Stored as |
//! |---|---|
//! | `String`, `str`, `Vec<u8>`, `[u8]` | the bytes themselves |
//! | `bool` | `"1"` or `"0"` |
//! | integers | decimal ASCII, `-` for negatives |
//! | `f32`, `f64` | fixed-point with six fractional digits (`1.256` is `"1.256000"`) |
//! | [`Record`] types, [`Json`] | compact JSON from `serde_json` |

use crate::error::{EncodeError, ParseError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::borrow::Cow;

/// A value that can be written under a key.
pub trait Encode {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError>;
}

/// A value that can be read back from stored bytes.
pub trait Decode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self, ParseError>;
}

/// Marks a serde type as a structured record stored as JSON.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use typed_kv::Record;
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// impl Record for User {}
/// ```
pub trait Record: Serialize + DeserializeOwned {}

impl Record for serde_json::Value {}

/// Stores any serde type as JSON without implementing [`Record`] for it.
///
/// Useful for foreign types such as `Vec<T>` or maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Cow<'static, [u8]>, EncodeError> {
    serde_json::to_vec(value)
        .map(Cow::Owned)
        .map_err(|e| EncodeError::new(type_name::<T>(), e.to_string()))
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ParseError> {
    serde_json::from_slice(bytes).map_err(|e| ParseError::new(type_name::<T>(), e.to_string()))
}

impl<T: Record> Encode for T {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        to_json(self)
    }
}

impl<T: Record> Decode for T {
    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        from_json(bytes)
    }
}

impl<T: Serialize> Encode for Json<T> {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        to_json(&self.0)
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        from_json(bytes).map(Json)
    }
}

// String-like values are stored verbatim.

impl Encode for str {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        self.as_str().encode()
    }
}

impl Decode for String {
    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ParseError::new("String", e.to_string()))
    }
}

impl Encode for [u8] {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        Ok(Cow::Borrowed(self))
    }
}

impl Encode for Vec<u8> {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl Decode for Vec<u8> {
    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        Ok(bytes.to_vec())
    }
}

/// Borrows stored bytes as numeric text. An explicit `+` sign is rejected.
fn numeric_text<'a>(bytes: &'a [u8], target: &'static str) -> Result<&'a str, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::new(target, e.to_string()))?;
    if text.starts_with('+') {
        return Err(ParseError::new(target, "unexpected '+' sign"));
    }
    Ok(text)
}

macro_rules! impl_integer {
    ($($t:ty),* $(,)?) => {$(
        impl Encode for $t {
            fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
                Ok(Cow::Owned(self.to_string().into_bytes()))
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
                let target = stringify!($t);
                numeric_text(bytes, target)?
                    .parse::<$t>()
                    .map_err(|e| ParseError::new(target, e.to_string()))
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Fixed-point with six fractional digits, the `printf("%f")` layout.
///
/// This is lossy for very small magnitudes and verbose for large ones, but it
/// is the format existing stores hold, so it must not change.
fn format_fixed(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    format!("{value:.6}")
}

/// Reject text whose value does not fit the target float type.
///
/// The std parser saturates to infinity on overflow and to zero on underflow;
/// both are range errors here.
fn check_float_range(
    text: &str,
    infinite: bool,
    zero: bool,
    target: &'static str,
) -> Result<(), ParseError> {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    if infinite && !unsigned.to_ascii_lowercase().starts_with("inf") {
        return Err(ParseError::new(target, "number too large to fit in target type"));
    }
    let mantissa = unsigned.split(['e', 'E']).next().unwrap_or_default();
    if zero && mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        return Err(ParseError::new(target, "number too small to fit in target type"));
    }
    Ok(())
}

macro_rules! impl_float {
    ($($t:ty),* $(,)?) => {$(
        impl Encode for $t {
            fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
                Ok(Cow::Owned(format_fixed(f64::from(*self)).into_bytes()))
            }
        }

        impl Decode for $t {
            fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
                let target = stringify!($t);
                let text = numeric_text(bytes, target)?;
                let value = text
                    .parse::<$t>()
                    .map_err(|e| ParseError::new(target, e.to_string()))?;
                check_float_range(text, value.is_infinite(), value == 0.0, target)?;
                Ok(value)
            }
        }
    )*};
}

impl_float!(f32, f64);

impl Encode for bool {
    fn encode(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
        Ok(Cow::Borrowed(if *self { &b"1"[..] } else { &b"0"[..] }))
    }
}

impl Decode for bool {
    /// Any `u8` in decimal is accepted; nonzero reads as `true`.
    fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        u8::decode(bytes)
            .map(|v| v != 0)
            .map_err(|e| ParseError::new("bool", e.reason()))
    }
}
