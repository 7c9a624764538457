/***************************************************************************************************
 * cbor_canon CBOR value model (spec.md §3, §4.E)
 *
 * A CBOR item may be represented either as a constructed, owned tree or as a borrowed, already
 * validated byte slice (`Serialized`). Every other module in this crate (access, write, compare)
 * must treat both forms uniformly; this module defines the shared tagged union and nothing else.
 **************************************************************************************************/
use crate::constants::*;
use crate::error::CborError;

use std::convert::TryFrom;

/// A single CBOR data item.
///
/// Values obtained by parsing (see [`crate::read`] / [`crate::read_deterministic`]) borrow from
/// the input buffer and are always the `Serialized` variant: decoding into a deep tree happens
/// lazily, one head at a time, through the accessors in [`crate::access`]. Values built directly
/// via the constructors below own their children and may be freely nested, mixing constructed and
/// `Serialized` subtrees (for example, to splice an already-parsed sub-item into a hand-built
/// array without re-encoding it).
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'buf> {
    /// An unsigned (`major = MT_UINT`) or negative (`major = MT_NINT`) integer. The 64-bit payload
    /// is the raw RFC 8949 argument; for negative integers the represented value is `-1 - value`.
    Int64 {
        /// `MT_UINT` or `MT_NINT`.
        major: u8,
        /// The raw (unsigned) argument.
        value: u64,
    },
    /// A byte string (`major = MT_BSTR`) or text string (`major = MT_TSTR`).
    String {
        /// `MT_BSTR` or `MT_TSTR`.
        major: u8,
        /// The string payload. For `MT_TSTR` this is not guaranteed to be valid UTF-8 by this
        /// layer - see [`crate::access::string_as_str`] for a fallible conversion.
        payload: &'buf [u8],
    },
    /// A tagged value: a tag number plus exactly one child item.
    Tagged {
        /// The tag number.
        tag: u64,
        /// The tagged item. Owned: tags exclusively own their payload.
        payload: Box<Value<'buf>>,
    },
    /// An array of items, in encoding order.
    Array {
        /// The array's elements.
        items: Vec<Value<'buf>>,
    },
    /// A map of (key, value) pairs, in encoding order. Order is never imposed by this type; the
    /// deterministic-encoding ordering requirement is enforced only by the validator's strict mode
    /// (spec.md §4.D) and is merely checked, never fixed up, by the writer (spec.md §5).
    Map {
        /// The map's entries.
        entries: Vec<(Value<'buf>, Value<'buf>)>,
    },
    /// A simple value or the one-byte form of a float-family byte (major 7). Reserved arguments
    /// 24..=31 can never appear here - see [`Value::simple`].
    SimpleValue(u8),
    /// Already-validated bytes comprising exactly one complete data item, read from the input
    /// buffer without copying. Re-validating `bytes` under the same strictness it was parsed with
    /// is guaranteed to succeed.
    Serialized {
        /// The raw encoded bytes of the item.
        bytes: &'buf [u8],
        /// Cached length of `bytes`, equal to `bytes.len()`.
        size: usize,
    },
}

impl<'buf> Value<'buf> {
    /// Construct an unsigned integer value.
    #[inline]
    pub fn uint(value: u64) -> Self {
        Value::Int64 { major: MT_UINT, value }
    }

    /// Construct a negative integer value. `value` is the raw CBOR argument: the represented
    /// number is `-1 - value`.
    #[inline]
    pub fn nint(value: u64) -> Self {
        Value::Int64 { major: MT_NINT, value }
    }

    /// Construct a byte-string value borrowing `payload`.
    #[inline]
    pub fn bstr(payload: &'buf [u8]) -> Self {
        Value::String { major: MT_BSTR, payload }
    }

    /// Construct a text-string value borrowing `payload`.
    #[inline]
    pub fn tstr(payload: &'buf str) -> Self {
        Value::String { major: MT_TSTR, payload: payload.as_bytes() }
    }

    /// Construct a tagged value.
    #[inline]
    pub fn tagged(tag: u64, payload: Value<'buf>) -> Self {
        Value::Tagged { tag, payload: Box::new(payload) }
    }

    /// Construct an array value.
    #[inline]
    pub fn array(items: Vec<Value<'buf>>) -> Self {
        Value::Array { items }
    }

    /// Construct a map value. Entry order is preserved exactly as given.
    #[inline]
    pub fn map(entries: Vec<(Value<'buf>, Value<'buf>)>) -> Self {
        Value::Map { entries }
    }

    /// Construct a simple value. Fails with `ConstraintFailed` for the reserved range `24..=31`
    /// (RFC 8949 §3.3).
    pub fn simple(v: u8) -> Result<Self, CborError> {
        if (24..32).contains(&v) {
            Err(CborError::ConstraintFailed { reason: "simple value argument in reserved range 24..=31" })
        } else {
            Ok(Value::SimpleValue(v))
        }
    }

    /// Wrap an already-validated byte slice as a `Serialized` value without re-validating it.
    /// Used internally by the validator/reader and by any caller who has independently proven
    /// `bytes` is a single well-formed item.
    #[inline]
    pub fn from_validated_bytes(bytes: &'buf [u8]) -> Self {
        Value::Serialized { bytes, size: bytes.len() }
    }

    /// The major type of this value (top 3 bits, still in bit position, i.e. one of the `MT_*`
    /// constants), re-reading the head if this is a `Serialized` value.
    pub fn major_type(&self) -> u8 {
        match self {
            Value::Int64 { major, .. } => *major,
            Value::String { major, .. } => *major,
            Value::Tagged { .. } => MT_TAG,
            Value::Array { .. } => MT_ARRAY,
            Value::Map { .. } => MT_MAP,
            Value::SimpleValue(_) => MT_SIMPLE,
            Value::Serialized { bytes, .. } => major_type(bytes[0]),
        }
    }
}

/***************************************************************************************************
 * Standard trait implementations: infallible conversions INTO Value.
 **************************************************************************************************/

impl<'buf> From<bool> for Value<'buf> {
    #[inline]
    fn from(v: bool) -> Self {
        Value::SimpleValue(if v { 21 } else { 20 })
    }
}

impl<'buf> From<u8> for Value<'buf> {
    #[inline]
    fn from(v: u8) -> Self {
        Value::uint(v as u64)
    }
}

impl<'buf> From<u16> for Value<'buf> {
    #[inline]
    fn from(v: u16) -> Self {
        Value::uint(v as u64)
    }
}

impl<'buf> From<u32> for Value<'buf> {
    #[inline]
    fn from(v: u32) -> Self {
        Value::uint(v as u64)
    }
}

impl<'buf> From<u64> for Value<'buf> {
    #[inline]
    fn from(v: u64) -> Self {
        Value::uint(v)
    }
}

impl<'buf> From<i64> for Value<'buf> {
    #[inline]
    fn from(v: i64) -> Self {
        if v < 0 {
            Value::nint((-1 - v) as u64)
        } else {
            Value::uint(v as u64)
        }
    }
}

impl<'buf> From<i32> for Value<'buf> {
    #[inline]
    fn from(v: i32) -> Self {
        Value::from(v as i64)
    }
}

impl<'buf> From<&'buf str> for Value<'buf> {
    #[inline]
    fn from(v: &'buf str) -> Self {
        Value::tstr(v)
    }
}

impl<'buf> From<&'buf [u8]> for Value<'buf> {
    #[inline]
    fn from(v: &'buf [u8]) -> Self {
        Value::bstr(v)
    }
}

/***************************************************************************************************
 * Standard trait implementations: fallible conversions FROM Value.
 *
 * Each of these also accepts a `Serialized` value, delegating to the matching `crate::access`
 * function to read through the head rather than requiring the caller to decode first - the same
 * "works uniformly on both representations" rule every other operation in this crate follows.
 **************************************************************************************************/

impl<'buf> TryFrom<Value<'buf>> for bool {
    type Error = CborError;

    fn try_from(v: Value<'buf>) -> Result<Self, Self::Error> {
        match crate::access::simple_value(&v)? {
            20 => Ok(false),
            21 => Ok(true),
            _ => Err(CborError::IncompatibleType),
        }
    }
}

macro_rules! impl_try_from_unsigned {
    ($t:ty) => {
        impl<'buf> TryFrom<Value<'buf>> for $t {
            type Error = CborError;

            fn try_from(v: Value<'buf>) -> Result<Self, Self::Error> {
                match crate::access::int64_parts(&v)? {
                    (MT_UINT, value) if value <= <$t>::MAX as u64 => Ok(value as $t),
                    (MT_UINT, _) => Err(CborError::OutOfRange),
                    _ => Err(CborError::IncompatibleType),
                }
            }
        }
    };
}

impl_try_from_unsigned!(u8);
impl_try_from_unsigned!(u16);
impl_try_from_unsigned!(u32);

impl<'buf> TryFrom<Value<'buf>> for u64 {
    type Error = CborError;

    fn try_from(v: Value<'buf>) -> Result<Self, Self::Error> {
        match crate::access::int64_parts(&v)? {
            (MT_UINT, value) => Ok(value),
            _ => Err(CborError::IncompatibleType),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for i64 {
    type Error = CborError;

    fn try_from(v: Value<'buf>) -> Result<Self, Self::Error> {
        match crate::access::int64_parts(&v)? {
            (MT_UINT, value) if value <= i64::MAX as u64 => Ok(value as i64),
            (MT_UINT, _) => Err(CborError::OutOfRange),
            (MT_NINT, value) if value <= i64::MAX as u64 => Ok(-1 - value as i64),
            (MT_NINT, _) => Err(CborError::OutOfRange),
            _ => Err(CborError::IncompatibleType),
        }
    }
}

impl<'buf> TryFrom<Value<'buf>> for &'buf [u8] {
    type Error = CborError;

    fn try_from(v: Value<'buf>) -> Result<Self, Self::Error> {
        match crate::access::string_parts(&v)? {
            (MT_BSTR, payload) => Ok(payload),
            _ => Err(CborError::IncompatibleType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_roundtrips_through_try_from() {
        let v = Value::uint(42);
        assert_eq!(u64::try_from(v.clone()).unwrap(), 42);
        assert_eq!(u8::try_from(v).unwrap(), 42);
    }

    #[test]
    fn nint_converts_to_i64() {
        let v = Value::nint(0); // represents -1
        assert_eq!(i64::try_from(v).unwrap(), -1);
        let v = Value::from(-5i64);
        assert_eq!(i64::try_from(v).unwrap(), -5);
    }

    #[test]
    fn bool_roundtrips() {
        assert_eq!(bool::try_from(Value::from(true)).unwrap(), true);
        assert_eq!(bool::try_from(Value::from(false)).unwrap(), false);
    }

    #[test]
    fn simple_rejects_reserved_range() {
        assert!(Value::simple(24).is_err());
        assert!(Value::simple(31).is_err());
        assert!(Value::simple(23).is_ok());
        assert!(Value::simple(32).is_ok());
    }

    #[test]
    fn major_type_of_serialized_reads_through() {
        let bytes = [0x83u8, 1, 2, 3];
        let v = Value::from_validated_bytes(&bytes);
        assert_eq!(v.major_type(), MT_ARRAY);
    }
}
