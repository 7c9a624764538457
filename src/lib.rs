/***************************************************************************************************
 * cbor_canon crate definition
 *
 * A CBOR (RFC 8949) codec built around a single idea: a data item can be worked with either as a
 * constructed, owned tree or as an already-validated, borrowed byte slice, and every operation in
 * this crate - accessing, comparing, writing - treats the two uniformly. Parsing never eagerly
 * expands a value past the level the caller actually asks for.
 **************************************************************************************************/
#![warn(missing_docs)]

//! # cbor_canon
//!
//! `cbor_canon` parses, validates, compares and writes CBOR (RFC 8949) data items.
//!
//! ## Two representations, one type
//!
//! [`Value`] is either a constructed tree built with its own constructors ([`Value::uint`],
//! [`Value::array`], ...) or a [`Value::Serialized`] slice borrowed straight out of the input
//! buffer. [`read`] and [`read_deterministic`] always hand back `Serialized` values; every
//! accessor in [`access`] decodes one level at a time, so a deeply nested map never gets expanded
//! further than whatever the caller actually walks down to.
//!
//! ## Strictness
//!
//! [`read`] only checks structural well-formedness. [`read_deterministic`] additionally enforces
//! RFC 8949 §4.2 Core Deterministic Encoding Requirements: every head must use its minimal
//! argument width, and every map's keys must appear in strictly increasing bytewise lexicographic
//! order.
//!
//! ## Example
//!
//! ```
//! use cbor_canon::{read, access};
//!
//! let bytes = [0x82u8, 0x01, 0x02]; // [1, 2]
//! let (value, consumed) = read(&bytes).unwrap();
//! assert_eq!(consumed, bytes.len());
//! assert_eq!(access::array_length(&value).unwrap(), 2);
//! ```

mod bytes;
mod constants;
mod error;
mod header;
mod jump;
mod value;

pub mod access;
pub mod compare;
pub mod validate;
pub mod write;

pub use error::{CborError, Result};
pub use value::Value;
pub use validate::Strictness;
pub use compare::CompareResult;

/// Parse a single CBOR data item from the start of `buf`, checking only structural
/// well-formedness (RFC 8949 §3), and return it together with the number of bytes it occupied.
///
/// The returned [`Value`] is always [`Value::Serialized`]: no sub-item is expanded until an
/// accessor in [`access`] is called on it. Any bytes in `buf` past the returned length belong to
/// whatever comes next (e.g. a second item in a CBOR sequence) and are not inspected.
pub fn read(buf: &[u8]) -> Result<(Value, usize)> {
    let consumed = validate::validate(buf, Strictness::Lax)?;
    Ok((Value::from_validated_bytes(&buf[..consumed]), consumed))
}

/// Like [`read`], but additionally enforces RFC 8949 §4.2 Core Deterministic Encoding
/// Requirements: minimal-width heads and strictly increasing bytewise-lexicographic map-key
/// order, checked transitively through every level of nesting.
pub fn read_deterministic(buf: &[u8]) -> Result<(Value, usize)> {
    let consumed = validate::validate(buf, Strictness::Deterministic)?;
    Ok((Value::from_validated_bytes(&buf[..consumed]), consumed))
}

/// Compute the exact number of bytes [`write`] will emit for `value`.
pub fn size_comp(value: &Value) -> usize {
    write::size_comp(value)
}

/// Serialize `value` into `out` in its minimal RFC 8949 §4.2 encoding, returning the number of
/// bytes written. A constructed value is always written minimally, regardless of whether it was
/// originally read in lax mode; a [`Value::Serialized`] value is copied back out verbatim.
pub fn write(value: &Value, out: &mut [u8]) -> Result<usize> {
    write::write(value, out)
}

/// Compare two CBOR items by the bytewise lexicographic order of their encodings. Only defined
/// for two [`Value::Serialized`] values - see [`compare::compare`] for why.
pub fn compare_serialized(a: &Value, b: &Value) -> CompareResult {
    compare::compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn read_then_write_round_trips_a_deterministic_array() {
        let bytes = [0x83u8, 0x01, 0x02, 0x03];
        let (value, consumed) = read_deterministic(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());

        let mut out = vec![0u8; size_comp(&value)];
        let written = write(&value, &mut out).unwrap();
        assert_eq!(&out[..written], &bytes);
    }

    #[test]
    fn read_rejects_indefinite_length_items() {
        assert!(read(&[0x9F]).is_err());
    }

    #[test]
    fn lax_read_accepts_non_minimal_head_deterministic_rejects_it() {
        let bytes = [0x18u8, 0x00]; // UInt(0) encoded non-minimally
        assert!(read(&bytes).is_ok());
        assert!(read_deterministic(&bytes).is_err());
    }

    #[test]
    fn construct_and_write_a_tagged_uint() {
        let value = Value::tagged(1, Value::uint(1363896240));
        let mut out = [0u8; 16];
        let n = write(&value, &mut out).unwrap();
        assert_eq!(&out[..n], &[0xC1, 0x1A, 0x51, 0x4B, 0x67, 0xB0]);

        let (parsed, consumed) = read_deterministic(&out[..n]).unwrap();
        assert_eq!(consumed, n);
        let (tag, payload) = access::tagged_parts(&parsed).unwrap();
        assert_eq!(tag, 1);
        assert_eq!(u64::try_from(payload).unwrap(), 1363896240);
    }

    #[test]
    fn compare_serialized_orders_by_encoded_bytes() {
        let (a, _) = read(&[0x00]).unwrap();
        let (b, _) = read(&[0x01]).unwrap();
        assert_eq!(compare_serialized(&a, &b), CompareResult::Less);
    }
}
