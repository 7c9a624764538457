/***************************************************************************************************
 * cbor_canon accessors and iterators (spec.md §4.F)
 *
 * A `Value` built by `crate::read`/`crate::read_deterministic` is always `Serialized`: a validated
 * byte slice that hasn't been expanded into a tree. Every accessor here treats a constructed and a
 * `Serialized` value identically from the caller's point of view, decoding lazily, one head at a
 * time, only as far as the caller actually asks.
 *
 * Two different things can happen to a child pulled out of a `Serialized` parent, and it is
 * important they stay distinct:
 *
 *   - A *destructurer* (`int64_parts`, `simple_value`, `string_parts`) extracts the raw fields the
 *     caller asked for directly, via `decode_scalar` below, and never hands back a `Value` at all.
 *   - A *navigational* accessor (`tagged_parts`'s payload, `array_index`, the iterators,
 *     `bulk_read_array`) hands back a child `Value` for the caller to keep navigating. That child
 *     is always `Value::Serialized`, regardless of its major type - a scalar child is not
 *     pre-decoded into `Int64`/`String`/`SimpleValue` just because it happens to be cheap to do so,
 *     since doing that would make e.g. two `Int64` values pulled out of two different serialized
 *     arrays incomparable by `crate::compare::compare` (which only compares `Serialized` values).
 **************************************************************************************************/
use crate::constants::*;
use crate::error::{CborError, Result};
use crate::header::read_header_argument;
use crate::jump::jump_data_item;
use crate::value::Value;

/// Wrap the single item at the start of `buf` as a `Value::Serialized` slice bounded to just that
/// item, regardless of major type. `buf` must begin with a complete, validated item; trailing
/// bytes are ignored. Used by every navigational accessor below to hand back a child `Value`.
fn serialized_child<'buf>(buf: &'buf [u8]) -> Value<'buf> {
    let len = jump_data_item(buf);
    Value::from_validated_bytes(&buf[..len])
}

/// Decode the scalar item at the start of `buf` directly into its typed `Value` variant. Only
/// valid for major types 0, 1, 2, 3 and the short forms of major type 7 - callers must already
/// know (from the head, or from context) that `buf` does not hold an array, map or tag.
fn decode_scalar<'buf>(buf: &'buf [u8]) -> Result<Value<'buf>> {
    let (major, arg, head_len) = read_header_argument(buf)?;
    match major {
        MT_UINT => Ok(Value::Int64 { major: MT_UINT, value: arg }),
        MT_NINT => Ok(Value::Int64 { major: MT_NINT, value: arg }),
        MT_BSTR | MT_TSTR => {
            let len = arg as usize;
            if !crate::bytes::within(buf, head_len, len) {
                return Err(CborError::NotEnoughData);
            }
            Ok(Value::String { major, payload: &buf[head_len..head_len + len] })
        }
        MT_SIMPLE => {
            let width = head_len - 1;
            if width <= 1 {
                Value::simple(arg as u8)
            } else {
                // AI 25/26/27: half/single/double-precision float. Floats are opaque to this
                // crate (no typed float decode) - keep the bits as a `Serialized` leaf.
                Ok(Value::from_validated_bytes(&buf[..head_len]))
            }
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// The major type of `v`, re-reading a `Serialized` head if needed.
#[inline]
pub fn major_type(v: &Value) -> u8 {
    v.major_type()
}

/// Destructure an integer value into `(major, raw_argument)`. `major` is `MT_UINT` or `MT_NINT`;
/// the represented number is `raw_argument` for `MT_UINT` or `-1 - raw_argument` for `MT_NINT`.
pub fn int64_parts(v: &Value) -> Result<(u8, u64)> {
    match v {
        Value::Int64 { major, value } => Ok((*major, *value)),
        Value::Serialized { bytes, .. } => {
            let (major, arg, _) = read_header_argument(bytes)?;
            match major {
                MT_UINT | MT_NINT => Ok((major, arg)),
                _ => Err(CborError::IncompatibleType),
            }
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// Destructure a simple value (major 7, a one-byte-or-shorter form) into its raw `u8`.
pub fn simple_value(v: &Value) -> Result<u8> {
    match v {
        Value::SimpleValue(n) => Ok(*n),
        Value::Serialized { bytes, .. } => match decode_scalar(bytes)? {
            Value::SimpleValue(n) => Ok(n),
            _ => Err(CborError::IncompatibleType),
        },
        _ => Err(CborError::IncompatibleType),
    }
}

/// Destructure a byte or text string into `(major, payload)`.
pub fn string_parts<'buf>(v: &Value<'buf>) -> Result<(u8, &'buf [u8])> {
    match v {
        Value::String { major, payload } => Ok((*major, *payload)),
        Value::Serialized { bytes, .. } => match decode_scalar(bytes)? {
            Value::String { major, payload } => Ok((major, payload)),
            _ => Err(CborError::IncompatibleType),
        },
        _ => Err(CborError::IncompatibleType),
    }
}

/// Destructure a text string and additionally validate it as UTF-8 (RFC 8949 does not guarantee
/// `tstr` payloads are valid UTF-8 merely by virtue of structural validation).
pub fn string_as_str<'buf>(v: &Value<'buf>) -> Result<&'buf str> {
    let (major, payload) = string_parts(v)?;
    if major != MT_TSTR {
        return Err(CborError::IncompatibleType);
    }
    std::str::from_utf8(payload).map_err(|_| CborError::Utf8Error)
}

/// Destructure a tagged value into `(tag, payload)`. `payload` is a navigational child: when `v`
/// is `Serialized`, it always comes back `Value::Serialized` too, regardless of its major type.
pub fn tagged_parts<'buf>(v: &Value<'buf>) -> Result<(u64, Value<'buf>)> {
    match v {
        Value::Tagged { tag, payload } => Ok((*tag, (**payload).clone())),
        Value::Serialized { bytes, .. } => {
            let (major, tag, head_len) = read_header_argument(bytes)?;
            if major != MT_TAG {
                return Err(CborError::IncompatibleType);
            }
            Ok((tag, serialized_child(&bytes[head_len..])))
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// Number of elements in an array.
pub fn array_length(v: &Value) -> Result<u64> {
    match v {
        Value::Array { items } => Ok(items.len() as u64),
        Value::Serialized { bytes, .. } => {
            let (major, arg, _) = read_header_argument(bytes)?;
            if major != MT_ARRAY {
                return Err(CborError::IncompatibleType);
            }
            Ok(arg)
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// Fetch the element at `index` of an array. For a `Serialized` array this walks past the
/// preceding `index` elements using the jump engine (O(index), never re-validating) rather than
/// materializing the whole array, and always returns the element as `Value::Serialized`,
/// regardless of its major type.
pub fn array_index<'buf>(v: &Value<'buf>, index: u64) -> Result<Value<'buf>> {
    match v {
        Value::Array { items } => items
            .get(index as usize)
            .cloned()
            .ok_or(CborError::IndexOutOfBounds),
        Value::Serialized { bytes, .. } => {
            let (major, arg, head_len) = read_header_argument(bytes)?;
            if major != MT_ARRAY {
                return Err(CborError::IncompatibleType);
            }
            if index >= arg {
                return Err(CborError::IndexOutOfBounds);
            }
            let mut cursor = head_len;
            for _ in 0..index {
                cursor += jump_data_item(&bytes[cursor..]);
            }
            Ok(serialized_child(&bytes[cursor..]))
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// Number of (key, value) pairs in a map.
pub fn map_length(v: &Value) -> Result<u64> {
    match v {
        Value::Map { entries } => Ok(entries.len() as u64),
        Value::Serialized { bytes, .. } => {
            let (major, arg, _) = read_header_argument(bytes)?;
            if major != MT_MAP {
                return Err(CborError::IncompatibleType);
            }
            Ok(arg)
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// A restartable, forward-only iterator over an array's elements. Each call to
/// [`array_iterator`] builds a fresh one from scratch, so iterating twice never requires keeping
/// state around between iterations.
pub enum ArrayIter<'a, 'buf> {
    /// Iterating a constructed `Value::Array`.
    Owned(std::slice::Iter<'a, Value<'buf>>),
    /// Iterating a `Serialized` array: `cursor` always points at the next undecoded element.
    Lazy { remaining: u64, cursor: &'buf [u8] },
}

impl<'a, 'buf> Iterator for ArrayIter<'a, 'buf> {
    type Item = Result<Value<'buf>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ArrayIter::Owned(it) => it.next().cloned().map(Ok),
            ArrayIter::Lazy { remaining, cursor } => {
                if *remaining == 0 {
                    return None;
                }
                let item_len = jump_data_item(cursor);
                let item = Value::from_validated_bytes(&cursor[..item_len]);
                *cursor = &cursor[item_len..];
                *remaining -= 1;
                Some(Ok(item))
            }
        }
    }
}

/// Build a restartable iterator over an array's elements.
pub fn array_iterator<'a, 'buf>(v: &'a Value<'buf>) -> Result<ArrayIter<'a, 'buf>> {
    match v {
        Value::Array { items } => Ok(ArrayIter::Owned(items.iter())),
        Value::Serialized { bytes, .. } => {
            let (major, arg, head_len) = read_header_argument(bytes)?;
            if major != MT_ARRAY {
                return Err(CborError::IncompatibleType);
            }
            Ok(ArrayIter::Lazy { remaining: arg, cursor: &bytes[head_len..] })
        }
        _ => Err(CborError::IncompatibleType),
    }
}

/// Read every top-level element of an array eagerly into a `Vec`, each one as a `Serialized`
/// subslice (for a `Serialized` array) or as given (for a constructed one). A convenience wrapper
/// around [`array_iterator`] for callers who want the whole array at once rather than step by step.
pub fn bulk_read_array<'buf>(v: &Value<'buf>) -> Result<Vec<Value<'buf>>> {
    array_iterator(v)?.collect()
}

/// A restartable, forward-only iterator over a map's (key, value) pairs, in encoding order.
pub enum MapIter<'a, 'buf> {
    /// Iterating a constructed `Value::Map`.
    Owned(std::slice::Iter<'a, (Value<'buf>, Value<'buf>)>),
    /// Iterating a `Serialized` map: `cursor` always points at the next undecoded key.
    Lazy { remaining: u64, cursor: &'buf [u8] },
}

impl<'a, 'buf> Iterator for MapIter<'a, 'buf> {
    type Item = Result<(Value<'buf>, Value<'buf>)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MapIter::Owned(it) => it.next().map(|(k, v)| Ok((k.clone(), v.clone()))),
            MapIter::Lazy { remaining, cursor } => {
                if *remaining == 0 {
                    return None;
                }
                let key_len = jump_data_item(cursor);
                let key = Value::from_validated_bytes(&cursor[..key_len]);
                *cursor = &cursor[key_len..];

                let value_len = jump_data_item(cursor);
                let value = Value::from_validated_bytes(&cursor[..value_len]);
                *cursor = &cursor[value_len..];

                *remaining -= 1;
                Some(Ok((key, value)))
            }
        }
    }
}

/// Build a restartable iterator over a map's (key, value) pairs.
pub fn map_iterator<'a, 'buf>(v: &'a Value<'buf>) -> Result<MapIter<'a, 'buf>> {
    match v {
        Value::Map { entries } => Ok(MapIter::Owned(entries.iter())),
        Value::Serialized { bytes, .. } => {
            let (major, arg, head_len) = read_header_argument(bytes)?;
            if major != MT_MAP {
                return Err(CborError::IncompatibleType);
            }
            Ok(MapIter::Lazy { remaining: arg, cursor: &bytes[head_len..] })
        }
        _ => Err(CborError::IncompatibleType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn array_length_and_index_on_serialized_value() {
        let buf = [0x83u8, 0x01, 0x02, 0x03];
        let v = Value::from_validated_bytes(&buf);
        assert_eq!(array_length(&v).unwrap(), 3);
        assert_eq!(u64::try_from(array_index(&v, 0).unwrap()).unwrap(), 1);
        assert_eq!(u64::try_from(array_index(&v, 2).unwrap()).unwrap(), 3);
        assert_eq!(array_index(&v, 3), Err(CborError::IndexOutOfBounds));
    }

    #[test]
    fn array_iterator_yields_all_elements() {
        let buf = [0x83u8, 0x01, 0x02, 0x03];
        let v = Value::from_validated_bytes(&buf);
        let items: Result<Vec<u64>> = array_iterator(&v)
            .unwrap()
            .map(|r| r.and_then(|item| u64::try_from(item).map_err(Into::into)))
            .collect();
        assert_eq!(items.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn array_iterator_is_restartable() {
        let buf = [0x82u8, 0x01, 0x02];
        let v = Value::from_validated_bytes(&buf);
        let first: Vec<_> = array_iterator(&v).unwrap().collect();
        let second: Vec<_> = array_iterator(&v).unwrap().collect();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn nested_array_child_stays_serialized() {
        // [ [1, 2] ]
        let buf = [0x81u8, 0x82, 0x01, 0x02];
        let v = Value::from_validated_bytes(&buf);
        let child = array_index(&v, 0).unwrap();
        assert!(matches!(child, Value::Serialized { .. }));
        assert_eq!(array_length(&child).unwrap(), 2);
    }

    #[test]
    fn scalar_array_elements_also_stay_serialized() {
        let buf = [0x81u8, 0x01]; // [1]
        let v = Value::from_validated_bytes(&buf);
        assert!(matches!(array_index(&v, 0).unwrap(), Value::Serialized { .. }));
        let via_iter = array_iterator(&v).unwrap().next().unwrap().unwrap();
        assert!(matches!(via_iter, Value::Serialized { .. }));
    }

    #[test]
    fn scalars_pulled_from_different_serialized_arrays_are_comparable() {
        use crate::compare::{compare, CompareResult};
        let a = Value::from_validated_bytes(&[0x81u8, 0x01]); // [1]
        let b = Value::from_validated_bytes(&[0x81u8, 0x02]); // [2]
        let elem_a = array_index(&a, 0).unwrap();
        let elem_b = array_index(&b, 0).unwrap();
        assert_eq!(compare(&elem_a, &elem_b), CompareResult::Less);
    }

    #[test]
    fn tagged_scalar_payload_stays_serialized() {
        let buf = [0xC1u8, 0x01]; // Tagged{tag=1, payload=UInt(1)}
        let v = Value::from_validated_bytes(&buf);
        let (_, payload) = tagged_parts(&v).unwrap();
        assert!(matches!(payload, Value::Serialized { .. }));
    }

    #[test]
    fn map_iterator_yields_pairs_in_order() {
        // {"a": 1, "b": 2}
        let buf = [0xA2u8, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
        let v = Value::from_validated_bytes(&buf);
        assert_eq!(map_length(&v).unwrap(), 2);
        let pairs: Vec<_> = map_iterator(&v).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(string_as_str(&pairs[0].0).unwrap(), "a");
        assert_eq!(string_as_str(&pairs[1].0).unwrap(), "b");
    }

    #[test]
    fn tagged_parts_on_serialized_value() {
        // Tagged{tag=1, payload=UInt(1363896240)}: C1 1A 51 4B 67 B0
        let buf = [0xC1u8, 0x1A, 0x51, 0x4B, 0x67, 0xB0];
        let v = Value::from_validated_bytes(&buf);
        let (tag, payload) = tagged_parts(&v).unwrap();
        assert_eq!(tag, 1);
        assert_eq!(u64::try_from(payload).unwrap(), 1363896240);
    }

    #[test]
    fn string_as_str_rejects_invalid_utf8() {
        let bad = [0x61u8, 0xFF];
        let v = Value::from_validated_bytes(&bad);
        assert_eq!(string_as_str(&v), Err(CborError::Utf8Error));
    }

    #[test]
    fn bulk_read_array_materializes_everything() {
        let buf = [0x82u8, 0x61, 0x61, 0x61, 0x62];
        let v = Value::from_validated_bytes(&buf);
        let items = bulk_read_array(&v).unwrap();
        assert_eq!(items.len(), 2);
    }
}
