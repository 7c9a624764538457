/***************************************************************************************************
 * cbor_canon writer (spec.md §4.G, §5)
 *
 * Two-pass serialization: `size_comp` computes the exact encoded length of a value without writing
 * a single byte, then `write` emits exactly that many bytes. Every head is written in its minimal
 * form (RFC 8949 §4.2), regardless of how the value was originally parsed - a `Serialized` value is
 * the one exception, since it is copied back out verbatim rather than re-encoded.
 **************************************************************************************************/
use crate::constants::*;
use crate::error::{CborError, Result};
use crate::header::{minimal_head_len, write_uint_head};
use crate::value::Value;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Compute the exact number of bytes `crate::write::write` will emit for `v`. Never allocates,
/// never touches an output buffer; used by callers who need to size a buffer before writing, and
/// internally as pass one of the two-pass write.
#[cfg_attr(feature = "trace", trace)]
pub fn size_comp(v: &Value) -> usize {
    match v {
        Value::Int64 { value, .. } => minimal_head_len(*value),
        Value::String { payload, .. } => minimal_head_len(payload.len() as u64) + payload.len(),
        Value::Tagged { tag, payload } => minimal_head_len(*tag) + size_comp(payload),
        Value::Array { items } => {
            minimal_head_len(items.len() as u64) + items.iter().map(size_comp).sum::<usize>()
        }
        Value::Map { entries } => {
            minimal_head_len(entries.len() as u64)
                + entries
                    .iter()
                    .map(|(k, v)| size_comp(k) + size_comp(v))
                    .sum::<usize>()
        }
        Value::SimpleValue(n) => simple_value_head_len(*n),
        Value::Serialized { size, .. } => *size,
    }
}

/// Length, in bytes, of the minimal encoding of a major-7 simple value `n`. Simple values only
/// ever need the direct (`width = 0`, `n < 24`) or one-byte (`width = 1`, `32 <= n <= 255`) forms;
/// `Value::simple` already rejects the reserved `24..=31` range at construction time.
#[inline]
fn simple_value_head_len(n: u8) -> usize {
    if n < PAYLOAD_ONE_BYTE {
        1
    } else {
        2
    }
}

/// Write the minimal encoding of a major-7 simple value `n` to `out[0..]`, returning the number of
/// bytes written. Caller must have reserved `simple_value_head_len(n)` bytes.
#[inline]
fn write_simple_value(n: u8, out: &mut [u8]) -> Result<usize> {
    let len = simple_value_head_len(n);
    if out.len() < len {
        return Err(CborError::BufferTooSmall);
    }
    if len == 1 {
        out[0] = MT_SIMPLE | n;
    } else {
        out[0] = MT_SIMPLE | PAYLOAD_ONE_BYTE;
        out[1] = n;
    }
    Ok(len)
}

/// Serialize `v` into `out`, in its minimal RFC 8949 §4.2 encoding, returning the number of bytes
/// written. Fails with `BufferTooSmall` (and writes nothing useful - `out`'s contents on error are
/// unspecified) if `out` is shorter than `size_comp(v)`.
#[cfg_attr(feature = "trace", trace)]
pub fn write(v: &Value, out: &mut [u8]) -> Result<usize> {
    let needed = size_comp(v);
    if out.len() < needed {
        return Err(CborError::BufferTooSmall);
    }
    let written = write_into(v, out)?;
    debug_assert_eq!(written, needed, "write must emit exactly size_comp(v) bytes");
    Ok(written)
}

/// Cursor over a mutable output buffer, tracking how much of it remains unwritten. Used to thread
/// a single growing write position through the recursive descent in `write_into` without manual
/// index bookkeeping at every call site.
struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }
}

fn write_into(v: &Value, out: &mut [u8]) -> Result<usize> {
    let mut cursor = Cursor { buf: out, pos: 0 };
    write_value(v, &mut cursor)?;
    Ok(cursor.pos)
}

fn write_value(v: &Value, cursor: &mut Cursor) -> Result<()> {
    match v {
        Value::Int64 { major, value } => {
            let n = write_uint_head(*major, *value, cursor.remaining())?;
            cursor.advance(n);
        }
        Value::String { major, payload } => {
            let n = write_uint_head(*major, payload.len() as u64, cursor.remaining())?;
            cursor.advance(n);
            let dst = cursor.remaining();
            if dst.len() < payload.len() {
                return Err(CborError::BufferTooSmall);
            }
            dst[..payload.len()].copy_from_slice(payload);
            cursor.advance(payload.len());
        }
        Value::Tagged { tag, payload } => {
            let n = write_uint_head(MT_TAG, *tag, cursor.remaining())?;
            cursor.advance(n);
            write_value(payload, cursor)?;
        }
        Value::Array { items } => {
            let n = write_uint_head(MT_ARRAY, items.len() as u64, cursor.remaining())?;
            cursor.advance(n);
            for item in items {
                write_value(item, cursor)?;
            }
        }
        Value::Map { entries } => {
            let n = write_uint_head(MT_MAP, entries.len() as u64, cursor.remaining())?;
            cursor.advance(n);
            for (k, val) in entries {
                write_value(k, cursor)?;
                write_value(val, cursor)?;
            }
        }
        Value::SimpleValue(n) => {
            let written = write_simple_value(*n, cursor.remaining())?;
            cursor.advance(written);
        }
        Value::Serialized { bytes, .. } => {
            let dst = cursor.remaining();
            if dst.len() < bytes.len() {
                return Err(CborError::BufferTooSmall);
            }
            dst[..bytes.len()].copy_from_slice(bytes);
            cursor.advance(bytes.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate, Strictness};

    #[test]
    fn size_comp_matches_write_len_for_uint() {
        let v = Value::uint(1363896240);
        let mut buf = [0u8; 16];
        let n = write(&v, &mut buf).unwrap();
        assert_eq!(n, size_comp(&v));
        assert_eq!(&buf[..n], &[0x1A, 0x51, 0x4B, 0x67, 0xB0]);
    }

    #[test]
    fn write_small_uint_uses_direct_form() {
        let v = Value::uint(0);
        let mut buf = [0u8; 4];
        let n = write(&v, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x00]);
    }

    #[test]
    fn write_array_is_minimal_and_deterministic_validates() {
        let v = Value::array(vec![Value::uint(1), Value::uint(2), Value::uint(3)]);
        let mut buf = [0u8; 16];
        let n = write(&v, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x83, 0x01, 0x02, 0x03]);
        assert_eq!(validate(&buf[..n], Strictness::Deterministic), Ok(n));
    }

    #[test]
    fn write_map_preserves_given_entry_order_even_when_unsorted() {
        let v = Value::map(vec![
            (Value::tstr("b"), Value::uint(2)),
            (Value::tstr("a"), Value::uint(1)),
        ]);
        let mut buf = [0u8; 16];
        let n = write(&v, &mut buf).unwrap();
        // Writer never reorders keys - it only checks minimality, never fixes up order.
        assert_eq!(&buf[..n], &[0xA2, 0x61, 0x62, 0x02, 0x61, 0x61, 0x01]);
        assert!(validate(&buf[..n], Strictness::Deterministic).is_err());
    }

    #[test]
    fn write_tagged_value() {
        let v = Value::tagged(1, Value::uint(1363896240));
        let mut buf = [0u8; 16];
        let n = write(&v, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0xC1, 0x1A, 0x51, 0x4B, 0x67, 0xB0]);
    }

    #[test]
    fn write_fails_with_buffer_too_small() {
        let v = Value::array(vec![Value::uint(1), Value::uint(2)]);
        let mut buf = [0u8; 1];
        assert_eq!(write(&v, &mut buf), Err(CborError::BufferTooSmall));
    }

    #[test]
    fn write_copies_serialized_value_verbatim() {
        let bytes = [0x83u8, 0x01, 0x02, 0x03];
        let v = Value::from_validated_bytes(&bytes);
        let mut buf = [0u8; 8];
        let n = write(&v, &mut buf).unwrap();
        assert_eq!(&buf[..n], &bytes);
    }

    #[test]
    fn write_simple_values_round_trip() {
        for n in [0u8, 23, 32, 255] {
            let v = Value::simple(n).unwrap();
            let mut buf = [0u8; 4];
            let written = write(&v, &mut buf).unwrap();
            assert_eq!(written, size_comp(&v));
            assert_eq!(validate(&buf[..written], Strictness::Deterministic), Ok(written));
        }
    }
}
