/***************************************************************************************************
 * cbor_canon header codec (spec.md §4.B)
 *
 * Encode/decode of a single CBOR head: the initial byte (major type + additional info) plus its
 * 0/1/2/4/8-byte argument.
 **************************************************************************************************/
use crate::bytes::{self, within};
use crate::constants::*;
use crate::error::{CborError, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Map the additional-info sub-field of an initial byte to the width, in bytes, of the argument
/// that follows it. Does not validate reserved/indefinite AI values - see `validate` for that.
#[inline]
#[cfg_attr(feature = "trace", trace)]
pub fn header_argument_width(ai: u8) -> usize {
    match ai {
        0..=PAYLOAD_AI_BITS => 0,
        PAYLOAD_ONE_BYTE => 1,
        PAYLOAD_TWO_BYTES => 2,
        PAYLOAD_FOUR_BYTES => 4,
        PAYLOAD_EIGHT_BYTES => 8,
        _ => 0,
    }
}

/// Read one CBOR head from `buf`, which must have at least one byte available.
///
/// Returns `(major, arg, head_len)`: the major type (top 3 bits, still shifted into position),
/// the argument widened to `u64`, and the total length of the head (1 + argument width).
///
/// This function does not reject reserved or indefinite-length additional-info values; it is used
/// both by the validator (which does reject them) and by the jump engine (which runs only on
/// already-validated input and has no error path for them).
#[cfg_attr(feature = "trace", trace)]
pub fn read_header_argument(buf: &[u8]) -> Result<(u8, u64, usize)> {
    if buf.is_empty() {
        return Err(CborError::NotEnoughData);
    }
    let initial = buf[0];
    let major = major_type(initial);
    let ai = additional_info(initial);
    let width = header_argument_width(ai);

    if !within(buf, 1, width) {
        return Err(CborError::NotEnoughData);
    }

    let arg = match width {
        0 => ai as u64,
        1 => bytes::read_u8(buf, 1) as u64,
        2 => bytes::read_u16(buf, 1) as u64,
        4 => bytes::read_u32(buf, 1) as u64,
        8 => bytes::read_u64(buf, 1),
        _ => unreachable!("header_argument_width only returns 0, 1, 2, 4 or 8"),
    };
    Ok((major, arg, 1 + width))
}

/// Pack a major type and additional-info value into a single initial byte and store it at
/// `buf[0]`. Caller must have reserved at least one byte.
#[inline]
pub fn write_initial_byte(major: u8, ai: u8, buf: &mut [u8]) {
    buf[0] = major_type(major) | additional_info(ai);
}

/// Smallest additional-info/width pair that can represent `value` (spec.md §4.B minimality rule).
/// Returns `(ai, width)`.
#[inline]
pub fn minimal_encoding(value: u64) -> (u8, usize) {
    if value < MIN_DETERMINISTIC_U8 {
        (value as u8, 0)
    } else if value < MIN_DETERMINISTIC_U16 {
        (PAYLOAD_ONE_BYTE, 1)
    } else if value < MIN_DETERMINISTIC_U32 {
        (PAYLOAD_TWO_BYTES, 2)
    } else if value < MIN_DETERMINISTIC_U64 {
        (PAYLOAD_FOUR_BYTES, 4)
    } else {
        (PAYLOAD_EIGHT_BYTES, 8)
    }
}

/// Length, in bytes, of the minimal head encoding an argument of `value`.
#[inline]
pub fn minimal_head_len(value: u64) -> usize {
    1 + minimal_encoding(value).1
}

/// Write a head for `major` with argument `value`, always choosing the minimal AI encoding
/// (spec.md §4.B). Returns the number of bytes written. Caller must have reserved
/// `minimal_head_len(value)` bytes at `buf[0..]`.
#[cfg_attr(feature = "trace", trace)]
pub fn write_uint_head(major: u8, value: u64, buf: &mut [u8]) -> Result<usize> {
    let (ai, width) = minimal_encoding(value);
    let total = 1 + width;
    if !within(buf, 0, total) {
        return Err(CborError::BufferTooSmall);
    }
    write_initial_byte(major, ai, buf);
    match width {
        0 => {}
        1 => bytes::write_u8(buf, 1, value as u8),
        2 => bytes::write_u16(buf, 1, value as u16),
        4 => bytes::write_u32(buf, 1, value as u32),
        8 => bytes::write_u64(buf, 1, value),
        _ => unreachable!(),
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_width_table() {
        assert_eq!(header_argument_width(23), 0);
        assert_eq!(header_argument_width(24), 1);
        assert_eq!(header_argument_width(25), 2);
        assert_eq!(header_argument_width(26), 4);
        assert_eq!(header_argument_width(27), 8);
    }

    #[test]
    fn minimal_encoding_boundaries() {
        assert_eq!(minimal_encoding(0), (0, 0));
        assert_eq!(minimal_encoding(23), (23, 0));
        assert_eq!(minimal_encoding(24), (PAYLOAD_ONE_BYTE, 1));
        assert_eq!(minimal_encoding(255), (PAYLOAD_ONE_BYTE, 1));
        assert_eq!(minimal_encoding(256), (PAYLOAD_TWO_BYTES, 2));
        assert_eq!(minimal_encoding(u16::MAX as u64), (PAYLOAD_TWO_BYTES, 2));
        assert_eq!(minimal_encoding(u16::MAX as u64 + 1), (PAYLOAD_FOUR_BYTES, 4));
        assert_eq!(minimal_encoding(u32::MAX as u64), (PAYLOAD_FOUR_BYTES, 4));
        assert_eq!(minimal_encoding(u32::MAX as u64 + 1), (PAYLOAD_EIGHT_BYTES, 8));
    }

    #[test]
    fn write_then_read_head_roundtrips() {
        let mut buf = [0u8; 9];
        for &v in &[0u64, 23, 24, 255, 256, 65535, 65536, u32::MAX as u64, u32::MAX as u64 + 1] {
            let n = write_uint_head(MT_UINT, v, &mut buf).unwrap();
            let (major, arg, head_len) = read_header_argument(&buf[..n]).unwrap();
            assert_eq!(major, MT_UINT);
            assert_eq!(arg, v);
            assert_eq!(head_len, n);
        }
    }

    #[test]
    fn write_uint_head_fails_on_short_buffer() {
        let mut buf = [0u8; 1];
        assert_eq!(write_uint_head(MT_UINT, 1000, &mut buf), Err(CborError::BufferTooSmall));
    }
}
