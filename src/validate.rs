/***************************************************************************************************
 * cbor_canon validator (spec.md §4.D)
 *
 * Single-pass, iterative (no stack recursion), bounded-size validator. Two state words only: a
 * byte cursor (`consumed`) and a "pending items to validate" counter. This shape is what lets the
 * validator run in O(total bytes) time and O(1) call-stack depth regardless of how deeply an
 * adversarial input nests arrays/maps/tags.
 **************************************************************************************************/
use crate::bytes::within;
use crate::compare::check_map_key_order;
use crate::constants::*;
use crate::error::{CborError, Result};
use crate::header::{header_argument_width, minimal_encoding};
use crate::jump::children_count;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Validation strictness. `Lax` checks only structural well-formedness; `Deterministic` adds the
/// RFC 8949 §4.2 Core Deterministic Encoding checks (minimal heads, ordered map keys).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Strictness {
    /// Structural well-formedness only.
    Lax,
    /// Well-formedness plus RFC 8949 §4.2 Core Deterministic Encoding Requirements.
    Deterministic,
}

/// Validate a single CBOR data item at the start of `buf`.
///
/// On success, returns the number of bytes `consumed` by that one item (which may be less than
/// `buf.len()` - the remainder is the caller's to do with as they wish, e.g. decode a second
/// sequence item). On failure, returns the first error encountered; no partial result is exposed.
#[cfg_attr(feature = "trace", trace)]
pub fn validate(buf: &[u8], strictness: Strictness) -> Result<usize> {
    let mut consumed = 0usize;
    let mut pending: u64 = 1;

    while pending > 0 {
        if !within(buf, consumed, 1) {
            return Err(CborError::NotEnoughData);
        }
        let initial = buf[consumed];
        let major = major_type(initial);
        let ai = additional_info(initial);

        if (PAYLOAD_RESERVED_LO..=PAYLOAD_RESERVED_HI).contains(&ai) {
            return Err(CborError::ConstraintFailed { reason: "reserved additional-info value (28..=30)" });
        }
        if ai == PAYLOAD_INDEFINITE {
            return Err(CborError::ConstraintFailed { reason: "indefinite-length items are not supported" });
        }

        let width = header_argument_width(ai);
        if !within(buf, consumed + 1, width) {
            return Err(CborError::NotEnoughData);
        }

        let arg = read_argument(buf, consumed + 1, ai, width);

        if major == MT_SIMPLE && ai == PAYLOAD_ONE_BYTE && arg < MIN_SIMPLE_LONG_ARGUMENT as u64 {
            return Err(CborError::ConstraintFailed {
                reason: "one-byte simple value argument must be >= 32",
            });
        }

        if strictness == Strictness::Deterministic {
            let (minimal_ai, minimal_width) = minimal_encoding(arg);
            if minimal_width != width || (width == 0 && minimal_ai != ai) {
                return Err(CborError::ConstraintFailed { reason: "head is not the minimal encoding of its argument" });
            }
        }

        let head_len = 1 + width;

        let leaf_len = match major {
            MT_BSTR | MT_TSTR => {
                let str_len = arg as usize;
                if !within(buf, consumed + head_len, str_len) {
                    return Err(CborError::NotEnoughData);
                }
                head_len + str_len
            }
            _ => head_len,
        };

        consumed += leaf_len;

        let children = children_count(major, arg);
        // A bound proportional to remaining bytes: each child consumes at least one byte, so if
        // the requested child count can't possibly fit in what's left, fail fast rather than
        // looping until the real shortfall surfaces many iterations later.
        if children > buf.len().saturating_sub(consumed) as u64 {
            return Err(CborError::NotEnoughData);
        }
        pending = pending - 1 + children;
    }

    if strictness == Strictness::Deterministic {
        check_map_key_order(&buf[..consumed])?;
    }

    Ok(consumed)
}

/// Read the argument bytes for a head whose additional-info is `ai` and whose argument width is
/// `width`, starting at `arg_start` in `buf`. Bounds must already have been checked by the caller.
#[inline]
fn read_argument(buf: &[u8], arg_start: usize, ai: u8, width: usize) -> u64 {
    use crate::bytes::{read_u16, read_u32, read_u64, read_u8};
    match width {
        0 => ai as u64,
        1 => read_u8(buf, arg_start) as u64,
        2 => read_u16(buf, arg_start) as u64,
        4 => read_u32(buf, arg_start) as u64,
        8 => read_u64(buf, arg_start),
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_validates_as_one_byte() {
        assert_eq!(validate(&[0x00], Strictness::Lax), Ok(1));
    }

    #[test]
    fn minimal_head_24_is_deterministic() {
        // 0x18 0x18 = UInt(24), minimally encoded on one extra byte.
        assert_eq!(validate(&[0x18, 0x18], Strictness::Deterministic), Ok(2));
    }

    #[test]
    fn non_minimal_head_rejected_only_in_strict_mode() {
        // 0x18 0x00 = UInt(0) encoded with an unnecessary extra byte.
        assert_eq!(validate(&[0x18, 0x00], Strictness::Lax), Ok(2));
        assert!(matches!(
            validate(&[0x18, 0x00], Strictness::Deterministic),
            Err(CborError::ConstraintFailed { .. })
        ));
    }

    #[test]
    fn sorted_map_keys_pass_strict_mode() {
        // {"a": 1, "b": 2}
        let buf = [0xA2u8, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
        assert_eq!(validate(&buf, Strictness::Deterministic), Ok(buf.len()));
    }

    #[test]
    fn unsorted_map_keys_fail_only_in_strict_mode() {
        // {"b": 2, "a": 1}
        let buf = [0xA2u8, 0x61, 0x62, 0x02, 0x61, 0x61, 0x01];
        assert_eq!(validate(&buf, Strictness::Lax), Ok(buf.len()));
        assert!(matches!(
            validate(&buf, Strictness::Deterministic),
            Err(CborError::ConstraintFailed { .. })
        ));
    }

    #[test]
    fn reserved_ai_always_rejected() {
        assert!(matches!(
            validate(&[0x1Cu8], Strictness::Lax),
            Err(CborError::ConstraintFailed { .. })
        ));
    }

    #[test]
    fn indefinite_length_always_rejected() {
        assert!(matches!(
            validate(&[0x1Fu8], Strictness::Lax),
            Err(CborError::ConstraintFailed { .. })
        ));
        assert!(matches!(
            validate(&[0x1Fu8], Strictness::Deterministic),
            Err(CborError::ConstraintFailed { .. })
        ));
    }

    #[test]
    fn truncated_input_is_not_enough_data() {
        assert_eq!(validate(&[0x18], Strictness::Lax), Err(CborError::NotEnoughData));
        assert_eq!(validate(&[0x41], Strictness::Lax), Err(CborError::NotEnoughData));
        assert_eq!(validate(&[0x81], Strictness::Lax), Err(CborError::NotEnoughData));
    }

    #[test]
    fn simple_value_one_byte_form_floor() {
        // 0xF8 0x1F = one-byte simple value form with argument 31 (< 32) -> rejected
        assert!(matches!(
            validate(&[0xF8, 0x1F], Strictness::Lax),
            Err(CborError::ConstraintFailed { .. })
        ));
        // 0xF8 0x20 = argument 32 -> accepted
        assert_eq!(validate(&[0xF8, 0x20], Strictness::Lax), Ok(2));
    }

    #[test]
    fn deeply_nested_array_does_not_overflow_the_call_stack() {
        // 50,000 singly-nested one-element arrays terminated by a single uint.
        let depth = 50_000;
        let mut buf = vec![0x81u8; depth];
        buf.push(0x00);
        assert_eq!(validate(&buf, Strictness::Lax), Ok(buf.len()));
    }

    #[test]
    fn validator_consumes_only_the_first_item_of_a_sequence() {
        let buf = [0x01u8, 0x02, 0x03];
        assert_eq!(validate(&buf, Strictness::Lax), Ok(1));
    }
}
