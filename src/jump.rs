/***************************************************************************************************
 * cbor_canon jump engine (spec.md §4.C)
 *
 * Operates on already-validated input: no bounds checks, no error path. Used to skip over data
 * items (for the array/map accessors in §4.F) and to re-emit `Serialized` values verbatim (§4.G).
 **************************************************************************************************/
use crate::constants::*;
use crate::header::{header_argument_width, read_header_argument};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Number of immediate children a head introduces, given its major type and argument.
///
/// Arrays introduce `arg` children, maps introduce `2 * arg` (key, value pairs), tags introduce
/// exactly one (their payload item), everything else introduces none.
#[inline]
#[cfg_attr(feature = "trace", trace)]
pub fn children_count(major: u8, arg: u64) -> u64 {
    match major {
        MT_ARRAY => arg,
        MT_MAP => arg.saturating_mul(2),
        MT_TAG => 1,
        _ => 0,
    }
}

/// Length, in bytes, of the head (initial byte + argument) at the start of `buf`.
///
/// `buf` must begin with a complete, validated head.
#[cfg_attr(feature = "trace", trace)]
pub fn jump_header(buf: &[u8]) -> usize {
    1 + header_argument_width(buf[0] & AI_MASK)
}

/// Length, in bytes, of a "leaf": the head, plus - for byte/text strings - the inline payload that
/// immediately follows it. For every other major type this equals `jump_header`.
///
/// `buf` must begin with a complete, validated leaf.
#[cfg_attr(feature = "trace", trace)]
pub fn jump_leaf(buf: &[u8]) -> usize {
    let (major, arg, head_len) = read_header_argument(buf).expect("buf holds a validated head");
    match major {
        MT_BSTR | MT_TSTR => head_len + arg as usize,
        _ => head_len,
    }
}

/// Length, in bytes, of one complete data item (including all nested children) at the start of
/// `buf`.
///
/// Implemented as an iterative descent (spec.md §4.C): a "pending items" counter starts at 1 for
/// the single top-level item; each step consumes one leaf, decrements pending by one, and adds
/// back the number of immediate children the consumed head introduces. The walk ends when pending
/// reaches zero, and the total bytes consumed is the result. No call-stack recursion is used, so
/// nesting depth cannot overflow the stack.
///
/// `buf` must begin with a complete, validated data item.
#[cfg_attr(feature = "trace", trace)]
pub fn jump_data_item(buf: &[u8]) -> usize {
    let mut consumed = 0usize;
    let mut pending: u64 = 1;

    while pending > 0 {
        let cursor = &buf[consumed..];
        let (major, arg, head_len) = read_header_argument(cursor).expect("buf holds a validated item");
        let leaf_len = match major {
            MT_BSTR | MT_TSTR => head_len + arg as usize,
            _ => head_len,
        };
        consumed += leaf_len;
        pending = pending - 1 + children_count(major, arg);
    }
    consumed
}
