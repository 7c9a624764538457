/***************************************************************************************************
 * cbor_canon comparison (spec.md §4.H)
 *
 * RFC 8949 §4.2 defines deterministic map-key order as the bytewise lexicographic order of each
 * key's own deterministic encoding. Two distinct needs fall out of that one rule:
 *
 *   - `compare`: given two already-encoded items, say which sorts first. Only `Serialized` values
 *     carry encoded bytes directly; comparing two constructed trees would require encoding them
 *     first (via `crate::write`), which this module deliberately leaves to the caller rather than
 *     doing implicitly - see the `Incomparable` variant.
 *   - `check_map_key_order`: given one already-validated item, confirm every map nested inside it
 *     (including itself) has its keys in that order. This is the strict-mode post-pass run by
 *     `crate::validate`.
 **************************************************************************************************/
use crate::constants::*;
use crate::error::{CborError, Result};
use crate::header::read_header_argument;
use crate::jump::children_count;
use crate::value::Value;

use std::cmp::Ordering;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// The result of comparing two CBOR items.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareResult {
    /// `a` sorts before `b`.
    Less,
    /// `a` and `b` have identical encodings.
    Equal,
    /// `a` sorts after `b`.
    Greater,
    /// `a` and `b` cannot be compared without first encoding one or both of them.
    Incomparable,
}

/// Compare two CBOR items by the bytewise lexicographic order of their encodings.
///
/// Only defined for `Value::Serialized` values, which already carry their encoded bytes; every
/// other variant returns `Incomparable` rather than implicitly re-encoding (callers that need to
/// compare constructed values should serialize them with `crate::write` first).
#[cfg_attr(feature = "trace", trace)]
pub fn compare(a: &Value, b: &Value) -> CompareResult {
    match (a, b) {
        (Value::Serialized { bytes: ab, .. }, Value::Serialized { bytes: bb, .. }) => {
            match ab.cmp(bb) {
                Ordering::Less => CompareResult::Less,
                Ordering::Equal => CompareResult::Equal,
                Ordering::Greater => CompareResult::Greater,
            }
        }
        _ => CompareResult::Incomparable,
    }
}

/// One container currently being walked by `check_map_key_order`. `start` is the byte offset of
/// the container's own head, so that when `remaining` reaches zero we know the container's full
/// byte range without having tracked it anywhere else.
struct Frame {
    start: usize,
    remaining: u64,
    is_map: bool,
    on_key: bool,
    prev_key: Option<(usize, usize)>,
}

/// Walk every map nested within the single validated item at the start of `buf` (including `buf`
/// itself, if it is a map) and confirm each one's keys appear in strictly increasing bytewise
/// lexicographic order, per RFC 8949 §4.2.
///
/// Implemented with an explicit heap-allocated stack rather than function-call recursion, so that
/// adversarially deep nesting cannot overflow the call stack; stack depth is bounded by input
/// nesting depth, not input size.
///
/// `buf` must hold exactly one already well-formed item (`crate::validate::validate` guarantees
/// this for its own `consumed` prefix before calling here).
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn check_map_key_order(buf: &[u8]) -> Result<()> {
    let mut stack: Vec<Frame> = vec![Frame { start: 0, remaining: 1, is_map: false, on_key: true, prev_key: None }];
    let mut consumed = 0usize;

    while let Some(top) = stack.last_mut() {
        if top.remaining == 0 {
            let finished = stack.pop().unwrap();
            complete_child(&mut stack, buf, finished.start, consumed)?;
            continue;
        }
        top.remaining -= 1;

        let item_start = consumed;
        let (major, arg, head_len) = read_header_argument(&buf[consumed..])?;
        let leaf_len = match major {
            MT_BSTR | MT_TSTR => head_len + arg as usize,
            _ => head_len,
        };
        consumed += leaf_len;

        let children = children_count(major, arg);
        if children == 0 {
            complete_child(&mut stack, buf, item_start, consumed)?;
        } else {
            stack.push(Frame {
                start: item_start,
                remaining: children,
                is_map: major == MT_MAP,
                on_key: true,
                prev_key: None,
            });
        }
    }
    Ok(())
}

/// Record that the item spanning `buf[start..end]` just finished, against whichever frame is now
/// on top of `stack` (its parent). A map's children alternate key, value, key, value, ...; every
/// time a key finishes, it must sort strictly after the previous key.
fn complete_child(stack: &mut [Frame], buf: &[u8], start: usize, end: usize) -> Result<()> {
    let parent = match stack.last_mut() {
        Some(p) => p,
        None => return Ok(()),
    };
    if !parent.is_map {
        return Ok(());
    }
    if parent.on_key {
        if let Some((prev_start, prev_end)) = parent.prev_key {
            if buf[start..end] <= buf[prev_start..prev_end] {
                return Err(CborError::ConstraintFailed {
                    reason: "map keys are not in strictly increasing bytewise lexicographic order",
                });
            }
        }
        parent.prev_key = Some((start, end));
        parent.on_key = false;
    } else {
        parent.on_key = true;
    }
    Ok(())
}
