/***************************************************************************************************
 * cbor_canon CBOR constants
 *
 * Bit-layout constants for the CBOR initial byte (RFC 8949 §3): the 3-bit major type, the 5-bit
 * additional-info sub-field, and the additional-info values that select argument width.
 **************************************************************************************************/

/// Additional Information bitmask (low 5 bits of the initial byte).
pub const AI_MASK: u8 = 0b000_11111;

/// Major Type 0 (unsigned integers).
pub const MT_UINT: u8 = 0b000_00000;
/// Major Type 1 (negative integers).
pub const MT_NINT: u8 = 0b001_00000;
/// Major Type 2 (byte strings).
pub const MT_BSTR: u8 = 0b010_00000;
/// Major Type 3 (text strings).
pub const MT_TSTR: u8 = 0b011_00000;
/// Major Type 4 (arrays).
pub const MT_ARRAY: u8 = 0b100_00000;
/// Major Type 5 (maps).
pub const MT_MAP: u8 = 0b101_00000;
/// Major Type 6 (tags).
pub const MT_TAG: u8 = 0b110_00000;
/// Major Type 7 (simple values and floats).
pub const MT_SIMPLE: u8 = 0b111_00000;

/// Largest additional-info value whose argument is the AI itself (no extra bytes).
pub const PAYLOAD_AI_BITS: u8 = 23;
/// AI value indicating one byte of argument follows the initial byte.
pub const PAYLOAD_ONE_BYTE: u8 = 24;
/// AI value indicating two big-endian bytes of argument follow.
pub const PAYLOAD_TWO_BYTES: u8 = 25;
/// AI value indicating four big-endian bytes of argument follow.
pub const PAYLOAD_FOUR_BYTES: u8 = 26;
/// AI value indicating eight big-endian bytes of argument follow.
pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// First of the three reserved/unassigned AI values (28..=30); always rejected.
pub const PAYLOAD_RESERVED_LO: u8 = 28;
/// Last of the three reserved/unassigned AI values (28..=30); always rejected.
pub const PAYLOAD_RESERVED_HI: u8 = 30;
/// AI value denoting an indefinite-length item; rejected (out of scope, see spec.md §1).
pub const PAYLOAD_INDEFINITE: u8 = 31;

/// Smallest argument value that legitimately requires the one-byte (AI=24) simple-value form.
/// RFC 8949 §3.3: values 0..=31 are reserved on the wire in that position (0..=19 and 20..=23 are
/// representable directly on the AI bits; 24..=31 are simply forbidden as one-byte simple values).
pub const MIN_SIMPLE_LONG_ARGUMENT: u8 = 32;

/// Smallest argument that legitimately requires a one-byte head (deterministic-encoding minimality).
pub const MIN_DETERMINISTIC_U8: u64 = 24;
/// Smallest argument that legitimately requires a two-byte head.
pub const MIN_DETERMINISTIC_U16: u64 = 1 << 8;
/// Smallest argument that legitimately requires a four-byte head.
pub const MIN_DETERMINISTIC_U32: u64 = 1 << 16;
/// Smallest argument that legitimately requires an eight-byte head.
pub const MIN_DETERMINISTIC_U64: u64 = 1 << 32;

/// Extract the major type (top 3 bits) from an initial byte.
#[inline]
pub fn major_type(initial_byte: u8) -> u8 {
    initial_byte & !AI_MASK
}

/// Extract the additional-info (low 5 bits) from an initial byte.
#[inline]
pub fn additional_info(initial_byte: u8) -> u8 {
    initial_byte & AI_MASK
}
