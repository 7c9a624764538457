/***************************************************************************************************
 * cbor_canon CBOR Error API
 *
 * Errors for validation, accessing, comparing and writing CBOR items.
 **************************************************************************************************/
use thiserror::Error;

/// An alias for `Result<T, CborError>` used throughout this crate.
pub type Result<T> = core::result::Result<T, CborError>;

/// `CborError` describes everything that can go wrong while validating, decoding, writing or
/// comparing a CBOR item.
#[derive(Copy, Clone, Error, Debug, PartialEq, Eq)]
pub enum CborError {
    /// The input buffer was exhausted before a data item completed.
    #[error("not enough data to complete the current item")]
    NotEnoughData,
    /// A structural rule was violated: reserved/indefinite additional-info, a non-minimal head
    /// under strict mode, a one-byte simple value below 32, or out-of-order/duplicate map keys
    /// under strict mode. `reason` carries a short, static description for diagnostics.
    #[error("CBOR structural constraint violated: {reason}")]
    ConstraintFailed {
        /// Human-readable description of which constraint failed.
        reason: &'static str,
    },
    /// Attempt to read/convert an item as an incompatible variant.
    #[error("item is not of the requested variant")]
    IncompatibleType,
    /// A numeric conversion overflowed the target type.
    #[error("value out of range for the target type")]
    OutOfRange,
    /// A byte-string major type did not contain valid UTF-8 when read as a text string.
    #[error("tstr payload is not valid UTF-8")]
    Utf8Error,
    /// An array or map index was out of bounds.
    #[error("index out of bounds")]
    IndexOutOfBounds,
    /// The output buffer was too small to hold the encoded item.
    #[error("output buffer too small to encode the item")]
    BufferTooSmall,
}
