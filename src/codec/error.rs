//! Errors raised while turning transported text back into bytes.

use thiserror::Error;

/// Failure to decode an encoded-text or hexadecimal field.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// A character outside the 85-character alphabet was found.
    #[error("invalid character {ch:?} at position {position}")]
    InvalidCharacter {
        /// Offending character.
        ch: char,
        /// Character offset within the input.
        position: usize,
    },
    /// A five-character group encodes a value wider than 32 bits.
    #[error("group starting at offset {offset} overflows 32 bits")]
    GroupOverflow {
        /// Character offset of the first digit in the group.
        offset: usize,
    },
    /// The field was treated as hexadecimal but is not valid hex.
    #[error("invalid hexadecimal: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
