//! Binary-to-text codec for channels restricted to printable characters.
//!
//! Payloads and fingerprints travel either as plain hexadecimal or in the
//! 85-character alphabet defined by ZeroMQ's Z85 (RFC 32). Four input bytes
//! map to five output characters; a trailing partial group is zero-padded
//! before encoding and the surplus characters are dropped, so arbitrary
//! lengths round-trip.
//!
//! The alphabet overlaps hexadecimal on `0-9a-fA-F`, so [`is_encoded_text`]
//! treats a string as encoded only when it is *not* also valid hex.

pub mod error;

pub use error::DecodeError;

/// The 85 printable characters, indexed by digit value.
///
/// The order is part of the wire contract shared with senders.
pub const ALPHABET: &[u8; 85] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.-:+=^!/*?&<>()[]{}@%$#";

const BASE: u32 = 85;
const GROUP_BYTES: usize = 4;
const GROUP_CHARS: usize = 5;
const INVALID: u8 = 0xFF;
/// Digit appended when decoding a trailing partial group (`#`, value 84).
const PAD_DIGIT: u8 = 84;

/// Reverse lookup from ASCII byte to digit value, `INVALID` when absent.
const DIGITS: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut digit = 0;
    while digit < ALPHABET.len() {
        table[ALPHABET[digit] as usize] = digit as u8;
        digit += 1;
    }
    table
};

fn digit_of(ch: char) -> Option<u8> {
    let code = usize::try_from(u32::from(ch)).ok()?;
    DIGITS.get(code).copied().filter(|digit| *digit != INVALID)
}

/// Encode `bytes` as text drawn from [`ALPHABET`].
///
/// The output length is `ceil(len / 4) * 5 - padding`.
///
/// # Examples
///
/// ```
/// use txrelay::codec;
///
/// let bytes = [0x86, 0x4F, 0xD2, 0x6F, 0xB5, 0x59, 0xF7, 0x5B];
/// assert_eq!(codec::encode(&bytes), "HelloWorld");
/// ```
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().div_ceil(GROUP_BYTES) * GROUP_CHARS);

    for chunk in bytes.chunks(GROUP_BYTES) {
        let padding = GROUP_BYTES - chunk.len();
        let mut group = [0u8; GROUP_BYTES];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(group);

        let mut digits = [0u8; GROUP_CHARS];
        for slot in digits.iter_mut().rev() {
            *slot = ALPHABET[(value % BASE) as usize];
            value /= BASE;
        }
        out.extend(
            digits[..GROUP_CHARS - padding]
                .iter()
                .map(|digit| char::from(*digit)),
        );
    }

    out
}

/// Decode text produced by [`encode`].
///
/// # Errors
///
/// Returns [`DecodeError::InvalidCharacter`] when `text` contains a character
/// outside [`ALPHABET`], or [`DecodeError::GroupOverflow`] when a group does
/// not fit in 32 bits.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    let mut digits = text
        .chars()
        .enumerate()
        .map(|(position, ch)| digit_of(ch).ok_or(DecodeError::InvalidCharacter { ch, position }))
        .collect::<Result<Vec<u8>, _>>()?;

    let remainder = digits.len() % GROUP_CHARS;
    let padding = if remainder == 0 {
        0
    } else {
        GROUP_CHARS - remainder
    };
    digits.resize(digits.len() + padding, PAD_DIGIT);

    let mut out = Vec::with_capacity(digits.len() / GROUP_CHARS * GROUP_BYTES);
    for (group, chunk) in digits.chunks(GROUP_CHARS).enumerate() {
        let value = chunk
            .iter()
            .fold(0u64, |acc, digit| acc * u64::from(BASE) + u64::from(*digit));
        let value = u32::try_from(value).map_err(|_| DecodeError::GroupOverflow {
            offset: group * GROUP_CHARS,
        })?;
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.truncate(out.len().saturating_sub(padding));

    Ok(out)
}

/// Return `true` when `s` is non-empty hexadecimal.
#[must_use]
pub fn is_hex(s: &str) -> bool { !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit()) }

/// Return `true` when `s` consists solely of alphabet characters and is not
/// also valid hexadecimal.
///
/// # Examples
///
/// ```
/// use txrelay::codec::is_encoded_text;
///
/// assert!(is_encoded_text("HelloWorld"));
/// assert!(!is_encoded_text("deadBEEF"));
/// assert!(!is_encoded_text("not~encoded"));
/// ```
#[must_use]
pub fn is_encoded_text(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|ch| digit_of(ch).is_some()) && !is_hex(s)
}

/// Decode a field that may carry either encoded text or plain hexadecimal.
///
/// # Errors
///
/// Returns [`DecodeError`] when the field is neither valid encoded text nor
/// valid hexadecimal.
pub fn decode_text_or_hex(field: &str) -> Result<Vec<u8>, DecodeError> {
    if is_encoded_text(field) {
        decode(field)
    } else {
        Ok(hex::decode(field)?)
    }
}

/// Normalise a field that may carry encoded text or hexadecimal to lowercase
/// hexadecimal.
///
/// Hex input is returned lowercased without a decode round trip.
///
/// # Errors
///
/// Returns [`DecodeError`] when encoded text fails to decode.
pub fn to_hex(field: &str) -> Result<String, DecodeError> {
    if is_encoded_text(field) {
        Ok(hex::encode(decode(field)?))
    } else {
        Ok(field.to_ascii_lowercase())
    }
}
