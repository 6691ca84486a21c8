use sha2::{Digest, Sha256};

use super::{TransactionError, TransactionFormat};

const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;
const OUTPOINT_LEN: usize = 36;
const SEQUENCE_LEN: usize = 4;
const VALUE_LEN: usize = 8;
const VERSION_LEN: usize = 4;
const LOCK_TIME_LEN: usize = 4;

/// Bitcoin consensus transaction format.
///
/// The identifier is the byte-reversed double SHA-256 of the serialisation
/// without witness data, so segwit transactions hash their stripped form.
///
/// # Examples
///
/// ```
/// use txrelay::transaction::{BitcoinFormat, TransactionFormat};
///
/// assert!(BitcoinFormat.transaction_id(&[0x01, 0x00]).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BitcoinFormat;

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self { Self { bytes, offset: 0 } }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], TransactionError> {
        let truncated = TransactionError::Truncated {
            needed,
            offset: self.offset,
        };
        let end = self.offset.checked_add(needed).ok_or(truncated)?;
        let slice = self.bytes.get(self.offset..end).ok_or(truncated)?;
        self.offset = end;
        Ok(slice)
    }

    fn peek(&self, ahead: usize) -> Option<u8> { self.bytes.get(self.offset + ahead).copied() }

    /// Read a `CompactSize` length prefix.
    fn compact_size(&mut self) -> Result<usize, TransactionError> {
        let offset = self.offset;
        let length = match self.take(1)?[0] {
            0xFD => u64::from(u16::from_le_bytes(self.array()?)),
            0xFE => u64::from(u32::from_le_bytes(self.array()?)),
            0xFF => u64::from_le_bytes(self.array()?),
            small => u64::from(small),
        };
        usize::try_from(length).map_err(|_| TransactionError::LengthOverflow { length, offset })
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn skip_var_bytes(&mut self) -> Result<(), TransactionError> {
        let len = self.compact_size()?;
        self.take(len).map(|_| ())
    }

    fn remaining(&self) -> usize { self.bytes.len().saturating_sub(self.offset) }
}

impl TransactionFormat for BitcoinFormat {
    fn transaction_id(&self, raw: &[u8]) -> Result<String, TransactionError> {
        let mut reader = Reader::new(raw);
        let version = reader.take(VERSION_LEN)?;

        let segwit = reader.peek(0) == Some(WITNESS_MARKER);
        if segwit {
            let flag = reader.peek(1).unwrap_or_default();
            if flag != WITNESS_FLAG {
                return Err(TransactionError::UnsupportedFlag { flag });
            }
            reader.take(2)?;
        }

        let body_start = reader.offset;
        let inputs = reader.compact_size()?;
        for _ in 0..inputs {
            reader.take(OUTPOINT_LEN)?;
            reader.skip_var_bytes()?;
            reader.take(SEQUENCE_LEN)?;
        }
        let outputs = reader.compact_size()?;
        for _ in 0..outputs {
            reader.take(VALUE_LEN)?;
            reader.skip_var_bytes()?;
        }
        let body = &raw[body_start..reader.offset];

        if segwit {
            for _ in 0..inputs {
                let items = reader.compact_size()?;
                for _ in 0..items {
                    reader.skip_var_bytes()?;
                }
            }
        }
        let lock_time = reader.take(LOCK_TIME_LEN)?;

        if reader.remaining() > 0 {
            return Err(TransactionError::TrailingBytes {
                count: reader.remaining(),
            });
        }

        let mut hasher = Sha256::new();
        hasher.update(version);
        hasher.update(body);
        hasher.update(lock_time);
        let mut digest = Sha256::digest(hasher.finalize());
        digest.reverse();
        Ok(hex::encode(digest))
    }
}
