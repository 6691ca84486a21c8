use thiserror::Error;

/// Reasons raw bytes fail to parse as a transaction.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// Input ended before a field could be read.
    #[error("transaction truncated: needed {needed} bytes at offset {offset}")]
    Truncated {
        /// Bytes the field required.
        needed: usize,
        /// Offset at which the field starts.
        offset: usize,
    },
    /// Bytes remain after the lock time.
    #[error("{count} trailing bytes after transaction")]
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },
    /// The segregated-witness marker was followed by an unknown flag.
    #[error("unsupported witness flag {flag:#04x}")]
    UnsupportedFlag {
        /// Flag byte found after the marker.
        flag: u8,
    },
    /// A length prefix does not fit in memory.
    #[error("length prefix {length} at offset {offset} is too large")]
    LengthOverflow {
        /// Declared length.
        length: u64,
        /// Offset of the prefix.
        offset: usize,
    },
}
