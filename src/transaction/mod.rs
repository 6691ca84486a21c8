//! Transaction formats able to derive a canonical identifier from raw bytes.
//!
//! The reassembly engine only needs one capability from the transaction
//! layer: parse the reassembled bytes and report the identifier the sender
//! announced as the bundle fingerprint. [`BitcoinFormat`] implements this for
//! Bitcoin's consensus serialisation, legacy and segregated-witness alike.

mod bitcoin;
mod error;

pub use bitcoin::BitcoinFormat;
pub use error::TransactionError;

/// Capability that validates raw transaction bytes and computes their id.
pub trait TransactionFormat: Send + Sync {
    /// Parse `raw` as a complete transaction and return its identifier as
    /// lowercase hexadecimal.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError`] when `raw` is not exactly one well-formed
    /// transaction.
    fn transaction_id(&self, raw: &[u8]) -> Result<String, TransactionError>;
}

#[cfg(test)]
mod tests;
