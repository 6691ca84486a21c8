use thiserror::Error;

/// Reasons an incoming segment is rejected before it reaches the store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    /// A required field is absent or empty.
    #[error("parameter {field} is missing")]
    MissingField {
        /// Wire name of the missing field.
        field: &'static str,
    },
    /// A numeric field could not be interpreted.
    #[error("parameter {field} is not a valid number: {value}")]
    InvalidNumber {
        /// Wire name of the malformed field.
        field: &'static str,
        /// Value as received.
        value: String,
    },
}
