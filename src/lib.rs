#![doc(html_root_url = "https://docs.rs/txrelay/latest")]
//! Public API for the `txrelay` library.
//!
//! A relay gateway for transactions that arrive split into small text
//! segments over constrained links. Segments are collected per bundle, the
//! complete bundle is reassembled and checked against the transaction id its
//! sender announced, and the verified transaction is forwarded once to one of
//! several interchangeable push backends.

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod segment;
pub mod store;
pub mod transaction;

pub use codec::DecodeError;
pub use config::{ConfigError, GatewayConfig};
pub use dispatch::{Dispatcher, PushBackend, PushError, PushReceipt};
pub use gateway::{BuildError, Gateway, GatewayBuilder, MismatchPolicy, RelayError, SegmentOutcome};
pub use metrics::{BUILD_FAILURES, BUNDLES_COMPLETED, PUSH_TOTAL, SEGMENTS_TOTAL};
pub use segment::{BundleHeader, BundleId, Segment, SegmentError, SegmentFields, SegmentIndex};
pub use store::{Bundle, BundleStore, MemoryStore, MemoryStoreConfig};
pub use transaction::{BitcoinFormat, TransactionError, TransactionFormat};
