//! Shared fixtures for exercising `txrelay` in tests.
//!
//! Provides a scriptable [`RecordingBackend`], a serialised log capture
//! fixture, and reference bundles built from real transactions.

pub mod backend;
pub mod logging;
pub mod vectors;

pub use backend::RecordingBackend;
pub use logging::{LoggerHandle, logger};
pub use vectors::BundleVector;
