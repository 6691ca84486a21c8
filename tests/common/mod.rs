//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::Router;
use tokio::net::TcpListener;
use txrelay::{Gateway, MismatchPolicy, PushBackend};

/// Result type for fallible tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> TestResult<String> {
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

/// Gateway with default storage and the given backends, all serving every
/// network.
pub fn gateway_with(backends: &[Arc<dyn PushBackend>], policy: MismatchPolicy) -> Gateway {
    backends
        .iter()
        .fold(Gateway::builder(), |builder, backend| builder.backend(backend.clone()))
        .mismatch_policy(policy)
        .build()
}
