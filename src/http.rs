//! HTTP ingestion surface.
//!
//! `POST /segments` accepts a JSON object carrying the segment fields and
//! answers with a small JSON status document:
//!
//! | outcome                         | status | body                                    |
//! |---------------------------------|--------|-----------------------------------------|
//! | stored, skipped or pushed       | 200    | `{"status":"ok"}`                       |
//! | missing field or unreadable body| 400    | `{"status":"error","error":"<message>"}` |
//! | any other failure               | 500    | `{"status":"error","error":"<message>"}` |

use std::sync::Arc;

use axum::{
    Json,
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;

use crate::{
    gateway::{Gateway, SegmentOutcome},
    segment::SegmentFields,
};

/// Path segments are posted to.
pub const SEGMENTS_PATH: &str = "/segments";

/// Response document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatusBody {
    /// The segment was accepted.
    Ok,
    /// The segment was refused or processing failed.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

/// Build the ingestion router around a shared gateway.
pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route(SEGMENTS_PATH, post(post_segment))
        .with_state(gateway)
}

async fn post_segment(
    State(gateway): State<Arc<Gateway>>,
    body: Result<Json<SegmentFields>, JsonRejection>,
) -> (StatusCode, Json<StatusBody>) {
    let Json(fields) = match body {
        Ok(fields) => fields,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "unreadable segment body");
            return error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match gateway.process_fields(fields).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "segment handled");
            if let SegmentOutcome::Pushed(receipt) = outcome {
                tracing::info!(backend = %receipt.backend, attempts = receipt.attempts, "bundle relayed");
            }
            (StatusCode::OK, Json(StatusBody::Ok))
        }
        Err(err) if err.is_malformed_segment() => error(StatusCode::BAD_REQUEST, err.to_string()),
        Err(err) => {
            tracing::error!(error = %err, "segment processing failed");
            error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn error(status: StatusCode, message: String) -> (StatusCode, Json<StatusBody>) {
    (status, Json(StatusBody::Error { error: message }))
}
