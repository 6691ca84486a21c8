//! Tests for the HTTP ingestion surface.

use std::sync::Arc;

use reqwest::{StatusCode, header};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use txrelay::{BundleId, Gateway, MismatchPolicy, http};
use txrelay_testing::{
    RecordingBackend,
    vectors::{CORRUPT_HEX_BUNDLE, HEX_BUNDLE, LEGACY_TXID_ENCODED},
};

mod common;
use common::{TestResult, gateway_with, serve};

struct App {
    gateway: Arc<Gateway>,
    backend: Arc<RecordingBackend>,
}

impl App {
    async fn post(&self, body: impl Into<reqwest::Body>) -> TestResult<(StatusCode, Value)> {
        let base = serve(http::router(self.gateway.clone())).await?;
        let response = reqwest::Client::new()
            .post(format!("{base}{}", http::SEGMENTS_PATH))
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    async fn post_json(&self, body: &Value) -> TestResult<(StatusCode, Value)> {
        self.post(body.to_string()).await
    }
}

#[fixture]
fn app() -> App {
    let backend = RecordingBackend::accepting("node");
    let gateway = Arc::new(gateway_with(&[backend.clone()], MismatchPolicy::Retain));
    App { gateway, backend }
}

fn hex_fields(index: usize, payload: &str) -> Value {
    if index == 0 {
        json!({
            "i": HEX_BUNDLE.id,
            "c": 0,
            "s": HEX_BUNDLE.payloads.len(),
            "h": HEX_BUNDLE.fingerprint,
            "t": payload,
        })
    } else {
        json!({ "i": HEX_BUNDLE.id, "c": index.to_string(), "t": payload })
    }
}

#[rstest]
#[tokio::test]
async fn bundle_posted_segment_by_segment_is_relayed(app: App) -> TestResult {
    for (index, payload) in HEX_BUNDLE.payloads.iter().enumerate() {
        let (status, body) = app.post_json(&hex_fields(index, payload)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }
    assert_eq!(app.backend.pushed(), vec![HEX_BUNDLE.raw_tx.to_owned()]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn encoded_fingerprint_is_accepted(app: App) -> TestResult {
    let mut first = hex_fields(0, HEX_BUNDLE.payloads[0]);
    first["h"] = json!(LEGACY_TXID_ENCODED);
    app.post_json(&first).await?;
    for index in 1..HEX_BUNDLE.payloads.len() {
        app.post_json(&hex_fields(index, HEX_BUNDLE.payloads[index])).await?;
    }
    assert_eq!(app.backend.calls(), 1);
    Ok(())
}

#[rstest]
#[case::missing_id(json!({ "c": 1, "t": "00" }), "parameter i is missing")]
#[case::missing_payload(json!({ "i": "b", "c": 1 }), "parameter t is missing")]
#[case::empty_payload(json!({ "i": "b", "c": 1, "t": "" }), "parameter t is missing")]
#[case::missing_count(json!({ "i": "b", "t": "00", "h": "ab" }), "parameter s is missing")]
#[case::missing_fingerprint(json!({ "i": "b", "c": "0", "s": 2, "t": "00" }), "parameter h is missing")]
#[tokio::test]
async fn missing_fields_are_bad_requests(
    app: App,
    #[case] fields: Value,
    #[case] message: &str,
) -> TestResult {
    let (status, body) = app.post_json(&fields).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": "error", "error": message }));
    assert!(!app.gateway.store().has_bundle(&BundleId::from("b")));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn unreadable_body_is_bad_request(app: App) -> TestResult {
    let (status, body) = app.post("{not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn failed_verification_is_server_error(app: App) -> TestResult {
    let last = CORRUPT_HEX_BUNDLE.payloads.len() - 1;
    let mut response = None;
    for (index, payload) in CORRUPT_HEX_BUNDLE.payloads.iter().enumerate() {
        let mut fields = hex_fields(index, payload);
        fields["i"] = json!(CORRUPT_HEX_BUNDLE.id);
        let reply = app.post_json(&fields).await?;
        if index == last {
            response = Some(reply);
        }
    }

    let (status, body) = response.ok_or("no response")?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|error| error.contains("mismatch"))
    );
    assert_eq!(app.backend.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn refused_push_is_server_error() -> TestResult {
    let backend = RecordingBackend::refusing("node");
    let app = App {
        gateway: Arc::new(gateway_with(&[backend.clone()], MismatchPolicy::Retain)),
        backend,
    };
    let mut last = None;
    for (index, payload) in HEX_BUNDLE.payloads.iter().enumerate() {
        last = Some(app.post_json(&hex_fields(index, payload)).await?);
    }
    let (status, _) = last.ok_or("no response")?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = app.post_json(&hex_fields(4, HEX_BUNDLE.payloads[4])).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}
