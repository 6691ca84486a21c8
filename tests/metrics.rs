#![cfg(feature = "metrics")]
//! Tests for `txrelay` metrics helpers and the counters the gateway updates.
//!
//! Counters are captured with `metrics_util::debugging::DebuggingRecorder`.

use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;
use txrelay::{
    MismatchPolicy,
    SegmentFields,
    metrics::{self as relay_metrics, SegmentResult},
};
use txrelay_testing::{
    RecordingBackend,
    vectors::{CORRUPT_HEX_BUNDLE, HEX_BUNDLE},
};

mod common;
use common::gateway_with;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// One snapshot of every recorded metric.
///
/// Taking a snapshot resets the recorder's counters, so each test takes a
/// single one and reads every counter from it.
type Snapshot = Vec<(CompositeKey, Option<Unit>, Option<SharedString>, DebugValue)>;

/// Value of the counter `name`, restricted to `label` when given.
fn counter(snapshot: &Snapshot, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == name)
        .filter(|(key, _, _, _)| {
            label.is_none_or(|(k, v)| key.key().labels().any(|l| l.key() == k && l.value() == v))
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => *count,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case(SegmentResult::Stored, "stored")]
#[case(SegmentResult::Duplicate, "duplicate")]
#[case(SegmentResult::Rejected, "rejected")]
fn segment_counter_is_labelled(#[case] result: SegmentResult, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || relay_metrics::inc_segments(result));
    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter(&snapshot, relay_metrics::SEGMENTS_TOTAL, Some(("result", label))),
        1
    );
}

#[rstest]
#[case(true, "ok")]
#[case(false, "failed")]
fn push_counter_is_labelled(#[case] success: bool, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || relay_metrics::inc_push(success));
    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter(&snapshot, relay_metrics::PUSH_TOTAL, Some(("result", label))),
        1
    );
}

#[tokio::test]
async fn relayed_bundle_updates_counters() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let _guard = metrics::set_default_local_recorder(&recorder);
    let gateway = gateway_with(&[RecordingBackend::accepting("node")], MismatchPolicy::Retain);

    for segment in HEX_BUNDLE.segments() {
        gateway.process_segment(segment).await.ok();
    }
    gateway.process_segment(HEX_BUNDLE.segment(2)).await.ok();
    gateway.process_fields(SegmentFields::default()).await.ok();

    let snapshot = snapshotter.snapshot().into_vec();
    let segments = u64::try_from(HEX_BUNDLE.payloads.len()).expect("few segments");
    assert_eq!(
        counter(&snapshot, relay_metrics::SEGMENTS_TOTAL, Some(("result", "stored"))),
        segments
    );
    assert_eq!(
        counter(&snapshot, relay_metrics::SEGMENTS_TOTAL, Some(("result", "duplicate"))),
        1
    );
    assert_eq!(
        counter(&snapshot, relay_metrics::SEGMENTS_TOTAL, Some(("result", "rejected"))),
        1
    );
    assert_eq!(counter(&snapshot, relay_metrics::BUNDLES_COMPLETED, None), 1);
    assert_eq!(
        counter(&snapshot, relay_metrics::PUSH_TOTAL, Some(("result", "ok"))),
        1
    );
}

#[tokio::test]
async fn failed_verification_is_counted_by_reason() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let _guard = metrics::set_default_local_recorder(&recorder);
    let backend = RecordingBackend::accepting("node");
    let gateway = gateway_with(&[backend.clone()], MismatchPolicy::Retain);

    for segment in CORRUPT_HEX_BUNDLE.segments() {
        gateway.process_segment(segment).await.ok();
    }

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter(&snapshot, relay_metrics::SEGMENTS_TOTAL, Some(("result", "stored"))),
        u64::try_from(CORRUPT_HEX_BUNDLE.payloads.len()).expect("few segments")
    );
    assert_eq!(counter(&snapshot, relay_metrics::BUNDLES_COMPLETED, None), 1);
    assert_eq!(
        counter(&snapshot, relay_metrics::BUILD_FAILURES, Some(("reason", "hash_mismatch"))),
        1
    );
    assert_eq!(counter(&snapshot, relay_metrics::PUSH_TOTAL, None), 0);
    assert_eq!(backend.calls(), 0);
}
