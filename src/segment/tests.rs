//! Unit tests for ingestion-field validation.

use std::num::NonZeroU32;

use rstest::rstest;

use super::{BundleHeader, NumberField, Segment, SegmentError, SegmentFields, SegmentIndex};

fn first_fields() -> SegmentFields {
    SegmentFields {
        i: Some("bundle".into()),
        c: None,
        s: Some(NumberField::Int(3)),
        h: Some("ab".repeat(32)),
        n: Some("t".into()),
        t: Some("0100".into()),
    }
}

#[test]
fn first_segment_carries_header() {
    let segment = Segment::try_from(first_fields()).expect("valid segment");
    assert_eq!(segment.index(), SegmentIndex::zero());
    assert_eq!(segment.bundle_id().as_str(), "bundle");
    let header = segment.header().expect("header on segment zero");
    assert_eq!(header.total_count.get(), 3);
    assert_eq!(header.network.as_deref(), Some("t"));
}

#[test]
fn later_segment_ignores_header_fields() {
    let fields = SegmentFields {
        c: Some(NumberField::Text("2".into())),
        s: None,
        h: None,
        ..first_fields()
    };
    let segment = Segment::try_from(fields).expect("valid segment");
    assert_eq!(segment.index(), SegmentIndex::new(2));
    assert!(segment.header().is_none());
}

#[rstest]
#[case::bundle_id(SegmentFields { i: None, ..first_fields() }, "i")]
#[case::empty_bundle_id(SegmentFields { i: Some(String::new()), ..first_fields() }, "i")]
#[case::payload(SegmentFields { t: None, ..first_fields() }, "t")]
#[case::count(SegmentFields { s: None, ..first_fields() }, "s")]
#[case::zero_count(SegmentFields { s: Some(NumberField::Int(0)), ..first_fields() }, "s")]
#[case::fingerprint(SegmentFields { h: None, ..first_fields() }, "h")]
fn rejects_missing_fields(#[case] fields: SegmentFields, #[case] field: &'static str) {
    assert_eq!(
        Segment::try_from(fields),
        Err(SegmentError::MissingField { field })
    );
}

#[test]
fn rejects_non_numeric_index() {
    let fields = SegmentFields {
        c: Some(NumberField::Text("two".into())),
        ..first_fields()
    };
    assert!(matches!(
        Segment::try_from(fields),
        Err(SegmentError::InvalidNumber { field: "c", .. })
    ));
}

#[test]
fn explicit_zero_index_requires_header() {
    let fields = SegmentFields {
        c: Some(NumberField::Int(0)),
        h: None,
        ..first_fields()
    };
    assert_eq!(
        Segment::try_from(fields),
        Err(SegmentError::MissingField { field: "h" })
    );
}

#[test]
fn continuation_constructor_refuses_index_zero() {
    assert!(Segment::continuation("bundle", SegmentIndex::zero(), "00").is_none());
    let header = BundleHeader::new(NonZeroU32::MIN, "ff");
    assert!(Segment::first("bundle", header, "00").header().is_some());
}

#[test]
fn fields_deserialise_from_json() {
    let fields: SegmentFields =
        serde_json::from_str(r#"{"i":"b","c":"1","t":"00"}"#).expect("valid json");
    assert_eq!(fields.c, Some(NumberField::Text("1".into())));
    let fields: SegmentFields =
        serde_json::from_str(r#"{"i":"b","c":1,"t":"00"}"#).expect("valid json");
    assert_eq!(fields.c, Some(NumberField::Int(1)));
}
