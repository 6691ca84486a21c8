use std::num::NonZeroU32;

use serde::Deserialize;

use super::{BundleHeader, BundleId, Segment, SegmentError, SegmentIndex};

/// Numeric field that senders may transmit as a JSON number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    /// Native JSON integer.
    Int(u64),
    /// Decimal digits carried as text.
    Text(String),
}

impl NumberField {
    /// Parse the field, treating `0` and empty text as absent.
    fn parse(&self, field: &'static str) -> Result<Option<u32>, SegmentError> {
        let invalid = |value: String| SegmentError::InvalidNumber { field, value };
        let value = match self {
            Self::Int(value) => u32::try_from(*value).map_err(|_| invalid(value.to_string()))?,
            Self::Text(text) if text.trim().is_empty() => return Ok(None),
            Self::Text(text) => text.trim().parse().map_err(|_| invalid(text.clone()))?,
        };
        Ok((value != 0).then_some(value))
    }
}

/// Raw ingestion fields exactly as transmitted.
///
/// | field | meaning                                   |
/// |-------|-------------------------------------------|
/// | `i`   | bundle id, required                       |
/// | `c`   | segment index, default 0                  |
/// | `s`   | total segment count, required when `c==0` |
/// | `h`   | expected fingerprint, required when `c==0`|
/// | `n`   | network hint, optional, `c==0` only       |
/// | `t`   | payload chunk, required                   |
///
/// Empty strings count as absent. Header fields on later segments are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SegmentFields {
    /// Bundle id.
    #[serde(default)]
    pub i: Option<String>,
    /// Segment index.
    #[serde(default)]
    pub c: Option<NumberField>,
    /// Total segment count.
    #[serde(default)]
    pub s: Option<NumberField>,
    /// Expected fingerprint.
    #[serde(default)]
    pub h: Option<String>,
    /// Network hint.
    #[serde(default)]
    pub n: Option<String>,
    /// Payload chunk.
    #[serde(default)]
    pub t: Option<String>,
}

fn present(value: Option<String>) -> Option<String> { value.filter(|v| !v.is_empty()) }

fn required(value: Option<String>, field: &'static str) -> Result<String, SegmentError> {
    present(value).ok_or(SegmentError::MissingField { field })
}

impl TryFrom<SegmentFields> for Segment {
    type Error = SegmentError;

    fn try_from(fields: SegmentFields) -> Result<Self, Self::Error> {
        let bundle_id = BundleId::new(required(fields.i, "i")?);
        let payload = required(fields.t, "t")?;
        let index = match &fields.c {
            Some(c) => c.parse("c")?.unwrap_or(0),
            None => 0,
        };

        if index != 0 {
            return Ok(Segment::later(bundle_id, SegmentIndex::new(index), payload));
        }

        let total_count = fields
            .s
            .as_ref()
            .map(|s| s.parse("s"))
            .transpose()?
            .flatten()
            .and_then(NonZeroU32::new)
            .ok_or(SegmentError::MissingField { field: "s" })?;
        let fingerprint = required(fields.h, "h")?;

        let mut header = BundleHeader::new(total_count, fingerprint);
        header.network = present(fields.n);
        Ok(Segment::first(bundle_id, header, payload))
    }
}
