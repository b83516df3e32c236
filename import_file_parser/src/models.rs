//! Project-specific model definitions
//!
use aws_lambda_events::event::s3::S3EventRecord;
use indexmap::IndexMap;

use crate::error::InvalidRecord;

/// One delimited line, keyed by the header's column names in file order.
pub type ParsedRow = IndexMap<String, String>;

/// An uploaded object to import, taken from an S3 notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerRecord {
    pub bucket: String,
    pub key: String,
}

impl TriggerRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        TriggerRecord {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn from_s3_record(record: &S3EventRecord) -> Result<TriggerRecord, InvalidRecord> {
        let bucket = record
            .s3
            .bucket
            .name
            .as_ref()
            .ok_or(InvalidRecord::MissingBucket)?;
        let key = record
            .s3
            .object
            .key
            .as_ref()
            .ok_or(InvalidRecord::MissingKey)?;
        let key = decode_event_key(key).ok_or_else(|| InvalidRecord::UndecodableKey(key.clone()))?;
        Ok(TriggerRecord::new(bucket, key))
    }
}

/// S3 notifications carry URL-encoded keys with spaces encoded as `+`.
pub fn decode_event_key(key: &str) -> Option<String> {
    urlencoding::decode(&key.replace('+', " "))
        .ok()
        .map(|k| k.into_owned())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_parsed: usize,
    pub rows_dispatched: usize,
    pub rows_failed: usize,
    pub archived_key: Option<String>,
}
