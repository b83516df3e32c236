use thiserror::Error;
use tokio_util::codec::LinesCodecError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single object's import. Each variant is fatal for the object
/// it names; row-level failures are reported through [`DispatchError`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },
    #[error("Failed to fetch s3://{bucket}/{key}")]
    FetchFailure {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to stream s3://{bucket}/{key}")]
    StreamFailure {
        bucket: String,
        key: String,
        #[source]
        source: ParseError,
    },
    #[error("Failed to archive s3://{bucket}/{key}")]
    ArchiveFailure {
        bucket: String,
        key: String,
        #[source]
        source: ArchiveError,
    },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read object body: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to decode line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: LinesCodecError,
    },
    #[error("Line {line} has {found} fields, header defines {expected}")]
    ColumnMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Key {0} is not under the upload prefix")]
    UnexpectedKey(String),
    #[error("Copy to {destination} failed: {source}")]
    Copy {
        destination: String,
        #[source]
        source: BoxError,
    },
    #[error("Delete failed: {0}")]
    Delete(#[source] BoxError),
}

/// Why a notification record could not be turned into an import.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRecord {
    #[error("S3 record has no bucket name")]
    MissingBucket,
    #[error("S3 record has no object key")]
    MissingKey,
    #[error("Object key {0} does not decode to UTF-8")]
    UndecodableKey(String),
}

/// Failure to hand a single row to the queue. Never aborts the import.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to send message: {0}")]
    Send(#[source] BoxError),
    #[error("Queue accepted the message without a message id")]
    MissingMessageId,
}
