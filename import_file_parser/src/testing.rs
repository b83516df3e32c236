//! In-memory stand-ins for S3 and SQS used by the unit tests.
//!
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};

use crate::error::BoxError;
use crate::queue::QueueSender;
use crate::storage::{ObjectBody, ObjectStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Get(String, String),
    Copy(String, String, String),
    Delete(String, String),
}

enum StoredObject {
    Complete(Vec<u8>),
    /// Yields the bytes, then fails the next read.
    Truncated(Vec<u8>),
}

#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_get: bool,
    fail_copy: bool,
    fail_delete: bool,
}

impl FakeStore {
    pub fn with_object(bucket: &str, key: &str, content: &str) -> Self {
        let store = FakeStore::default();
        store.put(bucket, key, StoredObject::Complete(content.as_bytes().to_vec()));
        store
    }

    pub fn with_truncated_object(bucket: &str, key: &str, content: &str) -> Self {
        let store = FakeStore::default();
        store.put(bucket, key, StoredObject::Truncated(content.as_bytes().to_vec()));
        store
    }

    pub fn and_object(self, bucket: &str, key: &str, content: &str) -> Self {
        self.put(bucket, key, StoredObject::Complete(content.as_bytes().to_vec()));
        self
    }

    pub fn failing_gets(mut self) -> Self {
        self.fail_get = true;
        self
    }

    pub fn failing_copies(mut self) -> Self {
        self.fail_copy = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    fn put(&self, bucket: &str, key: &str, object: StoredObject) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), object);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, BoxError> {
        self.record(StoreCall::Get(bucket.to_string(), key.to_string()));
        if self.fail_get {
            return Err("service unavailable".into());
        }
        let objects = self.objects.lock().unwrap();
        let body: Option<ObjectBody> = match objects.get(&(bucket.to_string(), key.to_string())) {
            Some(StoredObject::Complete(bytes)) => Some(Box::pin(io::Cursor::new(bytes.clone()))),
            Some(StoredObject::Truncated(bytes)) => Some(Box::pin(TruncatedBody {
                remaining: Some(bytes.clone()),
            })),
            None => None,
        };
        Ok(body)
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), BoxError> {
        self.record(StoreCall::Copy(
            bucket.to_string(),
            source_key.to_string(),
            destination_key.to_string(),
        ));
        if self.fail_copy {
            return Err("access denied".into());
        }
        let mut objects = self.objects.lock().unwrap();
        let copied = match objects.get(&(bucket.to_string(), source_key.to_string())) {
            Some(StoredObject::Complete(bytes)) | Some(StoredObject::Truncated(bytes)) => {
                bytes.clone()
            }
            None => return Err("no such key".into()),
        };
        objects.insert(
            (bucket.to_string(), destination_key.to_string()),
            StoredObject::Complete(copied),
        );
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BoxError> {
        self.record(StoreCall::Delete(bucket.to_string(), key.to_string()));
        if self.fail_delete {
            return Err("access denied".into());
        }
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

struct TruncatedBody {
    remaining: Option<Vec<u8>>,
}

impl AsyncRead for TruncatedBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.remaining.take() {
            Some(bytes) => {
                buf.put_slice(&bytes);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))),
        }
    }
}

#[derive(Default)]
pub struct FakeQueue {
    sent: Mutex<Vec<String>>,
    attempts: Mutex<usize>,
    fail_when_contains: Option<String>,
    omit_message_ids: bool,
}

impl FakeQueue {
    pub fn failing_when_body_contains(pattern: &str) -> Self {
        FakeQueue {
            fail_when_contains: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    pub fn without_message_ids() -> Self {
        FakeQueue {
            omit_message_ids: true,
            ..Default::default()
        }
    }

    /// Bodies the queue accepted, in send order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl QueueSender for FakeQueue {
    async fn send_message(&self, body: String) -> Result<Option<String>, BoxError> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(pattern) = &self.fail_when_contains {
            if body.contains(pattern.as_str()) {
                return Err("throttled".into());
            }
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(body);
        if self.omit_message_ids {
            Ok(None)
        } else {
            Ok(Some(format!("msg-{}", sent.len())))
        }
    }
}

/// A complete S3 notification record; `None` fields are sent as null.
pub fn s3_record(bucket: Option<&str>, key: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "eventVersion": "2.1",
        "eventSource": "aws:s3",
        "awsRegion": "eu-west-1",
        "eventTime": "2024-03-01T10:00:00.000Z",
        "eventName": "ObjectCreated:Put",
        "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
        "requestParameters": { "sourceIPAddress": "127.0.0.1" },
        "responseElements": {},
        "s3": {
            "s3SchemaVersion": "1.0",
            "configurationId": "import",
            "bucket": {
                "name": bucket,
                "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                "arn": "arn:aws:s3:::import-bucket"
            },
            "object": {
                "key": key,
                "size": 120,
                "eTag": "0123456789abcdef0123456789abcdef",
                "sequencer": "0055AED6DCD90281E5"
            }
        }
    })
}

pub fn s3_event(records: Vec<serde_json::Value>) -> aws_lambda_events::event::s3::S3Event {
    serde_json::from_value(serde_json::json!({ "Records": records })).unwrap()
}
