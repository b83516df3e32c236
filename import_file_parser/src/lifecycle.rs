//! Per-object import: fetch, stream rows to the queue, then archive.
//!
use std::fmt;

use futures::{pin_mut, StreamExt};
use log::{debug, error, info};

use crate::adapter::read_chunks;
use crate::dispatcher::RowDispatcher;
use crate::error::{ArchiveError, ImportError};
use crate::models::{ImportSummary, TriggerRecord};
use crate::parser::{parse_rows, FIELD_SEPARATOR};
use crate::queue::QueueSender;
use crate::storage::{ObjectBody, ObjectStore};

pub const UPLOADED_PREFIX: &str = "uploaded/";
pub const PARSED_PREFIX: &str = "parsed/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Fetching,
    Streaming,
    Archiving,
    Done,
    Errored,
}

impl ImportState {
    pub fn can_advance_to(self, next: ImportState) -> bool {
        use ImportState::*;
        matches!(
            (self, next),
            (Fetching, Streaming)
                | (Streaming, Archiving)
                | (Archiving, Done)
                | (Fetching, Errored)
                | (Streaming, Errored)
                | (Archiving, Errored)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ImportState::Done | ImportState::Errored)
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks where one object's import currently is.
#[derive(Debug)]
pub struct ImportRun<'a> {
    record: &'a TriggerRecord,
    state: ImportState,
}

impl<'a> ImportRun<'a> {
    pub fn new(record: &'a TriggerRecord) -> Self {
        ImportRun {
            record,
            state: ImportState::Fetching,
        }
    }

    pub fn state(&self) -> ImportState {
        self.state
    }

    fn advance(&mut self, next: ImportState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid import transition {} -> {}",
            self.state,
            next
        );
        debug!(
            "s3://{}/{}: {} -> {}",
            self.record.bucket, self.record.key, self.state, next
        );
        self.state = next;
    }
}

/// `uploaded/<name>` becomes `parsed/<name>`; other keys are not archivable.
pub fn archive_key(key: &str) -> Option<String> {
    key.strip_prefix(UPLOADED_PREFIX)
        .map(|name| format!("{}{}", PARSED_PREFIX, name))
}

pub struct ImportProcessor<S, Q> {
    store: S,
    dispatcher: RowDispatcher<Q>,
}

impl<S, Q> ImportProcessor<S, Q>
where
    S: ObjectStore,
    Q: QueueSender,
{
    pub fn new(store: S, dispatcher: RowDispatcher<Q>) -> Self {
        ImportProcessor { store, dispatcher }
    }

    /// Imports each record in order. A failed record does not stop the
    /// records after it.
    pub async fn process_all(
        &self,
        records: &[TriggerRecord],
    ) -> Vec<Result<ImportSummary, ImportError>> {
        let mut results = Vec::with_capacity(records.len());
        for record in records {
            results.push(self.process_record(record).await);
        }
        results
    }

    pub async fn process_record(
        &self,
        record: &TriggerRecord,
    ) -> Result<ImportSummary, ImportError> {
        let mut run = ImportRun::new(record);
        let result = self.drive(&mut run).await;
        match &result {
            Ok(summary) => info!(
                "Imported s3://{}/{}: {} rows parsed, {} dispatched, {} failed",
                record.bucket,
                record.key,
                summary.rows_parsed,
                summary.rows_dispatched,
                summary.rows_failed
            ),
            Err(e) => {
                error!("Import failed while {}: {:?}", run.state(), e);
                run.advance(ImportState::Errored);
            }
        }
        debug_assert!(run.state().is_terminal());
        result
    }

    async fn drive(&self, run: &mut ImportRun<'_>) -> Result<ImportSummary, ImportError> {
        let record = run.record;

        let body = self.fetch(record).await?;
        run.advance(ImportState::Streaming);

        let mut summary = self.stream(record, body).await?;
        run.advance(ImportState::Archiving);

        summary.archived_key = Some(self.archive(record).await?);
        run.advance(ImportState::Done);

        Ok(summary)
    }

    async fn fetch(&self, record: &TriggerRecord) -> Result<ObjectBody, ImportError> {
        self.store
            .get_object(&record.bucket, &record.key)
            .await
            .map_err(|source| ImportError::FetchFailure {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
                source,
            })?
            .ok_or_else(|| ImportError::ObjectNotFound {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
            })
    }

    /// Drives the body to its end, dispatching rows in file order.
    async fn stream(
        &self,
        record: &TriggerRecord,
        body: ObjectBody,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();
        let rows = parse_rows(read_chunks(body), FIELD_SEPARATOR);
        pin_mut!(rows);

        while let Some(row) = rows.next().await {
            let row = row.map_err(|source| ImportError::StreamFailure {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
                source,
            })?;
            summary.rows_parsed += 1;

            match self.dispatcher.dispatch(&row).await {
                Ok(message_id) => {
                    summary.rows_dispatched += 1;
                    debug!("Dispatched row {} as message {}", summary.rows_parsed, message_id);
                }
                Err(e) => {
                    summary.rows_failed += 1;
                    error!("Failed to dispatch row {:?}: {}", row, e);
                }
            }
        }

        Ok(summary)
    }

    async fn archive(&self, record: &TriggerRecord) -> Result<String, ImportError> {
        let archive_failure = |source| ImportError::ArchiveFailure {
            bucket: record.bucket.clone(),
            key: record.key.clone(),
            source,
        };

        let destination = archive_key(&record.key)
            .ok_or_else(|| archive_failure(ArchiveError::UnexpectedKey(record.key.clone())))?;

        self.store
            .copy_object(&record.bucket, &record.key, &destination)
            .await
            .map_err(|source| {
                archive_failure(ArchiveError::Copy {
                    destination: destination.clone(),
                    source,
                })
            })?;

        self.store
            .delete_object(&record.bucket, &record.key)
            .await
            .map_err(|source| archive_failure(ArchiveError::Delete(source)))?;

        Ok(destination)
    }
}
