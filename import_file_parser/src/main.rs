mod adapter;
mod config;
mod dispatcher;
mod error;
mod lifecycle;
mod models;
mod parser;
mod queue;
mod storage;
#[cfg(test)]
mod testing;

use std::time::Instant;

use anyhow::{anyhow, Result};
use async_once::AsyncOnce;
use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use lazy_static::lazy_static;
use log::{debug, error, info};
use serde_json::json;
use shared::{emit_service_log, setup_logging};

use config::ImportConfig;
use dispatcher::RowDispatcher;
use lifecycle::ImportProcessor;
use models::{ImportSummary, TriggerRecord};
use queue::{QueueSender, SqsQueueSender};
use storage::{ObjectStore, S3ObjectStore};

#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

lazy_static! {
    static ref AWS_CONFIG: AsyncOnce<aws_config::SdkConfig> =
        AsyncOnce::new(async { aws_config::load_from_env().await });
    static ref S3_CLIENT: AsyncOnce<aws_sdk_s3::Client> =
        AsyncOnce::new(async { aws_sdk_s3::Client::new(AWS_CONFIG.get().await) });
    static ref SQS_CLIENT: AsyncOnce<aws_sdk_sqs::Client> =
        AsyncOnce::new(async { aws_sdk_sqs::Client::new(AWS_CONFIG.get().await) });
}

const SERVICE_NAME: &str = "import_file_parser";

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_logging();

    let func = service_fn(handler);
    run(func).await?;

    Ok(())
}

fn trigger_records(event: &S3Event) -> Vec<TriggerRecord> {
    event
        .records
        .iter()
        .filter_map(|record| match TriggerRecord::from_s3_record(record) {
            Ok(trigger) => Some(trigger),
            Err(e) => {
                error!("Skipping S3 record, {}: {:?}", e, record);
                None
            }
        })
        .collect()
}

async fn handler(event: LambdaEvent<S3Event>) -> Result<()> {
    debug!("{:?}", event);

    let records = trigger_records(&event.payload);
    if records.is_empty() {
        info!("Empty event, returning...");
        return Ok(());
    }

    let config = ImportConfig::from_env()?;
    let store = S3ObjectStore::new(S3_CLIENT.get().await.clone());
    let queue = SqsQueueSender::new(SQS_CLIENT.get().await.clone(), config.queue_url);
    let processor = ImportProcessor::new(store, RowDispatcher::new(queue));

    import_records(&processor, &records).await
}

/// Attempts every record, logs the invocation summary, then fails if any
/// record failed.
async fn import_records<S, Q>(
    processor: &ImportProcessor<S, Q>,
    records: &[TriggerRecord],
) -> Result<()>
where
    S: ObjectStore,
    Q: QueueSender,
{
    let start = Instant::now();
    info!("Importing {} uploaded files", records.len());
    let results = processor.process_all(records).await;

    let succeeded = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .collect::<Vec<_>>();
    let failed_keys = records
        .iter()
        .zip(results.iter())
        .filter(|(_, r)| r.is_err())
        .map(|(record, _)| record.key.as_str())
        .collect::<Vec<_>>();

    let totals = succeeded
        .iter()
        .fold(ImportSummary::default(), |mut acc, s| {
            acc.rows_parsed += s.rows_parsed;
            acc.rows_dispatched += s.rows_dispatched;
            acc.rows_failed += s.rows_failed;
            acc
        });

    let time_ms = i64::try_from(start.elapsed().as_millis()).ok();
    emit_service_log(
        SERVICE_NAME,
        json!({
            "time": time_ms,
            "objects_count": records.len(),
            "objects_imported": succeeded.len(),
            "rows_parsed": totals.rows_parsed,
            "rows_dispatched": totals.rows_dispatched,
            "rows_failed": totals.rows_failed,
            "failed_keys": failed_keys,
            "error": !failed_keys.is_empty(),
        }),
    );

    if failed_keys.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Failed to import {} of {} objects: {}",
            failed_keys.len(),
            records.len(),
            failed_keys.join(", ")
        ))
    }
}
