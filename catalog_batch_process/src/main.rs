mod config;
mod notifier;
mod processor;
mod store;

use std::time::Instant;

use anyhow::Result;
use async_once::AsyncOnce;
use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use lazy_static::lazy_static;
use log::{debug, info};
use serde_json::json;
use shared::{emit_service_log, setup_logging};

use config::CatalogConfig;
use notifier::SnsProductNotifier;
use processor::{CatalogMessage, CatalogProcessor};
use store::DynamoProductStore;

#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

lazy_static! {
    static ref AWS_CONFIG: AsyncOnce<aws_config::SdkConfig> =
        AsyncOnce::new(async { aws_config::load_from_env().await });
    static ref SNS_CLIENT: AsyncOnce<aws_sdk_sns::Client> =
        AsyncOnce::new(async { aws_sdk_sns::Client::new(AWS_CONFIG.get().await) });
    static ref DYNAMODB_CLIENT: AsyncOnce<aws_sdk_dynamodb::Client> =
        AsyncOnce::new(async { aws_sdk_dynamodb::Client::new(AWS_CONFIG.get().await) });
}

const SERVICE_NAME: &str = "catalog_batch_process";

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_logging();

    let func = service_fn(handler);
    run(func).await?;

    Ok(())
}

fn catalog_messages(event: &SqsEvent) -> Vec<CatalogMessage> {
    event.records.iter().map(CatalogMessage::from).collect()
}

async fn handler(event: LambdaEvent<SqsEvent>) -> Result<()> {
    let start = Instant::now();
    debug!("{:?}", event);

    let messages = catalog_messages(&event.payload);
    if messages.is_empty() {
        info!("Empty event, returning...");
        return Ok(());
    }

    let config = CatalogConfig::from_env()?;
    let store = DynamoProductStore::new(
        DYNAMODB_CLIENT.get().await.clone(),
        config.product_table,
        config.stock_table,
    );
    let notifier = SnsProductNotifier::new(SNS_CLIENT.get().await.clone(), config.topic_arn);
    let processor = CatalogProcessor::new(store, notifier);

    info!("Processing {} catalog messages", messages.len());
    let summary = processor.process_batch(&messages).await;

    let time_ms = i64::try_from(start.elapsed().as_millis()).ok();
    emit_service_log(
        SERVICE_NAME,
        json!({
            "time": time_ms,
            "messages_count": messages.len(),
            "created_product_ids": summary.created_ids,
            "failed_message_ids": summary.failed_message_ids,
            "error": !summary.failed_message_ids.is_empty(),
        }),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqs_record(message_id: &str, body: &str) -> serde_json::Value {
        json!({
            "messageId": message_id,
            "receiptHandle": "MessageReceiptHandle",
            "body": body,
            "attributes": {
                "ApproximateReceiveCount": "1",
                "SentTimestamp": "1523232000000",
                "SenderId": "123456789012",
                "ApproximateFirstReceiveTimestamp": "1523232000001"
            },
            "messageAttributes": {},
            "md5OfBody": "7b270e59b47ff90a553787216d55d91d",
            "eventSource": "aws:sqs",
            "eventSourceARN": "arn:aws:sqs:eu-west-1:123456789012:catalogItemsQueue",
            "awsRegion": "eu-west-1"
        })
    }

    #[test]
    fn keeps_queue_order_and_bodies() {
        let event: SqsEvent = serde_json::from_value(json!({
            "Records": [
                sqs_record("m1", r#"{"title":"ProductOne"}"#),
                sqs_record("m2", r#"{"title":"ProductTwo"}"#),
            ]
        }))
        .unwrap();

        let messages = catalog_messages(&event);
        assert_eq!(
            messages,
            vec![
                CatalogMessage {
                    message_id: Some("m1".to_string()),
                    body: Some(r#"{"title":"ProductOne"}"#.to_string()),
                },
                CatalogMessage {
                    message_id: Some("m2".to_string()),
                    body: Some(r#"{"title":"ProductTwo"}"#.to_string()),
                },
            ]
        );
    }
}
