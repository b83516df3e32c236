//! Turns queued product rows into catalog entries, one message at a time.
//!
use anyhow::{anyhow, Context, Result};
use aws_lambda_events::event::sqs::SqsMessage;
use log::error;
use shared::{CreateProductPayload, Product};

use crate::notifier::ProductNotifier;
use crate::store::ProductStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMessage {
    pub message_id: Option<String>,
    pub body: Option<String>,
}

impl From<&SqsMessage> for CatalogMessage {
    fn from(record: &SqsMessage) -> Self {
        CatalogMessage {
            message_id: record.message_id.clone(),
            body: record.body.clone(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created_ids: Vec<String>,
    pub failed_message_ids: Vec<String>,
}

pub struct CatalogProcessor<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> CatalogProcessor<S, N>
where
    S: ProductStore + Sync,
    N: ProductNotifier + Sync,
{
    pub fn new(store: S, notifier: N) -> Self {
        CatalogProcessor { store, notifier }
    }

    /// Processes messages in order. A failing message is logged and skipped,
    /// it never stops the rest of the batch.
    pub async fn process_batch(&self, messages: &[CatalogMessage]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for message in messages {
            match self.process_message(message).await {
                Ok(product) => summary.created_ids.push(product.id),
                Err(e) => {
                    error!("Unable to create a product from {:?}: {:#}", message, e);
                    summary
                        .failed_message_ids
                        .push(message.message_id.clone().unwrap_or_default());
                }
            }
        }
        summary
    }

    async fn process_message(&self, message: &CatalogMessage) -> Result<Product> {
        let body = message
            .body
            .as_deref()
            .ok_or_else(|| anyhow!("Message has no body"))?;
        let payload = serde_json::from_str::<CreateProductPayload>(body)
            .context("Invalid product payload")?;

        let (product, stock) = self
            .store
            .create_product(payload)
            .await
            .context("Failed to create product")?;

        self.notifier
            .product_created(&product, &stock)
            .await
            .with_context(|| format!("Failed to publish creation of product {}", product.id))?;

        Ok(product)
    }
}
