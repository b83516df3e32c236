use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use log::info;
use serde_dynamo::aws_sdk_dynamodb_0_25::to_item;
use shared::{CreateProductPayload, Product, Stock};

#[async_trait]
pub trait ProductStore {
    /// Creates the product and its stock entry under a newly generated id.
    async fn create_product(&self, payload: CreateProductPayload) -> Result<(Product, Stock)>;
}

#[async_trait]
impl<T> ProductStore for &T
where
    T: ProductStore + Sync + ?Sized,
{
    async fn create_product(&self, payload: CreateProductPayload) -> Result<(Product, Stock)> {
        (**self).create_product(payload).await
    }
}

pub struct DynamoProductStore {
    client: aws_sdk_dynamodb::Client,
    product_table: String,
    stock_table: String,
}

impl DynamoProductStore {
    pub fn new(client: aws_sdk_dynamodb::Client, product_table: String, stock_table: String) -> Self {
        DynamoProductStore {
            client,
            product_table,
            stock_table,
        }
    }
}

#[async_trait]
impl ProductStore for DynamoProductStore {
    async fn create_product(&self, payload: CreateProductPayload) -> Result<(Product, Stock)> {
        let id = uuid::Uuid::new_v4().to_string();
        let (product, stock) = payload.into_items(id);

        let product_item: HashMap<String, AttributeValue> = to_item(&product)?;
        let stock_item: HashMap<String, AttributeValue> = to_item(&stock)?;

        // Both items land or neither does.
        self.client
            .transact_write_items()
            .transact_items(
                TransactWriteItem::builder()
                    .put(
                        Put::builder()
                            .table_name(&self.product_table)
                            .set_item(Some(product_item))
                            .build(),
                    )
                    .build(),
            )
            .transact_items(
                TransactWriteItem::builder()
                    .put(
                        Put::builder()
                            .table_name(&self.stock_table)
                            .set_item(Some(stock_item))
                            .build(),
                    )
                    .build(),
            )
            .send()
            .await?;

        info!("Created product: {}", product.id);
        Ok((product, stock))
    }
}
