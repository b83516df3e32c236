use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sns::types::MessageAttributeValue;
use shared::{Product, Stock};

pub const SUBJECT: &str = "Product created";

#[async_trait]
pub trait ProductNotifier {
    async fn product_created(&self, product: &Product, stock: &Stock) -> Result<()>;
}

#[async_trait]
impl<T> ProductNotifier for &T
where
    T: ProductNotifier + Sync + ?Sized,
{
    async fn product_created(&self, product: &Product, stock: &Stock) -> Result<()> {
        (**self).product_created(product, stock).await
    }
}

pub struct SnsProductNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsProductNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: String) -> Self {
        SnsProductNotifier { client, topic_arn }
    }
}

#[async_trait]
impl ProductNotifier for SnsProductNotifier {
    async fn product_created(&self, product: &Product, stock: &Stock) -> Result<()> {
        // Subscriptions filter on the numeric price attribute.
        let price = MessageAttributeValue::builder()
            .data_type("Number")
            .string_value(number_text(product.price))
            .build();

        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(SUBJECT)
            .message(notification_message(product, stock))
            .message_attributes("price", price)
            .send()
            .await?;
        Ok(())
    }
}

pub fn notification_message(product: &Product, stock: &Stock) -> String {
    format!(
        "title: {}\ndescription: {}\ncount: {}\nprice: {}",
        product.title,
        product.description,
        number_text(stock.count),
        number_text(product.price)
    )
}

/// Whole numbers print without a fractional part.
pub fn number_text(n: f64) -> String {
    n.to_string()
}
