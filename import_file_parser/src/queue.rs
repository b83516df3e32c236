use async_trait::async_trait;

use crate::error::BoxError;

#[async_trait]
pub trait QueueSender {
    /// Sends one message body, returning the id the queue assigned to it.
    async fn send_message(&self, body: String) -> Result<Option<String>, BoxError>;
}

#[derive(Clone)]
pub struct SqsQueueSender {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueueSender {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: String) -> Self {
        SqsQueueSender { client, queue_url }
    }
}

#[async_trait]
impl QueueSender for SqsQueueSender {
    async fn send_message(&self, body: String) -> Result<Option<String>, BoxError> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await?;
        Ok(output.message_id().map(|id| id.to_string()))
    }
}

#[async_trait]
impl<T> QueueSender for &T
where
    T: QueueSender + Sync + ?Sized,
{
    async fn send_message(&self, body: String) -> Result<Option<String>, BoxError> {
        (**self).send_message(body).await
    }
}
