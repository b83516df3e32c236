mod config;
mod upload;

use anyhow::Result;
use async_once::AsyncOnce;
use lambda_runtime::{run, service_fn, Error as LambdaError, LambdaEvent};
use lazy_static::lazy_static;
use log::debug;
use serde_json::json;
use shared::{emit_service_log, setup_logging};

use config::UploadConfig;
use upload::{signed_upload_url, S3UrlSigner, UploadRequest};

#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

lazy_static! {
    static ref AWS_CONFIG: AsyncOnce<aws_config::SdkConfig> =
        AsyncOnce::new(async { aws_config::load_from_env().await });
    static ref S3_CLIENT: AsyncOnce<aws_sdk_s3::Client> =
        AsyncOnce::new(async { aws_sdk_s3::Client::new(AWS_CONFIG.get().await) });
}

const SERVICE_NAME: &str = "import_products_file";

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    setup_logging();

    let func = service_fn(handler);
    run(func).await?;

    Ok(())
}

async fn handler(event: LambdaEvent<UploadRequest>) -> Result<String> {
    debug!("{:?}", event.payload);

    let config = UploadConfig::from_env()?;
    let signer = S3UrlSigner::new(S3_CLIENT.get().await.clone());
    let result = signed_upload_url(&signer, &config.bucket_name, &event.payload).await;

    emit_service_log(
        SERVICE_NAME,
        json!({
            "filename": event.payload.filename,
            "error": result.is_err(),
        }),
    );

    result
}
