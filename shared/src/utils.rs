//! Shared utilities
//!
use log::info;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

pub fn setup_logging() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // Setup from the environment (RUST_LOG)
        .with_env_filter(EnvFilter::from_default_env())
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
}

/// Builds the structured summary line a lambda emits once per invocation.
///
/// `fields` must be a JSON object; its entries are merged after the common
/// `type`/`service` keys. Any other value is nested under `details`.
pub fn service_log_line(service: &str, fields: Value) -> Value {
    let mut log = json!({
        "type": "service_log",
        "service": service,
    });
    if let Some(base) = log.as_object_mut() {
        match fields {
            Value::Object(entries) => base.extend(entries),
            Value::Null => {}
            other => {
                base.insert("details".to_string(), other);
            }
        }
    }
    log
}

pub fn emit_service_log(service: &str, fields: Value) {
    let log = service_log_line(service, fields);
    info!("{}", serde_json::to_string(&log).unwrap_or_default());
}
