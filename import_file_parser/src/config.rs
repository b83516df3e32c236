use anyhow::{Context, Result};

pub const QUEUE_URL_VAR: &str = "CATALOG_ITEMS_QUEUE_URL";
pub const REGION_VAR: &str = "AWS_REGION";

/// Environment the import lambda needs. The region itself is consumed by the
/// AWS config loader, it is only checked for presence here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub queue_url: String,
    pub region: String,
}

impl ImportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set in this lambda's environment", name))
        };
        Ok(ImportConfig {
            queue_url: required(QUEUE_URL_VAR)?,
            region: required(REGION_VAR)?,
        })
    }
}
