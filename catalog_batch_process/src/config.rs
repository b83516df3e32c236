use anyhow::{Context, Result};

pub const PRODUCT_TABLE_VAR: &str = "PRODUCT_TABLE";
pub const STOCK_TABLE_VAR: &str = "STOCK_TABLE";
pub const TOPIC_ARN_VAR: &str = "CREATE_PRODUCT_TOPIC_ARN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub product_table: String,
    pub stock_table: String,
    pub topic_arn: String,
}

impl CatalogConfig {
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
        Ok(CatalogConfig {
            product_table: required(PRODUCT_TABLE_VAR)?,
            stock_table: required(STOCK_TABLE_VAR)?,
            topic_arn: required(TOPIC_ARN_VAR)?,
        })
    }
}
