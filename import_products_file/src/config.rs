use anyhow::{Context, Result};

pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub bucket_name: String,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket_name = lookup(BUCKET_NAME_VAR)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} must be set in this lambda's environment", BUCKET_NAME_VAR))?;
        Ok(UploadConfig { bucket_name })
    }
}
