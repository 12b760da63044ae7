use anyhow::{anyhow, Result};

pub const DEFAULT_DATABASE_NAME: &str = "cinema-booking";

/// Settings read from the deployment's secret store.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_name: String,
    /// Single origin allowed by CORS.
    pub app_url: String,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("secret `{key}` was not found"))
        };

        Ok(AppConfig {
            database_url: required("MONGODB_URI")?,
            app_url: required("APP_URL")?,
            database_name: lookup("DATABASE_NAME")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        })
    }
}
