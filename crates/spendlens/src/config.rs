//! Service configuration.

use crate::error::{SpendError, SpendResult};

pub const DEFAULT_SERVICE_NAME: &str = "analytical-service";

/// Where expenses live, and who is asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    pub service_name: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl AnalyticsConfig {
    pub fn new(dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Read `DATASET_ID`, `TABLE_ID` and optional `SERVICE_NAME`.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first;
    /// variables already set in the process take precedence.
    pub fn from_env() -> SpendResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SpendResult<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SpendError::Config(format!("environment variable {key} is not set")))
        };

        let config = Self::new(required("DATASET_ID")?, required("TABLE_ID")?);
        Ok(match lookup("SERVICE_NAME").filter(|v| !v.trim().is_empty()) {
            Some(name) => config.with_service_name(name),
            None => config,
        })
    }
}
