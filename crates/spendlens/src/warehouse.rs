//! Execution collaborator contract.
//!
//! The query builder only produces text; a [`Warehouse`] takes that text plus a
//! [`JobConfig`] and runs it. [`run_query_job`] turns the raw job into the
//! [`JobReport`] returned by the expense operations.

use crate::error::SpendResult;
use crate::monitor::QueryType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One result row, keyed by column name in projection order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Per-job options passed along with the SQL text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub use_query_cache: bool,
    pub labels: BTreeMap<String, String>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached job labelled with the requesting user.
    pub fn for_user(user_id: &str) -> Self {
        Self::new().with_query_cache(true).with_label("user", user_id)
    }

    pub fn with_query_cache(mut self, enabled: bool) -> Self {
        self.use_query_cache = enabled;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// A job the warehouse accepted.
///
/// `outcome` carries the rows, or the warehouse's message when the job failed
/// after submission (bad SQL, constraint errors and the like).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryJob {
    pub job_id: String,
    pub labels: BTreeMap<String, String>,
    pub statement_type: QueryType,
    pub outcome: Result<Vec<Row>, String>,
}

/// A SQL-executing backend.
///
/// Returning `Err` means the job could not be submitted at all; a job that was
/// submitted and then failed is reported through [`QueryJob::outcome`].
pub trait Warehouse: Send + Sync {
    fn query(
        &self,
        sql: &str,
        config: &JobConfig,
    ) -> impl std::future::Future<Output = SpendResult<QueryJob>> + Send;
}

impl<W: Warehouse> Warehouse for std::sync::Arc<W> {
    fn query(
        &self,
        sql: &str,
        config: &JobConfig,
    ) -> impl std::future::Future<Output = SpendResult<QueryJob>> + Send {
        (**self).query(sql, config)
    }
}

/// Final state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Success,
    Error,
}

/// What an operation hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub job_id: String,
    pub state: JobState,
    pub labels: BTreeMap<String, String>,
    /// Only present for successful SELECT jobs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Row>>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.state == JobState::Success
    }
}

/// Submit `sql` and summarise the job.
pub async fn run_query_job<W: Warehouse>(
    warehouse: &W,
    sql: &str,
    config: &JobConfig,
) -> SpendResult<JobReport> {
    let job = warehouse.query(sql, config).await?;

    let (state, result) = match job.outcome {
        Ok(rows) => {
            let result = (job.statement_type == QueryType::Select).then_some(rows);
            (JobState::Success, result)
        }
        Err(message) => {
            tracing::error!(
                target: "spendlens.job",
                job_id = %job.job_id,
                error = %message,
                "warehouse query job failed"
            );
            (JobState::Error, None)
        }
    };

    Ok(JobReport {
        job_id: job.job_id,
        state,
        labels: job.labels,
        result,
    })
}
