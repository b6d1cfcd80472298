//! SQL logging around warehouse execution.
//!
//! [`LoggedWarehouse`] wraps any [`Warehouse`] and emits a `tracing` event with the
//! SQL text before each job, plus a completion event with the elapsed time.
//!
//! # Example
//!
//! ```ignore
//! use spendlens::monitor::LoggedWarehouse;
//! use tracing::Level;
//!
//! let warehouse = LoggedWarehouse::new(client)
//!     .level(Level::INFO)
//!     .max_sql_length(500);
//! ```

use crate::error::SpendResult;
use crate::warehouse::{JobConfig, QueryJob, Warehouse};
use std::time::Instant;
use tracing::Level;

/// The kind of SQL text being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// A `BEGIN ... END;` multi-statement script
    Script,
    Other,
}

impl QueryType {
    /// Detect query type from SQL text, ignoring leading whitespace and `--` comments.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else if starts_with_keyword(trimmed, "BEGIN") {
            QueryType::Script
        } else {
            QueryType::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
            QueryType::Script => "SCRIPT",
            QueryType::Other => "OTHER",
        }
    }
}

fn strip_sql_prefix(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        match sql.strip_prefix("--") {
            Some(rest) => sql = rest.split_once('\n').map_or("", |(_, tail)| tail),
            None => return sql,
        }
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    let Some(head) = sql.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    sql[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// A [`Warehouse`] wrapper that logs every job it forwards.
#[derive(Debug, Clone)]
pub struct LoggedWarehouse<W> {
    inner: W,
    /// Tracing event level for the SQL event.
    level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    max_sql_length: Option<usize>,
}

impl<W> LoggedWarehouse<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl<W: Warehouse> Warehouse for LoggedWarehouse<W> {
    async fn query(&self, sql: &str, config: &JobConfig) -> SpendResult<QueryJob> {
        let query_type = QueryType::from_sql(sql);
        let shown = self.truncate_sql(sql);
        let labels = tracing::field::debug(&config.labels);
        emit_at_level!(
            self.level,
            target: "spendlens.sql",
            query_type = query_type.as_str(),
            labels = labels,
            sql = %shown,
        );

        let start = Instant::now();
        let result = self.inner.query(sql, config).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(job) => tracing::debug!(
                target: "spendlens.sql",
                job_id = %job.job_id,
                elapsed_ms,
                failed = job.outcome.is_err(),
                "query job finished"
            ),
            Err(e) => tracing::warn!(
                target: "spendlens.sql",
                elapsed_ms,
                error = %e,
                "query job was not accepted"
            ),
        }

        result
    }
}
