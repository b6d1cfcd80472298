//! # spendlens
//!
//! SQL statement builder and expense analytics for a columnar warehouse.
//!
//! ## Features
//!
//! - **Text in, text out**: statements are assembled from plain descriptions (or JSON)
//!   into one `;`-terminated SQL string; nothing is executed by the builder
//! - **Literal quoting**: numeric-looking strings stay bare, everything else is double-quoted
//! - **Canonical clause order**: SET, WHERE, ORDER BY, GROUP BY, whatever order they were given in
//! - **Transactional scripts**: wrap several statements in `BEGIN TRANSACTION` / `COMMIT TRANSACTION`
//! - **Expense operations**: get/add/update/delete on top of any [`Warehouse`] implementation
//! - **Reports**: totals, category and date series, subscription share
//!
//! ## Statement builder
//!
//! ```
//! use spendlens::{build_transactional_query, Condition, Statement};
//!
//! let insert = Statement::insert("finance", "expenses")
//!     .fields(["id", "price"])
//!     .values(["a1", "12.50"])
//!     .build()?;
//! assert_eq!(insert, r#"INSERT INTO `finance.expenses` (id, price) VALUES ("a1", "12.50");"#);
//!
//! let delete = Statement::delete("finance", "expenses")
//!     .and_where(Condition::in_list("id", ["a1", "a2"]))
//!     .build()?;
//! assert_eq!(delete, r#"DELETE FROM `finance.expenses` WHERE id IN ("a1", "a2");"#);
//!
//! let script = build_transactional_query(&[insert, delete]);
//! assert!(script.contains("BEGIN TRANSACTION;"));
//! # Ok::<(), spendlens::SpendError>(())
//! ```

pub mod clause;
pub mod config;
pub mod error;
pub mod expense;
pub mod input;
pub mod monitor;
pub mod operations;
pub mod report;
pub mod scalar;
pub mod statement;
pub mod transaction;
pub mod warehouse;

pub use config::AnalyticsConfig;
pub use error::{SpendError, SpendResult};
pub use expense::{Expense, ExpenseChanges, NewExpense};
pub use input::{Assignment, Condition, OneOrMany, OrderTerm, SortOrder};
pub use monitor::{LoggedWarehouse, QueryType};
pub use operations::ExpenseStore;
pub use report::{DateGrouping, ExpenseSummary};
pub use scalar::Scalar;
pub use statement::{
    ClauseKind, QueryOptions, Statement, StatementKind, StatementRequest, build_sql_query,
    build_statement,
};
pub use transaction::build_transactional_query;
pub use warehouse::{JobConfig, JobReport, JobState, QueryJob, Row, Warehouse, run_query_job};
