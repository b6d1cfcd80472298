//! Statement assembly.
//!
//! [`build_sql_query`] turns a dataset/table target, a statement kind and a set of
//! [`QueryOptions`] into one `;`-terminated SQL statement. Optional clauses are
//! always appended in the canonical order SET, WHERE, ORDER BY, GROUP BY.
//!
//! The assembler does not check that a clause makes sense for the statement
//! kind: a WHERE passed to an INSERT is rendered like any other.
//!
//! # Example
//!
//! ```
//! use spendlens::{Condition, OrderTerm, Statement};
//!
//! let sql = Statement::select("ds", "expenses")
//!     .fields(["id", "price"])
//!     .and_where(Condition::eq("owner", "alice"))
//!     .order_by(OrderTerm::desc("date"))
//!     .build()?;
//! assert_eq!(
//!     sql,
//!     r#"SELECT id, price FROM `ds.expenses` WHERE owner = "alice" ORDER BY date DESC;"#
//! );
//! # Ok::<(), spendlens::SpendError>(())
//! ```

use crate::clause::{
    generate_group_by_clause, generate_order_by_clause, generate_set_clause, generate_where_clause,
};
use crate::error::{SpendError, SpendResult};
use crate::input::{Assignment, Condition, OneOrMany, OrderTerm};
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The statement verbs the assembler knows how to prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = SpendError;

    /// Case-insensitive; anything else is [`SpendError::UnsupportedStatementKind`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SELECT" => Ok(StatementKind::Select),
            "INSERT" => Ok(StatementKind::Insert),
            "UPDATE" => Ok(StatementKind::Update),
            "DELETE" => Ok(StatementKind::Delete),
            _ => Err(SpendError::UnsupportedStatementKind(s.to_string())),
        }
    }
}

/// Optional clauses, listed in the order they are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Set,
    Where,
    OrderBy,
    GroupBy,
}

impl ClauseKind {
    pub const CANONICAL_ORDER: [ClauseKind; 4] = [
        ClauseKind::Set,
        ClauseKind::Where,
        ClauseKind::OrderBy,
        ClauseKind::GroupBy,
    ];
}

/// Arguments for [`build_sql_query`].
///
/// `fields`/`values` feed the statement prefix; `set`, `where`, `order` and `group`
/// are the optional clauses. Absent or empty entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<OneOrMany<Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<OneOrMany<Assignment>>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_: Option<OneOrMany<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OneOrMany<OrderTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<OneOrMany<String>>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one optional clause, or `None` if it was not supplied.
    pub fn render_clause(&self, kind: ClauseKind) -> SpendResult<Option<String>> {
        let rendered = match kind {
            ClauseKind::Set => non_empty(&self.set).map(generate_set_clause),
            ClauseKind::Where => non_empty(&self.where_)
                .map(generate_where_clause)
                .transpose()?,
            ClauseKind::OrderBy => non_empty(&self.order).map(generate_order_by_clause),
            ClauseKind::GroupBy => self
                .group
                .as_ref()
                .filter(|g| !g.is_empty() && !g.iter().all(|f| f.is_empty()))
                .map(generate_group_by_clause),
        };
        Ok(rendered)
    }
}

fn non_empty<T>(slot: &Option<OneOrMany<T>>) -> Option<&OneOrMany<T>> {
    slot.as_ref().filter(|v| !v.is_empty())
}

/// Build a single `;`-terminated SQL statement.
///
/// `statement` is matched case-insensitively against SELECT/INSERT/UPDATE/DELETE;
/// anything else fails with [`SpendError::UnsupportedStatementKind`].
pub fn build_sql_query(
    dataset_id: &str,
    table_id: &str,
    statement: &str,
    options: &QueryOptions,
) -> SpendResult<String> {
    let kind: StatementKind = statement.parse()?;
    build_statement(dataset_id, table_id, kind, options)
}

/// Like [`build_sql_query`], with an already parsed [`StatementKind`].
pub fn build_statement(
    dataset_id: &str,
    table_id: &str,
    kind: StatementKind,
    options: &QueryOptions,
) -> SpendResult<String> {
    let target = format!("`{dataset_id}.{table_id}`");
    let mut sql = String::new();

    match kind {
        StatementKind::Select => {
            let fields = options
                .fields
                .as_ref()
                .ok_or(SpendError::MissingArgument("fields"))?;
            sql.push_str("SELECT ");
            sql.push_str(&fields.as_slice().join(", "));
            sql.push_str(" FROM ");
            sql.push_str(&target);
        }
        StatementKind::Insert => {
            let fields = options
                .fields
                .as_ref()
                .ok_or(SpendError::MissingArgument("fields"))?;
            let values = options
                .values
                .as_ref()
                .ok_or(SpendError::MissingArgument("values"))?;
            sql.push_str("INSERT INTO ");
            sql.push_str(&target);
            sql.push_str(" (");
            sql.push_str(&fields.as_slice().join(", "));
            sql.push_str(") VALUES (");
            match values {
                // A lone value is written as-is; only lists are literal-quoted.
                OneOrMany::One(value) => value.write_raw(&mut sql),
                OneOrMany::Many(values) => {
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        value.write_literal(&mut sql);
                    }
                }
            }
            sql.push(')');
        }
        StatementKind::Update => {
            sql.push_str("UPDATE ");
            sql.push_str(&target);
        }
        StatementKind::Delete => {
            sql.push_str("DELETE FROM ");
            sql.push_str(&target);
        }
    }

    for clause in ClauseKind::CANONICAL_ORDER {
        if let Some(fragment) = options.render_clause(clause)? {
            sql.push_str(&fragment);
        }
    }

    sql.push(';');
    Ok(sql)
}

/// A JSON-decodable statement description.
///
/// ```
/// use spendlens::StatementRequest;
///
/// let req: StatementRequest = serde_json::from_str(
///     r#"{"dataset_id": "ds", "table_id": "tbl", "statement": "delete",
///         "where": {"field": "id", "operator": "=", "value": "42"}}"#,
/// )?;
/// assert_eq!(req.build()?, "DELETE FROM `ds.tbl` WHERE id = 42;");
/// # Ok::<(), spendlens::SpendError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRequest {
    #[serde(default)]
    pub dataset_id: String,
    #[serde(default)]
    pub table_id: String,
    pub statement: String,
    #[serde(flatten)]
    pub options: QueryOptions,
}

impl StatementRequest {
    pub fn build(&self) -> SpendResult<String> {
        build_sql_query(&self.dataset_id, &self.table_id, &self.statement, &self.options)
    }
}

/// Fluent statement builder.
///
/// Each call appends to the corresponding option; `build()` goes through
/// [`build_statement`], so the output is identical to the option-based API.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    dataset_id: String,
    table_id: String,
    kind: StatementKind,
    options: QueryOptions,
}

impl Statement {
    pub fn new(dataset_id: impl Into<String>, table_id: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
            kind,
            options: QueryOptions::default(),
        }
    }

    pub fn select(dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self::new(dataset_id, table_id, StatementKind::Select)
    }

    pub fn insert(dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self::new(dataset_id, table_id, StatementKind::Insert)
    }

    pub fn update(dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self::new(dataset_id, table_id, StatementKind::Update)
    }

    pub fn delete(dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self::new(dataset_id, table_id, StatementKind::Delete)
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Append one projected/inserted field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        append(&mut self.options.fields, field.into());
        self
    }

    /// Append several fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            append(&mut self.options.fields, field.into());
        }
        self
    }

    /// Append one INSERT value.
    pub fn value(mut self, value: impl Into<Scalar>) -> Self {
        append(&mut self.options.values, value.into());
        self
    }

    /// Append several INSERT values.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        for value in values {
            append(&mut self.options.values, value.into());
        }
        self
    }

    /// Append a SET assignment.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        append(&mut self.options.set, Assignment::new(field, value));
        self
    }

    /// Append a WHERE condition (joined with AND).
    pub fn and_where(mut self, condition: Condition) -> Self {
        append(&mut self.options.where_, condition);
        self
    }

    /// Append an ORDER BY term.
    pub fn order_by(mut self, term: OrderTerm) -> Self {
        append(&mut self.options.order, term);
        self
    }

    /// Append a GROUP BY field.
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        append(&mut self.options.group, field.into());
        self
    }

    pub fn build(&self) -> SpendResult<String> {
        build_statement(&self.dataset_id, &self.table_id, self.kind, &self.options)
    }
}

fn append<T>(slot: &mut Option<OneOrMany<T>>, item: T) {
    let mut items = slot.take().map(OneOrMany::into_vec).unwrap_or_default();
    items.push(item);
    *slot = Some(OneOrMany::Many(items));
}
