//! Expense operations on top of the statement builder.
//!
//! Each operation builds its SQL with [`Statement`], wraps multi-row writes in a
//! transactional script, and runs the result through [`run_query_job`] labelled
//! with the requesting user.

use crate::config::AnalyticsConfig;
use crate::error::{SpendError, SpendResult};
use crate::expense::{EXPENSE_COLUMNS, Expense, ExpenseChanges, NewExpense, check_expense_id, check_text};
use crate::input::{Condition, OneOrMany, OrderTerm};
use crate::report::ExpenseSummary;
use crate::statement::Statement;
use crate::transaction::build_transactional_query;
use crate::warehouse::{JobConfig, JobReport, Warehouse, run_query_job};
use chrono::NaiveDate;
use uuid::Uuid;

/// Expense reads and writes against one warehouse table.
#[derive(Debug, Clone)]
pub struct ExpenseStore<W> {
    warehouse: W,
    config: AnalyticsConfig,
}

impl<W: Warehouse> ExpenseStore<W> {
    pub fn new(warehouse: W, config: AnalyticsConfig) -> Self {
        Self { warehouse, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    fn statement_for(&self, build: fn(String, String) -> Statement) -> Statement {
        build(self.config.dataset_id.clone(), self.config.table_id.clone())
    }

    /// The SELECT used by [`get_expenses`](Self::get_expenses).
    pub fn get_expenses_sql(&self, user_id: &str, lower: NaiveDate, upper: NaiveDate) -> SpendResult<String> {
        check_text("user id", user_id)?;
        self.statement_for(Statement::select)
            .fields(EXPENSE_COLUMNS.iter().copied())
            .and_where(Condition::between(
                "date",
                lower.format("%Y-%m-%d").to_string(),
                upper.format("%Y-%m-%d").to_string(),
            ))
            .and_where(Condition::eq("owner", user_id))
            .order_by(OrderTerm::asc("date"))
            .order_by(OrderTerm::asc("category"))
            .build()
    }

    /// Fetch a user's expenses dated within `lower..=upper`.
    pub async fn get_expenses(
        &self,
        user_id: &str,
        lower: NaiveDate,
        upper: NaiveDate,
    ) -> SpendResult<JobReport> {
        let sql = self.get_expenses_sql(user_id, lower, upper)?;
        run_query_job(&self.warehouse, &sql, &JobConfig::for_user(user_id)).await
    }

    /// Fetch and aggregate a user's expenses for a date range.
    pub async fn summarize_expenses(
        &self,
        user_id: &str,
        lower: NaiveDate,
        upper: NaiveDate,
    ) -> SpendResult<ExpenseSummary> {
        let report = self.get_expenses(user_id, lower, upper).await?;
        if !report.is_success() {
            return Err(SpendError::warehouse(format!(
                "query job {} failed",
                report.job_id
            )));
        }
        let rows = report.result.unwrap_or_default();
        Ok(ExpenseSummary::from_expenses(&Expense::from_rows(&rows)?))
    }

    /// Insert one or more expenses owned by `user_id`.
    ///
    /// Every expense gets a fresh id. Several expenses are inserted in one
    /// transactional script.
    pub async fn add_expense(
        &self,
        user_id: &str,
        expenses: impl Into<OneOrMany<NewExpense>>,
    ) -> SpendResult<JobReport> {
        check_text("user id", user_id)?;
        let expenses = expenses.into();
        if expenses.is_empty() {
            return Err(SpendError::validation("no expenses to add"));
        }

        let mut inserts = Vec::with_capacity(expenses.len());
        for expense in &expenses {
            expense.validate()?;
            let id = Uuid::new_v4().simple().to_string();
            let (fields, values) = expense.to_fields_and_values(&id, user_id);
            inserts.push(
                self.statement_for(Statement::insert)
                    .fields(fields)
                    .values(values)
                    .build()?,
            );
        }

        tracing::debug!(target: "spendlens.expense", user = user_id, count = inserts.len(), "adding expenses");
        let sql = single_or_transaction(inserts);
        run_query_job(&self.warehouse, &sql, &JobConfig::for_user(user_id)).await
    }

    /// Apply column changes to expenses by id.
    ///
    /// Accepts one id with one change set, or two equally long lists of more
    /// than one entry, applied pairwise in a transactional script.
    pub async fn update_expense(
        &self,
        user_id: &str,
        expense_ids: impl Into<OneOrMany<String>>,
        changes: impl Into<OneOrMany<ExpenseChanges>>,
    ) -> SpendResult<JobReport> {
        check_text("user id", user_id)?;
        let expense_ids = expense_ids.into();
        let changes = changes.into();

        let paired = match (expense_ids.len(), changes.len()) {
            (1, 1) => true,
            (ids, sets) => ids > 1 && ids == sets,
        };
        if !paired {
            return Err(SpendError::validation(format!(
                "cannot apply {} change set(s) to {} expense id(s)",
                changes.len(),
                expense_ids.len()
            )));
        }

        let mut updates = Vec::with_capacity(expense_ids.len());
        for (id, change) in expense_ids.iter().zip(changes.iter()) {
            check_expense_id(id)?;
            change.validate()?;
            let statement = change
                .assignments()
                .iter()
                .fold(self.statement_for(Statement::update), |stmt, a| {
                    stmt.set(a.field.clone(), a.value.clone())
                })
                .and_where(Condition::eq("id", id.as_str()));
            updates.push(statement.build()?);
        }

        let sql = single_or_transaction(updates);
        run_query_job(&self.warehouse, &sql, &JobConfig::for_user(user_id)).await
    }

    /// Delete expenses by id: `=` for a single id, `IN` for a list.
    pub async fn delete_expense(
        &self,
        user_id: &str,
        expense_ids: impl Into<OneOrMany<String>>,
    ) -> SpendResult<JobReport> {
        check_text("user id", user_id)?;
        let expense_ids = expense_ids.into();
        if expense_ids.is_empty() {
            return Err(SpendError::validation("no expense ids to delete"));
        }
        for id in &expense_ids {
            check_expense_id(id)?;
        }

        let condition = match &expense_ids {
            OneOrMany::One(id) => Condition::eq("id", id.as_str()),
            OneOrMany::Many(ids) => Condition::in_list("id", ids.iter().map(String::as_str)),
        };
        let sql = self
            .statement_for(Statement::delete)
            .and_where(condition)
            .build()?;
        run_query_job(&self.warehouse, &sql, &JobConfig::for_user(user_id)).await
    }
}

fn single_or_transaction(mut statements: Vec<String>) -> String {
    if statements.len() == 1 {
        statements.remove(0)
    } else {
        build_transactional_query(&statements)
    }
}
