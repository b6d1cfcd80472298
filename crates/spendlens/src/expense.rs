//! Expense records and input validation.

use crate::error::{SpendError, SpendResult};
use crate::input::Assignment;
use crate::scalar::Scalar;
use crate::warehouse::Row;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Columns a caller may write. `id` and `owner` are managed by the store.
pub const WRITABLE_COLUMNS: &[&str] = &["date", "description", "price", "category", "is_subscription"];

/// Columns fetched for reporting, in projection order.
pub const EXPENSE_COLUMNS: &[&str] = &[
    "id",
    "date",
    "description",
    "price",
    "category",
    "is_subscription",
];

/// A stored expense row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub is_subscription: bool,
}

impl Expense {
    /// Decode a warehouse row.
    pub fn from_row(row: &Row) -> SpendResult<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(row.clone()))?)
    }

    pub fn from_rows(rows: &[Row]) -> SpendResult<Vec<Self>> {
        rows.iter().map(Self::from_row).collect()
    }
}

/// An expense submitted by a user, before it gets an id and owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub description: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub is_subscription: bool,
}

impl NewExpense {
    pub fn validate(&self) -> SpendResult<()> {
        check_text("description", &self.description)?;
        check_category(&self.category)?;
        check_price(self.price)
    }

    /// INSERT columns and values: `id`, the expense columns, then `owner`.
    pub fn to_fields_and_values(&self, id: &str, owner: &str) -> (Vec<String>, Vec<Scalar>) {
        let fields = ["id", "date", "description", "price", "category", "is_subscription", "owner"]
            .iter()
            .map(|f| f.to_string())
            .collect();
        let values = vec![
            Scalar::from(id),
            Scalar::from(self.date.format("%Y-%m-%d").to_string()),
            Scalar::from(&self.description),
            Scalar::from(self.price),
            Scalar::from(&self.category),
            Scalar::from(self.is_subscription),
            Scalar::from(owner),
        ];
        (fields, values)
    }
}

/// Column changes for one expense, in the order they were given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "serde_json::Map<String, serde_json::Value>",
    into = "serde_json::Map<String, serde_json::Value>"
)]
pub struct ExpenseChanges(Vec<Assignment>);

impl ExpenseChanges {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.0.push(Assignment::new(field, value));
        self
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Only writable columns, each with a value of the right shape.
    pub fn validate(&self) -> SpendResult<()> {
        if self.0.is_empty() {
            return Err(SpendError::validation("expense changes must not be empty"));
        }
        for Assignment { field, value } in &self.0 {
            match (field.as_str(), value) {
                ("date", Scalar::Str(s)) => check_date(s)?,
                ("description", Scalar::Str(s)) => check_text("description", s)?,
                ("category", Scalar::Str(s)) => check_category(s)?,
                ("price", Scalar::Int(i)) => check_price(*i as f64)?,
                ("price", Scalar::Float(f)) => check_price(*f)?,
                ("is_subscription", Scalar::Bool(_)) => {}
                (f, _) if WRITABLE_COLUMNS.contains(&f) => {
                    return Err(SpendError::validation(format!(
                        "unexpected value {value} for column '{f}'"
                    )));
                }
                (f, _) => {
                    return Err(SpendError::validation(format!("unknown column '{f}'")));
                }
            }
        }
        Ok(())
    }
}

impl Default for ExpenseChanges {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<serde_json::Map<String, serde_json::Value>> for ExpenseChanges {
    type Error = SpendError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> SpendResult<Self> {
        map.into_iter()
            .map(|(field, value)| Ok(Assignment::new(field, Scalar::try_from(value)?)))
            .collect::<SpendResult<Vec<_>>>()
            .map(Self)
    }
}

impl From<ExpenseChanges> for serde_json::Map<String, serde_json::Value> {
    fn from(changes: ExpenseChanges) -> Self {
        changes
            .0
            .into_iter()
            .map(|a| (a.field, a.value.into()))
            .collect()
    }
}

/// Category names: letters and dashes only.
pub fn is_category(s: &str) -> bool {
    static CATEGORY_RE: OnceLock<regex::Regex> = OnceLock::new();
    CATEGORY_RE
        .get_or_init(|| regex::Regex::new(r"^[a-zA-Z-]+$").expect("invalid built-in category regex"))
        .is_match(s)
}

/// Expense ids are UUIDs, hyphenated or as 32 hex digits.
pub fn is_expense_id(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

/// Dates are `YYYY-MM-DD`.
pub fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub(crate) fn check_expense_id(id: &str) -> SpendResult<()> {
    if is_expense_id(id) {
        Ok(())
    } else {
        Err(SpendError::validation(format!("invalid expense id '{id}'")))
    }
}

fn check_category(s: &str) -> SpendResult<()> {
    if is_category(s) {
        Ok(())
    } else {
        Err(SpendError::validation(format!("invalid category '{s}'")))
    }
}

fn check_date(s: &str) -> SpendResult<()> {
    if is_iso_date(s) {
        Ok(())
    } else {
        Err(SpendError::validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
    }
}

fn check_price(price: f64) -> SpendResult<()> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(SpendError::validation(format!("invalid price {price}")))
    }
}

// Values are interpolated between double quotes.
pub(crate) fn check_text(field: &str, s: &str) -> SpendResult<()> {
    if s.contains(['"', '\\']) {
        Err(SpendError::validation(format!(
            "{field} must not contain quotes or backslashes"
        )))
    } else {
        Ok(())
    }
}
