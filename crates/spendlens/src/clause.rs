//! Clause generators.
//!
//! Each generator turns one item or a list of items into a single clause
//! fragment with a leading space, ready to be appended to a statement prefix.
//! Separators (`, ` / ` AND `) only ever appear between items.

use crate::error::{SpendError, SpendResult};
use crate::input::{Assignment, Condition, OneOrMany, OrderTerm};
use crate::scalar::Scalar;

/// Build a SET clause: ` SET field = value[, field = value ...]`.
///
/// ```
/// use spendlens::{clause::generate_set_clause, Assignment, OneOrMany};
///
/// let set = OneOrMany::Many(vec![Assignment::new("name", "Alice"), Assignment::new("age", 25)]);
/// assert_eq!(generate_set_clause(&set), r#" SET name = "Alice", age = 25"#);
/// ```
pub fn generate_set_clause(input: &OneOrMany<Assignment>) -> String {
    let mut sql = String::from(" SET ");
    for (i, assignment) in input.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&assignment.field);
        sql.push_str(" = ");
        assignment.value.write_literal(&mut sql);
    }
    sql
}

/// Build a WHERE clause: ` WHERE cond[ AND cond ...]`.
///
/// Fails with [`SpendError::InvalidOperatorValue`] when a list value is given to an
/// operator that cannot take one, when `IN` gets an empty list, or when `BETWEEN`
/// does not get exactly two bounds.
pub fn generate_where_clause(input: &OneOrMany<Condition>) -> SpendResult<String> {
    let mut sql = String::from(" WHERE ");
    for (i, condition) in input.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        write_condition(&mut sql, condition)?;
    }
    Ok(sql)
}

fn write_condition(sql: &mut String, condition: &Condition) -> SpendResult<()> {
    let operator = condition.normalized_operator();

    sql.push_str(&condition.field);
    sql.push(' ');
    sql.push_str(&operator);
    sql.push(' ');

    match (operator.as_str(), &condition.value) {
        (_, OneOrMany::One(value)) => value.write_literal(sql),
        ("IN" | "NOT IN", OneOrMany::Many(values)) => {
            if values.is_empty() {
                return Err(SpendError::invalid_operator_value(
                    operator,
                    format!("empty value list for field '{}'", condition.field),
                ));
            }
            sql.push('(');
            write_literal_list(sql, values, ", ");
            sql.push(')');
        }
        ("BETWEEN" | "NOT BETWEEN", OneOrMany::Many(values)) => {
            if values.len() != 2 {
                return Err(SpendError::invalid_operator_value(
                    operator,
                    format!(
                        "expected exactly 2 bounds for field '{}', got {}",
                        condition.field,
                        values.len()
                    ),
                ));
            }
            write_literal_list(sql, values, " AND ");
        }
        (_, OneOrMany::Many(_)) => {
            return Err(SpendError::invalid_operator_value(
                operator,
                format!(
                    "list value for field '{}' is only supported by IN and BETWEEN",
                    condition.field
                ),
            ));
        }
    }

    Ok(())
}

fn write_literal_list(sql: &mut String, values: &[Scalar], separator: &str) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            sql.push_str(separator);
        }
        value.write_literal(sql);
    }
}

/// Build an ORDER BY clause: ` ORDER BY field SORT[, field SORT ...]`.
///
/// Terms without an explicit sort are rendered `ASC`.
pub fn generate_order_by_clause(input: &OneOrMany<OrderTerm>) -> String {
    let mut sql = String::from(" ORDER BY ");
    for (i, term) in input.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&term.field);
        sql.push(' ');
        sql.push_str(term.sort_or_default().as_str());
    }
    sql
}

/// Build a GROUP BY clause from bare field names: ` GROUP BY field[, field ...]`.
pub fn generate_group_by_clause(input: &OneOrMany<String>) -> String {
    let mut sql = String::from(" GROUP BY ");
    sql.push_str(&input.as_slice().join(", "));
    sql
}
