//! Aggregations over fetched expenses.
//!
//! Series are returned column-wise (`{"category": [...], "price": [...]}`) so
//! they can be handed straight to a charting front end. Groups appear in the
//! order their first member appears in the input.

use crate::error::SpendError;
use crate::expense::{EXPENSE_COLUMNS, Expense};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Round to `digits` decimals, ties to even.
fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round_ties_even() / factor
}

/// Sum `price` per key, keeping first-seen key order.
fn sum_by<K: PartialEq>(expenses: &[Expense], key: impl Fn(&Expense) -> K) -> Vec<(K, f64)> {
    let mut groups: Vec<(K, f64)> = Vec::new();
    for expense in expenses {
        let k = key(expense);
        match groups.iter_mut().find(|(g, _)| *g == k) {
            Some((_, total)) => *total += expense.price,
            None => groups.push((k, expense.price)),
        }
    }
    groups
}

/// Sum of all prices, rounded to cents.
pub fn total_expenses(expenses: &[Expense]) -> f64 {
    round_to(expenses.iter().map(|e| e.price).sum(), 2)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: Vec<String>,
    pub price: Vec<f64>,
}

pub fn group_by_category(expenses: &[Expense]) -> CategoryTotals {
    let (category, price) = sum_by(expenses, |e| e.category.clone())
        .into_iter()
        .map(|(c, total)| (c, round_to(total, 2)))
        .unzip();
    CategoryTotals { category, price }
}

/// Date bucket for [`group_by_date`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateGrouping {
    /// `YYYY-MM`
    #[default]
    Month,
    /// `MM-DD`
    Day,
}

impl DateGrouping {
    pub fn format(self) -> &'static str {
        match self {
            DateGrouping::Month => "%Y-%m",
            DateGrouping::Day => "%m-%d",
        }
    }
}

impl FromStr for DateGrouping {
    type Err = SpendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MONTH" => Ok(DateGrouping::Month),
            "DAY" => Ok(DateGrouping::Day),
            _ => Err(SpendError::validation(format!(
                "unknown date grouping '{s}', expected MONTH or DAY"
            ))),
        }
    }
}

impl fmt::Display for DateGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateGrouping::Month => "MONTH",
            DateGrouping::Day => "DAY",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTotals {
    pub date: Vec<String>,
    pub price: Vec<f64>,
}

pub fn group_by_date(expenses: &[Expense], grouping: DateGrouping) -> DateTotals {
    let (date, price) = sum_by(expenses, |e| e.date.format(grouping.format()).to_string())
        .into_iter()
        .map(|(d, total)| (d, round_to(total, 2)))
        .unzip();
    DateTotals { date, price }
}

/// Share of spending, in whole percent, for subscription and one-off expenses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionShare {
    pub is_subscription: Vec<bool>,
    pub price: Vec<f64>,
}

pub fn subscription_share(expenses: &[Expense]) -> SubscriptionShare {
    let total = total_expenses(expenses);
    let (is_subscription, price) = sum_by(expenses, |e| e.is_subscription)
        .into_iter()
        .map(|(s, sum)| {
            let percent = if total == 0.0 { 0.0 } else { round_to(sum / total * 100.0, 0) };
            (s, percent)
        })
        .unzip();
    SubscriptionShare {
        is_subscription,
        price,
    }
}

/// Header row followed by one row per expense, every cell as text.
pub fn expenses_table(expenses: &[Expense]) -> Vec<Vec<String>> {
    let mut table = Vec::with_capacity(expenses.len() + 1);
    table.push(EXPENSE_COLUMNS.iter().map(|c| c.to_string()).collect());
    for e in expenses {
        table.push(vec![
            e.id.clone(),
            e.date.format("%Y-%m-%d").to_string(),
            e.description.clone(),
            e.price.to_string(),
            e.category.clone(),
            e.is_subscription.to_string(),
        ]);
    }
    table
}

/// Everything the expenses dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total_expenses: f64,
    pub categories_chart: CategoryTotals,
    pub expenses_time_series: DateTotals,
    pub subscriptions_ratio: SubscriptionShare,
    pub table: Vec<Vec<String>>,
}

impl ExpenseSummary {
    /// Summary with a monthly time series.
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        Self::with_grouping(expenses, DateGrouping::Month)
    }

    pub fn with_grouping(expenses: &[Expense], grouping: DateGrouping) -> Self {
        Self {
            total_expenses: total_expenses(expenses),
            categories_chart: group_by_category(expenses),
            expenses_time_series: group_by_date(expenses, grouping),
            subscriptions_ratio: subscription_share(expenses),
            table: expenses_table(expenses),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(id: &str, date: &str, price: f64, category: &str, is_subscription: bool) -> Expense {
        Expense {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: format!("description{}", &id[2..]),
            price,
            category: category.to_string(),
            is_subscription,
        }
    }

    fn fixture() -> Vec<Expense> {
        vec![
            expense("id1", "2000-01-02", 1.23, "category1", false),
            expense("id2", "2000-01-05", 5.67, "category2", true),
            expense("id3", "2000-01-02", 8.76, "category1", false),
            expense("id4", "2000-01-08", 9.08, "category3", false),
        ]
    }

    #[test]
    fn total_is_rounded() {
        assert_eq!(total_expenses(&fixture()), 24.74);
        assert_eq!(total_expenses(&[]), 0.0);
    }

    #[test]
    fn categories_in_first_seen_order() {
        let grouped = group_by_category(&fixture());
        assert_eq!(grouped.category, vec!["category1", "category2", "category3"]);
        assert_eq!(grouped.price, vec![9.99, 5.67, 9.08]);
    }

    #[test]
    fn dates_by_month_and_day() {
        let monthly = group_by_date(&fixture(), DateGrouping::Month);
        assert_eq!(monthly.date, vec!["2000-01"]);
        assert_eq!(monthly.price, vec![24.74]);

        let daily = group_by_date(&fixture(), DateGrouping::Day);
        assert_eq!(daily.date, vec!["01-02", "01-05", "01-08"]);
        assert_eq!(daily.price, vec![9.99, 5.67, 9.08]);
    }

    #[test]
    fn date_grouping_parses_case_insensitively() {
        assert_eq!("day".parse::<DateGrouping>().unwrap(), DateGrouping::Day);
        assert_eq!("MONTH".parse::<DateGrouping>().unwrap(), DateGrouping::Month);
        assert!("week".parse::<DateGrouping>().is_err());
    }

    #[test]
    fn subscription_percentages() {
        let share = subscription_share(&fixture());
        assert_eq!(share.is_subscription, vec![false, true]);
        // 19.07 / 24.74 and 5.67 / 24.74
        assert_eq!(share.price, vec![77.0, 23.0]);
    }

    #[test]
    fn ties_round_to_even() {
        let cheap = vec![expense("id1", "2000-01-02", 0.125, "food", false)];
        assert_eq!(total_expenses(&cheap), 0.12);

        let mut eight = vec![expense("id1", "2000-01-02", 1.0, "music", true)];
        for i in 2..=8 {
            eight.push(expense(&format!("id{i}"), "2000-01-02", 1.0, "food", false));
        }
        let share = subscription_share(&eight);
        assert_eq!(share.is_subscription, vec![true, false]);
        assert_eq!(share.price, vec![12.0, 88.0]);
    }

    #[test]
    fn subscription_share_of_nothing() {
        assert_eq!(subscription_share(&[]), SubscriptionShare::default());
        let free = vec![expense("id1", "2000-01-02", 0.0, "gifts", false)];
        assert_eq!(subscription_share(&free).price, vec![0.0]);
    }

    #[test]
    fn table_has_header_and_text_rows() {
        let table = expenses_table(&fixture());
        assert_eq!(table.len(), 5);
        assert_eq!(
            table[0],
            vec!["id", "date", "description", "price", "category", "is_subscription"]
        );
        assert_eq!(
            table[2],
            vec!["id2", "2000-01-05", "description2", "5.67", "category2", "true"]
        );
    }

    #[test]
    fn summary_serializes_dashboard_keys() {
        let summary = ExpenseSummary::from_expenses(&fixture());
        let json = serde_json::to_value(&summary).unwrap();
        for key in [
            "total_expenses",
            "categories_chart",
            "expenses_time_series",
            "subscriptions_ratio",
            "table",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["categories_chart"]["category"][0], "category1");
    }
}
