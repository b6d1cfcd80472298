//! Expense operations against an in-memory warehouse that records every job.

use chrono::NaiveDate;
use serde_json::json;
use spendlens::{
    AnalyticsConfig, Expense, ExpenseChanges, ExpenseStore, JobConfig, JobState, LoggedWarehouse,
    NewExpense, OneOrMany, QueryJob, QueryType, Row, SpendError, SpendResult, Warehouse,
};
use std::sync::Mutex;

const USER_ID: &str = "john.doe@example.com";
const ID1: &str = "0f8fad5bd9cb469fa16570867728950e";
const ID2: &str = "7c9e6679742540de944be07fc1f90ae7";

/// Records submitted SQL and answers every job with the same outcome.
struct RecordingWarehouse {
    submitted: Mutex<Vec<(String, JobConfig)>>,
    rows: Vec<Row>,
    fail_with: Option<String>,
}

impl RecordingWarehouse {
    fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            rows: Vec::new(),
            fail_with: None,
        }
    }

    fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    fn submitted(&self) -> Vec<(String, JobConfig)> {
        self.submitted.lock().unwrap().clone()
    }

    fn last_sql(&self) -> String {
        self.submitted().last().unwrap().0.clone()
    }
}

impl Warehouse for RecordingWarehouse {
    async fn query(&self, sql: &str, config: &JobConfig) -> SpendResult<QueryJob> {
        self.submitted
            .lock()
            .unwrap()
            .push((sql.to_string(), config.clone()));
        Ok(QueryJob {
            job_id: "job_id".to_string(),
            labels: config.labels.clone(),
            statement_type: QueryType::from_sql(sql),
            outcome: match &self.fail_with {
                Some(message) => Err(message.clone()),
                None => Ok(self.rows.clone()),
            },
        })
    }
}

/// A warehouse that rejects every submission.
struct OfflineWarehouse;

impl Warehouse for OfflineWarehouse {
    async fn query(&self, _sql: &str, _config: &JobConfig) -> SpendResult<QueryJob> {
        Err(SpendError::warehouse("connection refused"))
    }
}

fn store(warehouse: RecordingWarehouse) -> ExpenseStore<RecordingWarehouse> {
    ExpenseStore::new(warehouse, AnalyticsConfig::new("dataset", "table"))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn row(id: &str, day: &str, price: f64, category: &str, is_subscription: bool) -> Row {
    let serde_json::Value::Object(map) = json!({
        "id": id,
        "date": day,
        "description": format!("paid {category}"),
        "price": price,
        "category": category,
        "is_subscription": is_subscription,
    }) else {
        unreachable!()
    };
    map
}

fn new_expense(category: &str, price: f64) -> NewExpense {
    NewExpense {
        date: date("2000-01-02"),
        description: "description1".to_string(),
        price,
        category: category.to_string(),
        is_subscription: false,
    }
}

#[tokio::test]
async fn get_expenses_selects_owned_rows_in_range() {
    let rows = vec![row(ID1, "2000-01-02", 1.23, "food", false)];
    let store = store(RecordingWarehouse::new().with_rows(rows.clone()));

    let report = store
        .get_expenses(USER_ID, date("2000-01-02"), date("2000-01-03"))
        .await
        .unwrap();

    assert_eq!(report.state, JobState::Success);
    assert_eq!(report.job_id, "job_id");
    assert_eq!(report.result, Some(rows));
    assert_eq!(report.labels.get("user").map(String::as_str), Some(USER_ID));

    assert_eq!(
        store.warehouse().last_sql(),
        concat!(
            "SELECT id, date, description, price, category, is_subscription FROM `dataset.table`",
            r#" WHERE date BETWEEN "2000-01-02" AND "2000-01-03" AND owner = "john.doe@example.com""#,
            " ORDER BY date ASC, category ASC;"
        )
    );
    let (_, config) = store.warehouse().submitted().remove(0);
    assert_eq!(config, JobConfig::for_user(USER_ID));
    assert!(config.use_query_cache);
}

#[tokio::test]
async fn failed_job_reports_error_state() {
    let store = store(RecordingWarehouse::new().failing("Syntax error: Unexpected keyword"));
    let report = store
        .get_expenses(USER_ID, date("2000-01-02"), date("2000-01-03"))
        .await
        .unwrap();

    assert_eq!(report.state, JobState::Error);
    assert!(report.result.is_none());
    assert_eq!(
        serde_json::to_value(&report).unwrap()["state"],
        json!("ERROR")
    );
}

#[tokio::test]
async fn submission_failure_is_an_error() {
    let store = ExpenseStore::new(OfflineWarehouse, AnalyticsConfig::new("dataset", "table"));
    let err = store.delete_expense(USER_ID, ID1.to_string()).await.unwrap_err();
    assert!(matches!(err, SpendError::Warehouse(_)));
}

#[tokio::test]
async fn add_single_expense_is_one_insert() {
    let store = store(RecordingWarehouse::new());
    let report = store
        .add_expense(USER_ID, new_expense("food", 1.23))
        .await
        .unwrap();

    assert!(report.is_success());
    assert!(report.result.is_none());

    let sql = store.warehouse().last_sql();
    assert!(sql.starts_with(
        "INSERT INTO `dataset.table` (id, date, description, price, category, is_subscription, owner) VALUES (\""
    ));
    assert!(sql.ends_with(
        r#"", "2000-01-02", "description1", 1.23, "food", false, "john.doe@example.com");"#
    ));

    // The generated id is a 32-digit hex UUID.
    let id = &sql[sql.find("VALUES (\"").unwrap() + 9..][..32];
    assert!(spendlens::expense::is_expense_id(id));
}

#[tokio::test]
async fn add_several_expenses_is_one_transaction() {
    let store = store(RecordingWarehouse::new());
    store
        .add_expense(
            USER_ID,
            vec![new_expense("food", 1.23), new_expense("rent", 5.67)],
        )
        .await
        .unwrap();

    let submitted = store.warehouse().submitted();
    assert_eq!(submitted.len(), 1);
    let script = &submitted[0].0;
    assert!(script.starts_with("\nBEGIN\nBEGIN TRANSACTION;\n\nINSERT INTO `dataset.table`"));
    assert!(script.ends_with(";\n\nCOMMIT TRANSACTION;\nEND;"));
    assert_eq!(script.matches("INSERT INTO").count(), 2);
    assert_eq!(QueryType::from_sql(script), QueryType::Script);
}

#[tokio::test]
async fn add_rejects_invalid_or_empty_input() {
    let store = store(RecordingWarehouse::new());

    let err = store
        .add_expense(USER_ID, Vec::<NewExpense>::new())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = store
        .add_expense(USER_ID, new_expense("food; DROP", 1.0))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(store.warehouse().submitted().is_empty());
}

#[tokio::test]
async fn update_single_expense() {
    let store = store(RecordingWarehouse::new());
    let changes = ExpenseChanges::new().set("price", 9.08).set("category", "rent");

    store
        .update_expense(USER_ID, ID1.to_string(), changes)
        .await
        .unwrap();

    assert_eq!(
        store.warehouse().last_sql(),
        format!(r#"UPDATE `dataset.table` SET price = 9.08, category = "rent" WHERE id = "{ID1}";"#)
    );
}

#[tokio::test]
async fn update_accepts_one_element_lists() {
    let store = store(RecordingWarehouse::new());
    let changes: ExpenseChanges = serde_json::from_str(r#"{"description": "bus"}"#).unwrap();

    store
        .update_expense(USER_ID, vec![ID1.to_string()], vec![changes])
        .await
        .unwrap();

    assert_eq!(
        store.warehouse().last_sql(),
        format!(r#"UPDATE `dataset.table` SET description = "bus" WHERE id = "{ID1}";"#)
    );
}

#[tokio::test]
async fn update_pairs_ids_and_changes_in_a_transaction() {
    let store = store(RecordingWarehouse::new());
    let ids = vec![ID1.to_string(), ID2.to_string()];
    let changes = vec![
        ExpenseChanges::new().set("price", 1),
        ExpenseChanges::new().set("is_subscription", true),
    ];

    store.update_expense(USER_ID, ids, changes).await.unwrap();

    let first = format!("UPDATE `dataset.table` SET price = 1 WHERE id = \"{ID1}\";");
    let second =
        format!("UPDATE `dataset.table` SET is_subscription = true WHERE id = \"{ID2}\";");
    assert_eq!(
        store.warehouse().last_sql(),
        format!("\nBEGIN\nBEGIN TRANSACTION;\n\n{first}\n{second}\n\nCOMMIT TRANSACTION;\nEND;")
    );
}

#[tokio::test]
async fn update_rejects_mismatched_shapes() {
    let store = store(RecordingWarehouse::new());
    let change = || ExpenseChanges::new().set("price", 1);

    let err = store
        .update_expense(USER_ID, vec![ID1.to_string(), ID2.to_string()], change())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = store
        .update_expense(
            USER_ID,
            vec![ID1.to_string(), ID2.to_string()],
            vec![change(), change(), change()],
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = store
        .update_expense(USER_ID, "id1".to_string(), change())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(store.warehouse().submitted().is_empty());
}

#[tokio::test]
async fn delete_single_and_many() {
    let store = store(RecordingWarehouse::new());

    store.delete_expense(USER_ID, ID1.to_string()).await.unwrap();
    assert_eq!(
        store.warehouse().last_sql(),
        format!(r#"DELETE FROM `dataset.table` WHERE id = "{ID1}";"#)
    );

    store
        .delete_expense(USER_ID, OneOrMany::Many(vec![ID1.to_string(), ID2.to_string()]))
        .await
        .unwrap();
    assert_eq!(
        store.warehouse().last_sql(),
        format!(r#"DELETE FROM `dataset.table` WHERE id IN ("{ID1}", "{ID2}");"#)
    );
}

#[tokio::test]
async fn quoted_user_ids_are_rejected() {
    let store = store(RecordingWarehouse::new());
    let (lower, upper) = (date("2000-01-02"), date("2000-01-03"));

    for user in [r#"bob" OR owner = "alice"#, r"bob\"] {
        assert!(store.get_expenses_sql(user, lower, upper).unwrap_err().is_validation());
        let err = store.get_expenses(user, lower, upper).await.unwrap_err();
        assert!(err.is_validation());
        let err = store.add_expense(user, new_expense("food", 1.0)).await.unwrap_err();
        assert!(err.is_validation());
        let err = store
            .update_expense(user, ID1.to_string(), ExpenseChanges::new().set("price", 2.0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        let err = store.delete_expense(user, ID1.to_string()).await.unwrap_err();
        assert!(err.is_validation());
    }
    assert!(store.warehouse().submitted().is_empty());
}

#[tokio::test]
async fn summarize_expenses_aggregates_rows() {
    let rows = vec![
        row(ID1, "2000-01-02", 1.23, "food", false),
        row(ID2, "2000-02-05", 5.67, "streaming", true),
    ];
    let store = store(RecordingWarehouse::new().with_rows(rows.clone()));

    let summary = store
        .summarize_expenses(USER_ID, date("2000-01-01"), date("2000-12-31"))
        .await
        .unwrap();

    assert_eq!(summary.total_expenses, 6.9);
    assert_eq!(summary.categories_chart.category, vec!["food", "streaming"]);
    assert_eq!(summary.expenses_time_series.date, vec!["2000-01", "2000-02"]);
    assert_eq!(summary.table.len(), 3);
    assert_eq!(Expense::from_rows(&rows).unwrap().len(), 2);
}

#[tokio::test]
async fn summarize_failed_job_is_an_error() {
    let store = store(RecordingWarehouse::new().failing("quota exceeded"));
    let err = store
        .summarize_expenses(USER_ID, date("2000-01-01"), date("2000-12-31"))
        .await
        .unwrap_err();
    assert!(matches!(err, SpendError::Warehouse(_)));
}

#[tokio::test]
async fn logged_warehouse_forwards_jobs() {
    let store = ExpenseStore::new(
        LoggedWarehouse::new(RecordingWarehouse::new()).max_sql_length(16),
        AnalyticsConfig::new("dataset", "table"),
    );
    store.delete_expense(USER_ID, ID1.to_string()).await.unwrap();
    assert_eq!(store.warehouse().inner().submitted().len(), 1);
}
