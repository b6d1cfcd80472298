use crate::cli::ReportArgs;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use spendlens::report::expenses_table;
use spendlens::{Expense, ExpenseSummary, Row};

pub fn run(args: ReportArgs) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", args.file.display()))?;
    let expenses = parse_expenses(&content)
        .map_err(|e| anyhow::anyhow!("{}: {e:#}", args.file.display()))?;
    tracing::debug!(rows = expenses.len(), "loaded expense rows");

    if args.table {
        println!("{}", render_table(&expenses));
    } else {
        let summary = ExpenseSummary::with_grouping(&expenses, args.group_by);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn parse_expenses(content: &str) -> anyhow::Result<Vec<Expense>> {
    let rows: Vec<Row> = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("expected a JSON array of expense rows: {e}"))?;
    Ok(Expense::from_rows(&rows)?)
}

fn render_table(expenses: &[Expense]) -> Table {
    let mut rows = expenses_table(expenses).into_iter();
    let header = rows.next().unwrap_or_default();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for row in rows {
        table.add_row(row.into_iter().enumerate().map(|(i, value)| {
            let cell = Cell::new(value);
            // price
            if i == 3 {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        }));
    }
    table
}
