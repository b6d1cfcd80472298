use spendlens::DateGrouping;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Sql,
    SqlRender,
    SqlTxn,
    Report,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Sql(SqlCommand),
    Report(ReportArgs),
}

#[derive(Debug, Clone)]
pub enum SqlCommand {
    Render(SqlRenderArgs),
    Txn(SqlRenderArgs),
}

#[derive(Debug, Clone)]
pub struct SqlRenderArgs {
    pub config: PathBuf,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub file: PathBuf,
    pub table: bool,
    pub group_by: DateGrouping,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "sql" => parse_sql(it.map(|s| s.as_str())),
        "report" => parse_report(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_sql<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut subcmd: Option<&str> = None;

    let mut config = PathBuf::from("spendlens.toml");
    let mut files: Vec<PathBuf> = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => {
                return Ok(Command::Help(match subcmd {
                    None => HelpTopic::Sql,
                    Some("render") => HelpTopic::SqlRender,
                    Some("txn") => HelpTopic::SqlTxn,
                    Some(other) => anyhow::bail!("unknown subcommand: {other}"),
                }));
            }
            "render" | "txn" if subcmd.is_none() => {
                subcmd = Some(token);
            }
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => files.push(PathBuf::from(other)),
        }
    }

    let args = SqlRenderArgs { config, files };
    let cmd = match subcmd {
        None => {
            if args.files.is_empty() {
                return Ok(Command::Help(HelpTopic::Sql));
            }
            anyhow::bail!("missing subcommand: expected `spendlens sql render` or `spendlens sql txn`")
        }
        Some("render") => SqlCommand::Render(args),
        Some("txn") => SqlCommand::Txn(args),
        Some(other) => anyhow::bail!("unknown subcommand: {other}"),
    };

    Ok(Command::Sql(cmd))
}

fn parse_report<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut file: Option<PathBuf> = None;
    let mut table = false;
    let mut group_by = DateGrouping::Month;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Report)),
            "--table" => table = true,
            "--group-by" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--group-by requires a value");
                };
                group_by = parse_grouping(v)?;
            }
            _ if token.starts_with("--group-by=") => {
                group_by = parse_grouping(token.trim_start_matches("--group-by="))?;
            }
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other => {
                if file.is_some() {
                    anyhow::bail!("unexpected positional argument: {other}");
                }
                file = Some(PathBuf::from(other));
            }
        }
    }

    let Some(file) = file else {
        anyhow::bail!("missing rows file: usage `spendlens report <FILE>`");
    };

    Ok(Command::Report(ReportArgs {
        file,
        table,
        group_by,
    }))
}

fn parse_grouping(v: &str) -> anyhow::Result<DateGrouping> {
    v.parse::<DateGrouping>()
        .map_err(|_| anyhow::anyhow!("invalid --group-by value: {v} (expected month or day)"))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
spendlens - SQL statement builder and expense reports

USAGE:
  spendlens <COMMAND> [OPTIONS]

COMMANDS:
  sql render            Render statement requests (JSON) to SQL
  sql txn               Render statement requests into one transactional script
  report                Summarise exported expense rows

Run `spendlens <command> --help` for more."
            );
        }
        HelpTopic::Sql => {
            println!(
                "\
USAGE:
  spendlens sql render [OPTIONS] [FILES...]
  spendlens sql txn [OPTIONS] [FILES...]

SUBCOMMANDS:
  render        Print one SQL statement per request (reads stdin if no files)
  txn           Wrap all requests in BEGIN TRANSACTION / COMMIT TRANSACTION

Run `spendlens sql <subcommand> --help` for more."
            );
        }
        HelpTopic::SqlRender => {
            println!(
                "\
USAGE:
  spendlens sql render [OPTIONS] [FILES...]

NOTES:
  - Each file holds one request object or a JSON array of them.
  - dataset_id/table_id missing from a request are taken from [warehouse] in the config.

OPTIONS:
  --config <FILE>       Config file path (default: spendlens.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::SqlTxn => {
            println!(
                "\
USAGE:
  spendlens sql txn [OPTIONS] [FILES...]

NOTES:
  - Requests are rendered in file order, then wrapped in a single script.

OPTIONS:
  --config <FILE>       Config file path (default: spendlens.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Report => {
            println!(
                "\
USAGE:
  spendlens report <FILE> [OPTIONS]

NOTES:
  FILE is a JSON array of expense rows
  (id, date, description, price, category, is_subscription).

OPTIONS:
  --table               Print the expense table instead of the JSON summary
  --group-by <UNIT>     Time series bucket: month (default) or day
  -h, --help            Print help"
            );
        }
    }
}
