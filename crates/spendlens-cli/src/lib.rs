mod cli;
mod config;
mod render;
mod report;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Sql(cmd) => match cmd {
            cli::SqlCommand::Render(args) => render::run(args),
            cli::SqlCommand::Txn(args) => render::run_txn(args),
        },
        cli::Command::Report(args) => report::run(args),
    }
}
