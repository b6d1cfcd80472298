use crate::cli::SqlRenderArgs;
use crate::config::{ProjectConfig, WarehouseConfig};
use spendlens::{OneOrMany, StatementRequest, build_transactional_query};
use std::io::Read;

/// `spendlens sql render`: one statement per line.
pub fn run(args: SqlRenderArgs) -> anyhow::Result<()> {
    for sql in render_all(&args)? {
        println!("{sql}");
    }
    Ok(())
}

/// `spendlens sql txn`: everything in one transactional script.
pub fn run_txn(args: SqlRenderArgs) -> anyhow::Result<()> {
    let statements = render_all(&args)?;
    println!("{}", build_transactional_query(&statements));
    Ok(())
}

fn render_all(args: &SqlRenderArgs) -> anyhow::Result<Vec<String>> {
    let project = ProjectConfig::load_optional(args.config.clone())?;
    let defaults = project.as_ref().map(|p| {
        tracing::debug!(config = %p.config_path.display(), "using warehouse defaults");
        &p.file.warehouse
    });

    let mut statements = Vec::new();
    if args.files.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;

        if buf.trim().is_empty() {
            anyhow::bail!("no requests provided (pass files or pipe JSON to stdin)");
        }
        statements.extend(render_source("stdin", &buf, defaults)?);
    } else {
        for file in &args.files {
            let content = std::fs::read_to_string(file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            statements.extend(render_source(&file.display().to_string(), &content, defaults)?);
        }
    }

    if statements.is_empty() {
        anyhow::bail!("no statement requests found");
    }
    Ok(statements)
}

/// Render every request in one JSON document.
fn render_source(
    origin: &str,
    content: &str,
    defaults: Option<&WarehouseConfig>,
) -> anyhow::Result<Vec<String>> {
    let requests: OneOrMany<StatementRequest> = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("failed to parse statement requests from {origin}: {e}"))?;

    requests
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(idx, mut request)| {
            fill_target(&mut request, defaults).and_then(|()| {
                request
                    .build()
                    .map_err(|e| anyhow::anyhow!("{origin}:request{}: {e}", idx + 1))
            })
        })
        .collect()
}

fn fill_target(
    request: &mut StatementRequest,
    defaults: Option<&WarehouseConfig>,
) -> anyhow::Result<()> {
    if request.dataset_id.is_empty() || request.table_id.is_empty() {
        let Some(defaults) = defaults else {
            anyhow::bail!(
                "request has no dataset_id/table_id and no [warehouse] config was found"
            );
        };
        if request.dataset_id.is_empty() {
            request.dataset_id = defaults.dataset_id.clone();
        }
        if request.table_id.is_empty() {
            request.table_id = defaults.table_id.clone();
        }
    }
    Ok(())
}
