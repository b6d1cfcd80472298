use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_path: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        let file = ConfigFile::parse(&raw).map_err(|e| {
            anyhow::anyhow!(
                "invalid config file {}: {e:#}",
                config_path.display()
            )
        })?;

        Ok(Self { config_path, file })
    }

    /// Load `config_path` if it exists.
    pub fn load_optional(config_path: PathBuf) -> anyhow::Result<Option<Self>> {
        if config_path.exists() {
            Self::load(config_path).map(Some)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using request targets only");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub warehouse: WarehouseConfig,
}

/// Default statement target.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    pub dataset_id: String,
    pub table_id: String,
}

impl ConfigFile {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        file.validate()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.warehouse.dataset_id = expand_env_vars(&self.warehouse.dataset_id)?;
        self.warehouse.table_id = expand_env_vars(&self.warehouse.table_id)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.warehouse.dataset_id.trim().is_empty() {
            anyhow::bail!("warehouse.dataset_id must not be empty");
        }
        if self.warehouse.table_id.trim().is_empty() {
            anyhow::bail!("warehouse.table_id must not be empty");
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
