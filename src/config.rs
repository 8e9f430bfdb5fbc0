use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::storage::schema::DATABASE_NAME;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TodoConfig {
    /// Database file path
    pub database: Option<String>,
    /// Default tracing filter, e.g. `info` or `simpletodo=debug`
    pub log_level: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("simpletodo.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".simpletodo").join(DATABASE_NAME)
}

/// Database path: explicit flag, then config, then the default under `base`
pub fn resolve_database_path(flag: Option<&Path>, config: Option<&TodoConfig>, base: &Path) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| default_database_path_in(base))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<TodoConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: TodoConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &TodoConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
