use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::loader::{LoadOptions, ReplaceScope, DEFAULT_QUERY};
use crate::source::{DEFAULT_INDEX_HOST, DEFAULT_PAGES};

/// Environment variable holding the graph store secret
pub const SECRET_ENV: &str = "PYPI_RECOM_GRAPH_SECRET";
/// Environment variable overriding `graph.host`
pub const HOST_ENV: &str = "PYPI_RECOM_GRAPH_HOST";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecomConfig {
    /// Directory holding index.csv and one directory per search context
    pub library_root: PathBuf,
    pub index_host: String,
    /// Result pages scraped per run
    pub pages: u32,
    /// 0 disables the timeout
    pub http_timeout_secs: u64,
    pub graph: GraphSettings,
}

impl Default for RecomConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from("library"),
            index_host: DEFAULT_INDEX_HOST.to_string(),
            pages: DEFAULT_PAGES,
            http_timeout_secs: 0,
            graph: GraphSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub host: String,
    /// REST++ base URL, defaults to `<host>/restpp`
    pub restpp_url: Option<String>,
    pub graph_name: String,
    pub query: String,
    pub token_lifetime_secs: u64,
    pub scope_query: bool,
    pub replace: ReplaceScope,
    /// Never read from or written to the config file
    #[serde(skip)]
    pub secret: Option<String>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            restpp_url: None,
            graph_name: "Test".to_string(),
            query: DEFAULT_QUERY.to_string(),
            token_lifetime_secs: 30 * 24 * 60 * 60,
            scope_query: false,
            replace: ReplaceScope::All,
            secret: None,
        }
    }
}

impl GraphSettings {
    pub fn restpp_url(&self) -> crate::Result<String> {
        if let Some(url) = self.restpp_url.as_deref().filter(|u| !u.is_empty()) {
            return Ok(url.trim_end_matches('/').to_string());
        }
        if self.host.is_empty() {
            return Err(crate::Error::Config(format!(
                "graph.host is not set (config file or {})",
                HOST_ENV
            )));
        }
        Ok(format!("{}/restpp", self.host.trim_end_matches('/')))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            query: self.query.clone(),
            scope_query: self.scope_query,
            replace: self.replace,
        }
    }

    /// Apply secret and host from the environment
    pub fn apply_env(&mut self) {
        self.apply_vars(std::env::var(SECRET_ENV).ok(), std::env::var(HOST_ENV).ok());
    }

    fn apply_vars(&mut self, secret: Option<String>, host: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.secret = Some(secret);
        }
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.host = host;
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("pypi-recom.toml")
}

/// Load the config file (defaults when absent) and apply environment overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RecomConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)?
    } else {
        RecomConfig::default()
    };
    config.graph.apply_env();
    Ok(config)
}

pub fn write_config(path: &Path, config: &RecomConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
