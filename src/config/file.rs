use crate::utils::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;

/// Optional TOML configuration file. Every field is optional; file values
/// override built-in defaults, CLI flags override the file.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub source: Option<SourceSection>,
    pub database: Option<DatabaseSection>,
    pub cache: Option<CacheSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceSection {
    pub url: Option<String>,
    pub chunk_size: Option<usize>,
    pub count_column: Option<String>,
    pub timestamp_columns: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CacheSection {
    pub dir: Option<String>,
    pub ttl_secs: Option<u64>,
    pub enabled: Option<bool>,
}

impl FileConfig {
    pub fn from_path(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| EtlError::ConfigError {
            message: format!("Failed to parse {}: {}", path, e),
        })
    }
}
