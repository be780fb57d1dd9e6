#[cfg(feature = "cli")]
pub mod cli;
pub mod file;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::Deserialize;

/// Connection parameters for the relational destination. Defaults mirror the
/// local development database but every field is overridable by flag or file.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            password: "root".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "ny_taxi".to_string(),
        }
    }
}

impl DbConfig {
    pub fn conn_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.user, self.password, self.database
        )
    }
}

impl Validate for DbConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("db_user", &self.user)?;
        validate_non_empty_string("db_host", &self.host)?;
        validate_non_empty_string("db_name", &self.database)?;
        validate_range("db_port", self.port as usize, 1, 65_535)?;
        Ok(())
    }
}
