use crate::config::file::FileConfig;
use crate::config::DbConfig;
use crate::core::IngestConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_identifier, validate_positive_number, validate_range, validate_url, Validate,
};
use clap::Parser;

pub const DEFAULT_SOURCE_URL: &str = "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2021-01.csv.gz";
const DEFAULT_CHUNK_SIZE: usize = 100_000;
const DEFAULT_COUNT_COLUMN: &str = "passenger_count";
const DEFAULT_CACHE_DIR: &str = "./cache";
const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone, Parser)]
#[command(name = "trip-etl")]
#[command(about = "Ingest a public trip dataset into a relational table")]
pub struct CliConfig {
    /// Destination table name
    #[arg(default_value = "yellow_trips")]
    pub table: String,

    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Rows of the source file to retain; the rest is discarded
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Directory the downloaded file is written to
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    #[arg(long, default_value = DEFAULT_COUNT_COLUMN)]
    pub count_column: String,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "tpep_pickup_datetime,tpep_dropoff_datetime"
    )]
    pub timestamp_columns: Vec<String>,

    #[arg(long, default_value_t = 3)]
    pub retry_attempts: u32,

    #[arg(long, default_value = "root")]
    pub db_user: String,

    #[arg(long, default_value = "root")]
    pub db_password: String,

    #[arg(long, default_value = "localhost")]
    pub db_host: String,

    #[arg(long, default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, default_value = "ny_taxi")]
    pub db_name: String,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: String,

    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Disable the download cache
    #[arg(long)]
    pub no_cache: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-stage resource usage")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            database: self.db_name.clone(),
        }
    }

    /// Applies file values wherever the corresponding flag was left at its
    /// built-in default, so explicit flags keep precedence.
    pub fn apply_file(&mut self, file: &FileConfig) {
        let defaults = DbConfig::default();

        if let Some(source) = &file.source {
            if let Some(url) = &source.url {
                if self.source_url == DEFAULT_SOURCE_URL {
                    self.source_url = url.clone();
                }
            }
            if let Some(chunk_size) = source.chunk_size {
                if self.chunk_size == DEFAULT_CHUNK_SIZE {
                    self.chunk_size = chunk_size;
                }
            }
            if let Some(count_column) = &source.count_column {
                if self.count_column == DEFAULT_COUNT_COLUMN {
                    self.count_column = count_column.clone();
                }
            }
            if let Some(timestamp_columns) = &source.timestamp_columns {
                self.timestamp_columns = timestamp_columns.clone();
            }
        }

        if let Some(database) = &file.database {
            if let Some(user) = &database.user {
                if self.db_user == defaults.user {
                    self.db_user = user.clone();
                }
            }
            if let Some(password) = &database.password {
                if self.db_password == defaults.password {
                    self.db_password = password.clone();
                }
            }
            if let Some(host) = &database.host {
                if self.db_host == defaults.host {
                    self.db_host = host.clone();
                }
            }
            if let Some(port) = database.port {
                if self.db_port == defaults.port {
                    self.db_port = port;
                }
            }
            if let Some(name) = &database.database {
                if self.db_name == defaults.database {
                    self.db_name = name.clone();
                }
            }
        }

        if let Some(cache) = &file.cache {
            if let Some(dir) = &cache.dir {
                if self.cache_dir == DEFAULT_CACHE_DIR {
                    self.cache_dir = dir.clone();
                }
            }
            if let Some(ttl_secs) = cache.ttl_secs {
                if self.cache_ttl_secs == DEFAULT_CACHE_TTL_SECS {
                    self.cache_ttl_secs = ttl_secs;
                }
            }
            if let Some(enabled) = cache.enabled {
                if !self.no_cache {
                    self.no_cache = !enabled;
                }
            }
        }
    }
}

impl IngestConfig for CliConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn count_column(&self) -> &str {
        &self.count_column
    }

    fn timestamp_columns(&self) -> &[String] {
        &self.timestamp_columns
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source_url", &self.source_url)?;
        validate_identifier("table", &self.table)?;
        validate_identifier("count_column", &self.count_column)?;
        for column in &self.timestamp_columns {
            validate_identifier("timestamp_columns", column)?;
        }
        validate_positive_number("chunk_size", self.chunk_size, 1)?;
        validate_range("retry_attempts", self.retry_attempts, 1, 10)?;
        self.db_config().validate()?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
