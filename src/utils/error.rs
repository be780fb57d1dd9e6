use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Download failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Parquet processing error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Database error: {0}")]
    DbError(#[from] tokio_postgres::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Object storage error: {message}")]
    StorageError { message: String },

    #[error("Task '{name}' failed: {message}")]
    TaskError { name: String, message: String },

    #[error("'{operation}' failed after {attempts} attempts: {message}")]
    RetryExhaustedError {
        operation: String,
        attempts: u32,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Database,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::HttpError(_) | EtlError::StorageError { .. } => ErrorCategory::Network,
            EtlError::CsvError(_)
            | EtlError::ParquetError(_)
            | EtlError::ArrowError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::DbError(_) => ErrorCategory::Database,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Config,
            EtlError::IoError(_) | EtlError::TaskError { .. } => ErrorCategory::System,
            EtlError::RetryExhaustedError { .. } => ErrorCategory::Network,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 暫時性 I/O:重跑可能成功
            EtlError::HttpError(_) | EtlError::DbError(_) | EtlError::StorageError { .. } => {
                ErrorSeverity::Medium
            }
            EtlError::RetryExhaustedError { .. } => ErrorSeverity::Medium,
            // 資料格式錯誤對本次執行是致命的
            EtlError::CsvError(_)
            | EtlError::ParquetError(_)
            | EtlError::ArrowError(_)
            | EtlError::SerializationError(_)
            | EtlError::ProcessingError { .. } => ErrorSeverity::High,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::High,
            EtlError::IoError(_) | EtlError::TaskError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and the source URL, then rerun".to_string()
            }
            ErrorCategory::Data => {
                "Inspect the source file for format changes or corruption".to_string()
            }
            ErrorCategory::Database => {
                "Verify database connection parameters and that the server is reachable".to_string()
            }
            ErrorCategory::Config => "Fix the configuration value and run again".to_string(),
            ErrorCategory::System => {
                "Check local disk permissions and available space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::HttpError(e) => format!("Could not download the source file: {}", e),
            EtlError::DbError(e) => format!("Database operation failed: {}", e),
            EtlError::RetryExhaustedError {
                operation,
                attempts,
                ..
            } => format!("{} did not succeed within {} attempts", operation, attempts),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
