use crate::domain::ports::Warehouse;
use crate::utils::error::Result;

/// A warehouse-side pointer to externally stored files. The definition is
/// created once; nothing refreshes it if the underlying file set changes.
#[derive(Debug, Clone)]
pub struct ExternalTableSpec {
    pub dataset: String,
    pub name: String,
    pub format: String,
    pub source_uris: Vec<String>,
}

impl ExternalTableSpec {
    pub fn ddl(&self) -> String {
        let uris = self
            .source_uris
            .iter()
            .map(|uri| format!("'{}'", uri))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE EXTERNAL TABLE IF NOT EXISTS {}.{} OPTIONS (format = '{}', uris = [{}])",
            self.dataset, self.name, self.format, uris
        )
    }
}

/// Idempotently ensures the external table exists. Safe to call on every run.
pub async fn ensure_external_table<W: Warehouse + ?Sized>(
    warehouse: &W,
    spec: &ExternalTableSpec,
) -> Result<()> {
    tracing::info!("Ensuring external table {}.{}", spec.dataset, spec.name);
    warehouse.execute(&spec.ddl()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Accepts `CREATE EXTERNAL TABLE IF NOT EXISTS` statements and records
    /// the resulting definitions, erroring on a duplicate without the
    /// IF NOT EXISTS guard.
    struct RecordingWarehouse {
        statements: Mutex<Vec<String>>,
        tables: Mutex<HashSet<String>>,
    }

    impl RecordingWarehouse {
        fn new() -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                tables: Mutex::new(HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl Warehouse for RecordingWarehouse {
        async fn execute(&self, sql: &str) -> Result<()> {
            self.statements.lock().unwrap().push(sql.to_string());

            let guarded = sql.contains("IF NOT EXISTS");
            let table = sql
                .split_whitespace()
                .skip_while(|w| *w != "EXISTS")
                .nth(1)
                .unwrap_or_default()
                .to_string();

            let mut tables = self.tables.lock().unwrap();
            if tables.contains(&table) && !guarded {
                return Err(EtlError::ProcessingError {
                    message: format!("table {} already exists", table),
                });
            }
            tables.insert(table);
            Ok(())
        }
    }

    fn spec() -> ExternalTableSpec {
        ExternalTableSpec {
            dataset: "trips_data_all".to_string(),
            name: "green_2022".to_string(),
            format: "PARQUET".to_string(),
            source_uris: vec!["s3://trip-data/raw/*.parquet".to_string()],
        }
    }

    #[test]
    fn test_ddl_shape() {
        let ddl = spec().ddl();
        assert_eq!(
            ddl,
            "CREATE EXTERNAL TABLE IF NOT EXISTS trips_data_all.green_2022 \
             OPTIONS (format = 'PARQUET', uris = ['s3://trip-data/raw/*.parquet'])"
        );
    }

    #[tokio::test]
    async fn test_ensure_twice_is_idempotent() {
        let warehouse = RecordingWarehouse::new();
        let spec = spec();

        ensure_external_table(&warehouse, &spec).await.unwrap();
        ensure_external_table(&warehouse, &spec).await.unwrap();

        assert_eq!(warehouse.statements.lock().unwrap().len(), 2);
        assert_eq!(warehouse.tables.lock().unwrap().len(), 1);
    }
}
