use crate::config::DbConfig;
use crate::domain::model::{Batch, Field, FieldType, Value};
use crate::domain::ports::{Destination, Warehouse};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::{Client, NoTls};

// Rows per INSERT statement; keeps the parameter count well under the
// protocol limit for wide trip tables.
const INSERT_CHUNK_ROWS: usize = 500;

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INT8
            || *ty == Type::FLOAT8
            || *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::TIMESTAMPTZ
    }

    to_sql_checked!();
}

fn pg_type(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Int => "BIGINT",
        FieldType::Float => "DOUBLE PRECISION",
        FieldType::Text => "TEXT",
        FieldType::Timestamp => "TIMESTAMPTZ",
    }
}

fn field_type_from_pg(data_type: &str) -> FieldType {
    match data_type {
        "bigint" => FieldType::Int,
        "double precision" => FieldType::Float,
        "timestamp with time zone" => FieldType::Timestamp,
        // Any other type cannot have been written by this loader, so mapping
        // it to Text forces a schema mismatch and a replace.
        _ => FieldType::Text,
    }
}

fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS \"{}\"", table)
}

fn create_table_sql(table: &str, fields: &[Field]) -> String {
    let columns = fields
        .iter()
        .map(|f| format!("\"{}\" {}", f.name, pg_type(f.ty)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE \"{}\" ({})", table, columns)
}

fn insert_sql(table: &str, fields: &[Field], row_count: usize) -> String {
    let columns = fields
        .iter()
        .map(|f| format!("\"{}\"", f.name))
        .collect::<Vec<_>>()
        .join(", ");

    let width = fields.len();
    let tuples = (0..row_count)
        .map(|r| {
            let placeholders = (0..width)
                .map(|c| format!("${}", r * width + c + 1))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({})", placeholders)
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("INSERT INTO \"{}\" ({}) VALUES {}", table, columns, tuples)
}

async fn connect(config: &DbConfig) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(&config.conn_string(), NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Postgres connection error: {}", e);
        }
    });
    Ok(client)
}

/// Relational destination backed by Postgres.
pub struct PgDestination {
    client: Client,
}

impl PgDestination {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        tracing::debug!(
            "Connecting to postgres at {}:{}/{}",
            config.host,
            config.port,
            config.database
        );
        Ok(Self {
            client: connect(config).await?,
        })
    }
}

#[async_trait]
impl Destination for PgDestination {
    async fn fetch_schema(&self, table: &str) -> Result<Option<Vec<Field>>> {
        let rows = self
            .client
            .query(
                "SELECT column_name, data_type FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name = $1 \
                 ORDER BY ordinal_position",
                &[&table],
            )
            .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let fields = rows
            .iter()
            .map(|row| {
                let name: String = row.get(0);
                let data_type: String = row.get(1);
                Field::new(name, field_type_from_pg(&data_type))
            })
            .collect();
        Ok(Some(fields))
    }

    async fn replace_schema(&self, table: &str, batch: &Batch) -> Result<()> {
        self.client
            .execute(drop_table_sql(table).as_str(), &[])
            .await?;
        self.client
            .execute(create_table_sql(table, batch.fields()).as_str(), &[])
            .await?;
        tracing::info!("Replaced schema of \"{}\"", table);
        Ok(())
    }

    async fn append(&self, table: &str, batch: &Batch) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut written = 0u64;
        for chunk in batch.rows().chunks(INSERT_CHUNK_ROWS) {
            let sql = insert_sql(table, batch.fields(), chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> = chunk
                .iter()
                .flatten()
                .map(|value| value as &(dyn ToSql + Sync))
                .collect();
            written += self.client.execute(sql.as_str(), &params).await?;
        }
        Ok(written)
    }
}

/// Warehouse reachable over the Postgres wire protocol. DDL goes through the
/// simple query protocol.
pub struct PgWarehouse {
    client: Client,
}

impl PgWarehouse {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        Ok(Self {
            client: connect(config).await?,
        })
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.client.simple_query(sql).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_fields() -> Vec<Field> {
        vec![
            Field::new("tpep_pickup_datetime", FieldType::Timestamp),
            Field::new("passenger_count", FieldType::Int),
            Field::new("fare_amount", FieldType::Float),
            Field::new("store_and_fwd_flag", FieldType::Text),
        ]
    }

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql("yellow_trips", &trip_fields());
        assert_eq!(
            sql,
            "CREATE TABLE \"yellow_trips\" (\"tpep_pickup_datetime\" TIMESTAMPTZ, \
             \"passenger_count\" BIGINT, \"fare_amount\" DOUBLE PRECISION, \
             \"store_and_fwd_flag\" TEXT)"
        );
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(
            drop_table_sql("yellow_trips"),
            "DROP TABLE IF EXISTS \"yellow_trips\""
        );
    }

    #[test]
    fn test_insert_sql_numbers_placeholders_across_rows() {
        let fields = vec![
            Field::new("a", FieldType::Int),
            Field::new("b", FieldType::Int),
        ];
        let sql = insert_sql("t", &fields, 2);
        assert_eq!(
            sql,
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn test_pg_type_round_trip() {
        for ty in [
            FieldType::Int,
            FieldType::Float,
            FieldType::Text,
            FieldType::Timestamp,
        ] {
            let pg = pg_type(ty).to_lowercase();
            let pg = match pg.as_str() {
                "timestamptz" => "timestamp with time zone".to_string(),
                other => other.to_string(),
            };
            assert_eq!(field_type_from_pg(&pg), ty);
        }
    }

    #[test]
    fn test_unknown_pg_type_maps_to_text() {
        assert_eq!(field_type_from_pg("integer"), FieldType::Text);
        assert_eq!(field_type_from_pg("uuid"), FieldType::Text);
    }
}
