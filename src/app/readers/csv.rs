use crate::domain::model::{Batch, Field, FieldType, Value};
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;

/// Reads the header plus at most `chunk_size` data rows. Cells are inferred
/// as Int, Float, or Text with per-column promotion across the chunk;
/// `timestamp_columns` are coerced from text instead. Malformed rows are
/// skipped with a warning.
pub fn read_chunk(data: &[u8], chunk_size: usize, timestamp_columns: &[String]) -> Result<Batch> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = reader.headers()?.clone();
    let names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let width = names.len();
    let is_timestamp: Vec<bool> = names
        .iter()
        .map(|name| timestamp_columns.iter().any(|c| c == name))
        .collect();

    let mut column_types: Vec<Option<FieldType>> = vec![None; width];
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        if rows.len() >= chunk_size {
            break;
        }

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping unreadable row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if record.len() != width {
            tracing::warn!(
                "Skipping row with {} fields (expected {})",
                record.len(),
                width
            );
            skipped += 1;
            continue;
        }

        match parse_row(&record, &is_timestamp) {
            Some(row) => {
                for (i, cell) in row.iter().enumerate() {
                    if is_timestamp[i] {
                        continue;
                    }
                    if let Some(ty) = cell.field_type() {
                        column_types[i] = Some(match column_types[i] {
                            Some(current) => current.promote(ty),
                            None => ty,
                        });
                    }
                }
                rows.push(row);
            }
            None => {
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("Skipped {} malformed rows in retained chunk", skipped);
    }

    let fields: Vec<Field> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = if is_timestamp[i] {
                FieldType::Timestamp
            } else {
                column_types[i].unwrap_or(FieldType::Text)
            };
            Field::new(name.clone(), ty)
        })
        .collect();

    let mut batch = Batch::new(fields.clone());
    for row in rows {
        let normalized: Vec<Value> = row
            .into_iter()
            .zip(fields.iter())
            .map(|(value, field)| value.normalize(field.ty))
            .collect();
        batch.push_row(normalized);
    }

    Ok(batch)
}

fn parse_row(record: &csv::StringRecord, is_timestamp: &[bool]) -> Option<Vec<Value>> {
    let mut row = Vec::with_capacity(record.len());
    for (i, raw) in record.iter().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            row.push(Value::Null);
            continue;
        }
        if is_timestamp[i] {
            match parse_timestamp(raw) {
                Some(ts) => row.push(Value::Timestamp(ts)),
                None => {
                    tracing::warn!("Skipping row with uncoercible timestamp '{}'", raw);
                    return None;
                }
            }
            continue;
        }
        row.push(infer_value(raw));
    }
    Some(row)
}

fn infer_value(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Int(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        return Value::Float(v);
    }
    Value::Text(raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts_columns() -> Vec<String> {
        vec![
            "tpep_pickup_datetime".to_string(),
            "tpep_dropoff_datetime".to_string(),
        ]
    }

    #[test]
    fn test_reads_typed_columns() {
        let data = b"vendor_id,passenger_count,fare_amount,store_and_fwd_flag\n\
                     1,2,14.5,N\n\
                     2,0,8.0,Y\n";
        let batch = read_chunk(data, 100, &[]).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.fields()[0].ty, FieldType::Int);
        assert_eq!(batch.fields()[1].ty, FieldType::Int);
        assert_eq!(batch.fields()[2].ty, FieldType::Float);
        assert_eq!(batch.fields()[3].ty, FieldType::Text);
        assert_eq!(batch.value(0, "passenger_count"), Some(&Value::Int(2)));
        assert_eq!(batch.value(1, "fare_amount"), Some(&Value::Float(8.0)));
    }

    #[test]
    fn test_timestamp_coercion() {
        let data = b"tpep_pickup_datetime,tpep_dropoff_datetime,passenger_count\n\
                     2021-01-01 00:30:10,2021-01-01 00:36:12,1\n";
        let batch = read_chunk(data, 100, &ts_columns()).unwrap();

        assert_eq!(batch.fields()[0].ty, FieldType::Timestamp);
        assert_eq!(batch.fields()[1].ty, FieldType::Timestamp);
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 30, 10).unwrap();
        assert_eq!(
            batch.value(0, "tpep_pickup_datetime"),
            Some(&Value::Timestamp(expected))
        );
    }

    #[test]
    fn test_chunk_limit() {
        let mut data = String::from("id\n");
        for i in 0..50 {
            data.push_str(&format!("{}\n", i));
        }
        let batch = read_chunk(data.as_bytes(), 10, &[]).unwrap();
        assert_eq!(batch.len(), 10);
    }

    #[test]
    fn test_malformed_row_skipped() {
        let data = b"vendor_id,passenger_count\n\
                     1,2\n\
                     3\n\
                     4,5\n";
        let batch = read_chunk(data, 100, &[]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.value(1, "vendor_id"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_uncoercible_timestamp_row_skipped() {
        let data = b"tpep_pickup_datetime,passenger_count\n\
                     not-a-date,1\n\
                     2021-01-01 00:30:10,2\n";
        let ts = vec!["tpep_pickup_datetime".to_string()];
        let batch = read_chunk(data, 100, &ts).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.value(0, "passenger_count"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_empty_cells_are_null() {
        let data = b"vendor_id,passenger_count\n\
                     1,\n";
        let batch = read_chunk(data, 100, &[]).unwrap();
        assert_eq!(batch.value(0, "passenger_count"), Some(&Value::Null));
    }

    #[test]
    fn test_headers_only_gives_empty_batch() {
        let data = b"vendor_id,passenger_count\n";
        let batch = read_chunk(data, 100, &[]).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.fields().len(), 2);
        // all-null columns fall back to Text
        assert_eq!(batch.fields()[0].ty, FieldType::Text);
    }

    #[test]
    fn test_mixed_numeric_column_promotes_to_float() {
        let data = b"amount\n\
                     1\n\
                     2.5\n";
        let batch = read_chunk(data, 100, &[]).unwrap();
        assert_eq!(batch.fields()[0].ty, FieldType::Float);
        assert_eq!(batch.value(0, "amount"), Some(&Value::Float(1.0)));
        assert_eq!(batch.value(1, "amount"), Some(&Value::Float(2.5)));
    }

    #[test]
    fn test_rfc3339_timestamps_accepted() {
        let data = b"tpep_pickup_datetime\n\
                     2021-01-01T00:30:10+00:00\n";
        let ts = vec!["tpep_pickup_datetime".to_string()];
        let batch = read_chunk(data, 100, &ts).unwrap();
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 30, 10).unwrap();
        assert_eq!(
            batch.value(0, "tpep_pickup_datetime"),
            Some(&Value::Timestamp(expected))
        );
    }
}
