use crate::domain::model::{Batch, Field, FieldType, Value};
use crate::utils::error::{EtlError, Result};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Reads the first record batch of a Parquet file, with the reader batch size
/// set to `chunk_size` so at most that many rows are materialized.
pub fn read_chunk(data: &[u8], chunk_size: usize) -> Result<Batch> {
    let bytes = Bytes::copy_from_slice(data);
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;
    let schema = builder.schema().clone();
    let mut reader = builder.with_batch_size(chunk_size).build()?;

    let fields = schema
        .fields()
        .iter()
        .map(|f| Ok(Field::new(f.name().clone(), field_type_for(f.data_type())?)))
        .collect::<Result<Vec<_>>>()?;

    match reader.next() {
        Some(record_batch) => convert(record_batch?, fields),
        None => Ok(Batch::new(fields)),
    }
}

fn field_type_for(data_type: &DataType) -> Result<FieldType> {
    match data_type {
        DataType::Int32 | DataType::Int64 => Ok(FieldType::Int),
        DataType::Float32 | DataType::Float64 => Ok(FieldType::Float),
        DataType::Utf8 => Ok(FieldType::Text),
        DataType::Timestamp(_, _) => Ok(FieldType::Timestamp),
        other => Err(EtlError::ProcessingError {
            message: format!("Unsupported Parquet column type: {}", other),
        }),
    }
}

fn convert(record_batch: RecordBatch, fields: Vec<Field>) -> Result<Batch> {
    let mut columns: Vec<Vec<Value>> = Vec::with_capacity(record_batch.num_columns());
    for (i, array) in record_batch.columns().iter().enumerate() {
        let data_type = record_batch.schema().field(i).data_type().clone();
        columns.push(column_values(array.as_ref(), &data_type)?);
    }

    let mut batch = Batch::new(fields);
    for row_idx in 0..record_batch.num_rows() {
        let row: Vec<Value> = columns.iter().map(|col| col[row_idx].clone()).collect();
        batch.push_row(row);
    }
    Ok(batch)
}

fn column_values(array: &dyn Array, data_type: &DataType) -> Result<Vec<Value>> {
    let n = array.len();
    let mut values = Vec::with_capacity(n);

    macro_rules! extract {
        ($array_ty:ty, $wrap:expr) => {{
            let typed = array
                .as_any()
                .downcast_ref::<$array_ty>()
                .ok_or_else(|| EtlError::ProcessingError {
                    message: format!("Column type mismatch for {}", data_type),
                })?;
            for i in 0..n {
                if typed.is_null(i) {
                    values.push(Value::Null);
                } else {
                    values.push($wrap(typed.value(i))?);
                }
            }
        }};
    }

    let ok_int = |v: i64| -> Result<Value> { Ok(Value::Int(v)) };
    let ok_float = |v: f64| -> Result<Value> { Ok(Value::Float(v)) };

    match data_type {
        DataType::Int64 => extract!(Int64Array, ok_int),
        DataType::Int32 => extract!(Int32Array, |v: i32| ok_int(i64::from(v))),
        DataType::Float64 => extract!(Float64Array, ok_float),
        DataType::Float32 => extract!(Float32Array, |v: f32| ok_float(f64::from(v))),
        DataType::Utf8 => {
            extract!(StringArray, |v: &str| -> Result<Value> {
                Ok(Value::Text(v.to_string()))
            })
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            extract!(TimestampMillisecondArray, |v: i64| timestamp_value(
                DateTime::from_timestamp_millis(v)
            ))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            extract!(TimestampMicrosecondArray, |v: i64| timestamp_value(
                DateTime::from_timestamp_micros(v)
            ))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            extract!(TimestampNanosecondArray, |v: i64| -> Result<Value> {
                Ok(Value::Timestamp(DateTime::from_timestamp_nanos(v)))
            })
        }
        other => {
            return Err(EtlError::ProcessingError {
                message: format!("Unsupported Parquet column type: {}", other),
            })
        }
    }

    Ok(values)
}

fn timestamp_value(ts: Option<DateTime<Utc>>) -> Result<Value> {
    ts.map(Value::Timestamp)
        .ok_or_else(|| EtlError::ProcessingError {
            message: "Timestamp out of representable range".to_string(),
        })
}
