use chrono::{DateTime, Utc};

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// True for the exact-zero values the trip filter drops. `Null` is not
    /// zero: the filter keeps rows with a missing count.
    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Int(0)) || matches!(self, Value::Float(f) if *f == 0.0)
    }

    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(FieldType::Int),
            Value::Float(_) => Some(FieldType::Float),
            Value::Text(_) => Some(FieldType::Text),
            Value::Timestamp(_) => Some(FieldType::Timestamp),
        }
    }

    /// Rewrites the cell to match a column type widened after this cell was
    /// parsed (Int column later promoted to Float, numeric column later
    /// promoted to Text).
    pub fn normalize(self, ty: FieldType) -> Value {
        match (self, ty) {
            (Value::Int(v), FieldType::Float) => Value::Float(v as f64),
            (Value::Int(v), FieldType::Text) => Value::Text(v.to_string()),
            (Value::Float(v), FieldType::Text) => Value::Text(v.to_string()),
            (value, _) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Float,
    Text,
    Timestamp,
}

impl FieldType {
    /// Widens a column type when a chunk mixes cell types: Int < Float < Text.
    pub fn promote(self, other: FieldType) -> FieldType {
        use FieldType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An in-memory windowed chunk of source rows after type coercion. Row arity
/// always equals field arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    fields: Vec<Field>,
    rows: Vec<Vec<Value>>,
}

impl Batch {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.fields.len());
        self.rows.push(row);
    }

    /// The empty projection of this batch: same schema, no rows. This is what
    /// the loader writes the destination schema from.
    pub fn head(&self) -> Batch {
        Batch {
            fields: self.fields.clone(),
            rows: Vec::new(),
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_batch() -> Batch {
        let mut batch = Batch::new(vec![
            Field::new("vendor_id", FieldType::Int),
            Field::new("passenger_count", FieldType::Int),
        ]);
        batch.push_row(vec![Value::Int(1), Value::Int(2)]);
        batch.push_row(vec![Value::Int(2), Value::Int(0)]);
        batch
    }

    #[test]
    fn test_is_zero() {
        assert!(Value::Int(0).is_zero());
        assert!(Value::Float(0.0).is_zero());
        assert!(!Value::Int(3).is_zero());
        assert!(!Value::Float(0.5).is_zero());
        assert!(!Value::Null.is_zero());
        assert!(!Value::Text("0".to_string()).is_zero());
    }

    #[test]
    fn test_promote() {
        assert_eq!(FieldType::Int.promote(FieldType::Int), FieldType::Int);
        assert_eq!(FieldType::Int.promote(FieldType::Float), FieldType::Float);
        assert_eq!(FieldType::Float.promote(FieldType::Int), FieldType::Float);
        assert_eq!(FieldType::Int.promote(FieldType::Text), FieldType::Text);
        assert_eq!(
            FieldType::Timestamp.promote(FieldType::Timestamp),
            FieldType::Timestamp
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            Value::Int(3).normalize(FieldType::Float),
            Value::Float(3.0)
        );
        assert_eq!(
            Value::Int(3).normalize(FieldType::Text),
            Value::Text("3".to_string())
        );
        assert_eq!(Value::Int(3).normalize(FieldType::Int), Value::Int(3));
        assert_eq!(Value::Null.normalize(FieldType::Float), Value::Null);
    }

    #[test]
    fn test_head_keeps_schema_and_drops_rows() {
        let batch = sample_batch();
        let head = batch.head();
        assert_eq!(head.fields(), batch.fields());
        assert!(head.is_empty());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_retain_rows() {
        let mut batch = sample_batch();
        let idx = batch.column_index("passenger_count").unwrap();
        batch.retain_rows(|row| !row[idx].is_zero());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.value(0, "vendor_id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_column_index_missing() {
        let batch = sample_batch();
        assert_eq!(batch.column_index("fare_amount"), None);
    }
}
