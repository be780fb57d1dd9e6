use crate::domain::model::Batch;

/// Removes every row whose count column is exactly zero. Rows with a missing
/// (`Null`) count are kept. A batch without the column passes through
/// unchanged.
pub fn drop_zero_counts(mut batch: Batch, count_column: &str) -> Batch {
    let Some(idx) = batch.column_index(count_column) else {
        tracing::warn!(
            "Count column '{}' not present; batch passed through unchanged",
            count_column
        );
        return batch;
    };

    let zero_rows = batch
        .rows()
        .iter()
        .filter(|row| row[idx].is_zero())
        .count();
    tracing::info!("pre: zero {} rows: {}", count_column, zero_rows);

    batch.retain_rows(|row| !row[idx].is_zero());

    tracing::info!("post: zero {} rows: 0 ({} rows kept)", count_column, batch.len());
    batch
}
