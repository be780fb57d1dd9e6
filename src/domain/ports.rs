use crate::domain::model::{Batch, Field};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where downloaded artifacts land. The fetcher writes each artifact under a
/// fixed name, so persisting twice overwrites the first copy. Returns the
/// path the artifact ended up at.
pub trait ArtifactStore: Send + Sync {
    fn persist(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

/// Parameters of one ingest run. Implemented by the CLI config and by test
/// fixtures.
pub trait IngestConfig: Send + Sync {
    fn source_url(&self) -> &str;
    fn table(&self) -> &str;
    fn chunk_size(&self) -> usize;
    fn count_column(&self) -> &str;
    fn timestamp_columns(&self) -> &[String];
    fn retry_attempts(&self) -> u32;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Batch>;
    async fn transform(&self, batch: Batch) -> Result<Batch>;
    async fn load(&self, batch: Batch) -> Result<String>;
}

/// A relational destination table. Schema sync and append are two separate
/// calls with no transaction spanning them.
#[async_trait]
pub trait Destination: Send + Sync {
    /// The current column definitions of `table`, or `None` if it does not
    /// exist.
    async fn fetch_schema(&self, table: &str) -> Result<Option<Vec<Field>>>;

    /// Drops and recreates `table` from the batch's schema. Any existing rows
    /// are lost.
    async fn replace_schema(&self, table: &str, batch: &Batch) -> Result<()>;

    /// Appends every row of the batch. Returns the number of rows written.
    async fn append(&self, table: &str, batch: &Batch) -> Result<u64>;
}

/// A warehouse that accepts DDL statements.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<()>;
}

/// A bucket of named objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()>;
}
