pub mod cache;
pub mod etl;
pub mod registrar;
pub mod retry;
pub mod sequence;
pub mod transform;

pub use crate::domain::model::{Batch, Field, FieldType, Value};
pub use crate::domain::ports::{
    ArtifactStore, Destination, IngestConfig, ObjectStore, Pipeline, Warehouse,
};
pub use crate::utils::error::Result;
