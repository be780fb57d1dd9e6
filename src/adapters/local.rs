use crate::core::ArtifactStore;
use crate::utils::error::{EtlError, Result};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local directory downloaded artifacts land in. Artifacts keep fixed names
/// (`output.csv`, `output.csv.gz`, `output.parquet`, or a monthly file
/// name), so persisting the same name again replaces the previous run's
/// copy.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Artifact names must stay inside the data directory.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        if escapes {
            return Err(EtlError::ProcessingError {
                message: format!("Artifact name '{}' leaves the data directory", name),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for DataDir {
    async fn persist(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if fs::try_exists(&path).await? {
            tracing::debug!("Overwriting previous copy of {}", path.display());
        }
        fs::write(&path, data).await?;

        tracing::debug!("Kept {} bytes at {}", data.len(), path.display());
        Ok(path)
    }
}
