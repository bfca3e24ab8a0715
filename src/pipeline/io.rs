//! Read/write boundary of the pipeline.
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{ReadError, WriteError};

#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn read(&self, source_id: &str) -> Result<String, ReadError>;
}

/// Implementations create any missing destination directory themselves.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    async fn write(&self, artifact_id: &str, content: &str) -> Result<(), WriteError>;
}

/// Source ids are filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

#[async_trait]
impl SourceReader for FsSourceReader {
    async fn read(&self, source_id: &str) -> Result<String, ReadError> {
        tokio::fs::read_to_string(source_id)
            .await
            .map_err(|io| ReadError { source_id: source_id.to_string(), io })
    }
}

/// Artifact ids are paths relative to `out_dir`.
#[derive(Debug, Clone)]
pub struct FsArtifactWriter {
    out_dir: PathBuf,
}

impl FsArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self { out_dir: out_dir.into() }
    }
}

#[async_trait]
impl ArtifactWriter for FsArtifactWriter {
    async fn write(&self, artifact_id: &str, content: &str) -> Result<(), WriteError> {
        let path = self.out_dir.join(artifact_id);
        let error = |io| WriteError { artifact: artifact_id.to_string(), io };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(error)?;
        }
        tokio::fs::write(&path, content).await.map_err(error)
    }
}
