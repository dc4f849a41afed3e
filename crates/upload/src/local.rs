//! Local directory store

use std::path::PathBuf;

use tracing::info;

use crate::{UploadBackend, UploadBlob, UploadError};

/// Writes blobs into a directory and returns `file://` URLs.
///
/// Used by the headless binary when no remote endpoint is configured.
pub struct LocalDirUpload {
    dir: PathBuf,
}

impl LocalDirUpload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl UploadBackend for LocalDirUpload {
    async fn upload(&mut self, blob: UploadBlob) -> Result<String, UploadError> {
        if blob.file_name.is_empty() || blob.file_name.contains(['/', '\\']) {
            return Err(UploadError::Rejected(format!(
                "invalid file name {:?}",
                blob.file_name
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&blob.file_name);
        tokio::fs::write(&path, &blob.bytes).await?;

        let path = tokio::fs::canonicalize(&path).await?;
        info!("Stored {} bytes at {}", blob.len(), path.display());
        Ok(format!("file://{}", path.display()))
    }
}
