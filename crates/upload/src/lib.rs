//! Mask persistence for maskpaint
//!
//! Supports both a local directory store and remote server upload.

mod local;

#[cfg(feature = "remote")]
mod remote;

pub use local::LocalDirUpload;

#[cfg(feature = "remote")]
pub use remote::RemoteUpload;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An encoded file handed to a backend for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadBlob {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Trait for upload backends
#[allow(async_fn_in_trait)]
pub trait UploadBackend {
    /// Persist the blob and return the URL it can be fetched from
    async fn upload(&mut self, blob: UploadBlob) -> Result<String, UploadError>;
}
