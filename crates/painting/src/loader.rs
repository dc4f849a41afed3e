//! Source image loading
//!
//! The pipeline only needs the natural size of the source image. Loaders
//! resolve a source string to those dimensions; the session wires the result
//! into its geometry.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::types::ImageDimensions;

/// The source image could not be loaded (an ImageLoadFailure)
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image has zero size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Resolves an image source to its natural dimensions
#[allow(async_fn_in_trait)]
pub trait ImageLoader {
    async fn load(&self, source: &str) -> Result<ImageDimensions, ImageLoadError>;
}

/// Read the dimensions from encoded image bytes without decoding pixels
pub fn decode_dimensions(bytes: &[u8]) -> Result<ImageDimensions, ImageLoadError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(ImageLoadError::EmptyImage { width, height });
    }
    Ok(ImageDimensions::new(width, height))
}

/// Loads images from the local filesystem. Accepts plain paths and `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    base_dir: Option<PathBuf>,
}

impl FileImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative sources against `base_dir`
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        let path = PathBuf::from(source.strip_prefix("file://").unwrap_or(source));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl ImageLoader for FileImageLoader {
    async fn load(&self, source: &str) -> Result<ImageDimensions, ImageLoadError> {
        let path = self.resolve(source);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImageLoadError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let dims = decode_dimensions(&bytes)?;
        debug!(
            "Loaded {} ({}x{})",
            path.display(),
            dims.width,
            dims.height
        );
        Ok(dims)
    }
}

/// In-memory image store keyed by source string
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(source.into(), bytes);
    }

    pub fn with_image(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    async fn load(&self, source: &str) -> Result<ImageDimensions, ImageLoadError> {
        let bytes = self
            .images
            .get(source)
            .ok_or_else(|| ImageLoadError::NotFound(source.to_string()))?;
        decode_dimensions(bytes)
    }
}
