//! Size-budgeted JPEG encoding of the mask
//!
//! One encode at the initial quality. If the payload is over budget the mask
//! is downscaled by `sqrt(limit / size)` on both axes and encoded once more at
//! the retry quality. There is no further iteration: a result that is still
//! over budget is returned and flagged.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use maskpaint_config::EditorConfig;
use maskpaint_upload::UploadBlob;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{MASK_CONTENT_TYPE, MASK_FILE_NAME};
use crate::mask::MaskBuffer;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Mask has no pixels")]
    EmptyMask,

    /// Reportable, not fatal: the artifact is still usable
    #[error("Compressed mask is {size} bytes, over the {limit} byte budget")]
    SizeBudgetExceeded { size: usize, limit: usize },
}

/// An encoded mask ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedArtifact {
    /// JPEG payload
    pub data: Vec<u8>,
    /// Size estimate the budget is checked against (payload length)
    pub estimated_byte_size: usize,
    /// Estimate of the first attempt
    pub initial_estimate: usize,
    pub width: u32,
    pub height: u32,
    /// Quality of the accepted attempt (0.0-1.0)
    pub quality: f32,
    /// Whether the downscaled retry was used
    pub retried: bool,
}

impl CompressedArtifact {
    pub fn exceeds(&self, limit: usize) -> bool {
        self.estimated_byte_size > limit
    }

    /// The budget violation, if any, as a reportable error
    pub fn budget_error(&self, limit: usize) -> Option<CompressError> {
        self.exceeds(limit).then_some(CompressError::SizeBudgetExceeded {
            size: self.estimated_byte_size,
            limit,
        })
    }

    /// `data:image/jpeg;base64,...`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", MASK_CONTENT_TYPE, STANDARD.encode(&self.data))
    }

    pub fn to_blob(&self) -> UploadBlob {
        UploadBlob::new(MASK_FILE_NAME, MASK_CONTENT_TYPE, self.data.clone())
    }
}

/// Quality ladder for mask compression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionNegotiator {
    pub initial_quality: f32,
    pub retry_quality: f32,
}

impl Default for CompressionNegotiator {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl CompressionNegotiator {
    pub fn new(initial_quality: f32, retry_quality: f32) -> Self {
        Self {
            initial_quality,
            retry_quality,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.initial_quality, config.retry_quality)
    }

    /// Encode `mask` within `size_limit` bytes on a best-effort basis
    pub fn compress(
        &self,
        mask: &MaskBuffer,
        size_limit: usize,
    ) -> Result<CompressedArtifact, CompressError> {
        if mask.is_empty() {
            return Err(CompressError::EmptyMask);
        }

        let rgb = DynamicImage::ImageRgba8(mask.as_image().clone()).to_rgb8();
        let data = encode_jpeg(&rgb, self.initial_quality)?;
        let estimate = data.len();
        debug!(
            "compress: {}x{} at q={:.2} -> {} bytes (limit {})",
            rgb.width(),
            rgb.height(),
            self.initial_quality,
            estimate,
            size_limit
        );

        if estimate <= size_limit {
            return Ok(CompressedArtifact {
                data,
                estimated_byte_size: estimate,
                initial_estimate: estimate,
                width: rgb.width(),
                height: rgb.height(),
                quality: self.initial_quality,
                retried: false,
            });
        }

        let factor = (size_limit as f64 / estimate as f64).sqrt();
        let width = ((rgb.width() as f64 * factor).floor() as u32).max(1);
        let height = ((rgb.height() as f64 * factor).floor() as u32).max(1);
        // Nearest keeps the mask strictly two-valued before encoding
        let scaled = imageops::resize(&rgb, width, height, FilterType::Nearest);
        let data = encode_jpeg(&scaled, self.retry_quality)?;

        let artifact = CompressedArtifact {
            estimated_byte_size: data.len(),
            data,
            initial_estimate: estimate,
            width,
            height,
            quality: self.retry_quality,
            retried: true,
        };

        if artifact.exceeds(size_limit) {
            warn!(
                "compress: still {} bytes after retry at {}x{} (limit {})",
                artifact.estimated_byte_size, width, height, size_limit
            );
        } else {
            info!(
                "compress: downscaled to {}x{}, {} -> {} bytes",
                width, height, estimate, artifact.estimated_byte_size
            );
        }
        Ok(artifact)
    }
}

fn encode_jpeg(image: &RgbImage, quality: f32) -> Result<Vec<u8>, image::ImageError> {
    let quality = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality).encode_image(image)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    /// Mask that JPEG cannot compress well
    fn noisy_mask(width: u32, height: u32) -> MaskBuffer {
        let raster = RgbaImage::from_fn(width, height, |x, y| {
            let h = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
            let alpha = if h.rotate_left(7) % 3 == 0 { 255 } else { 0 };
            image::Rgba([255, 255, 255, alpha])
        });
        MaskBuffer::from_alpha(&raster)
    }

    #[test]
    fn test_fits_first_time() {
        let mask = MaskBuffer::all_black(256, 256);
        let artifact = CompressionNegotiator::default()
            .compress(&mask, 9 * 1024 * 1024)
            .unwrap();

        assert!(!artifact.retried);
        assert_eq!(artifact.quality, 0.8);
        assert_eq!((artifact.width, artifact.height), (256, 256));
        assert_eq!(artifact.estimated_byte_size, artifact.data.len());
        assert!(artifact.budget_error(9 * 1024 * 1024).is_none());
        // JPEG SOI marker
        assert_eq!(&artifact.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_single_downscaled_retry() {
        let mask = noisy_mask(512, 512);
        let negotiator = CompressionNegotiator::default();
        let first = negotiator.compress(&mask, usize::MAX).unwrap();

        let limit = first.estimated_byte_size / 4;
        let artifact = negotiator.compress(&mask, limit).unwrap();

        assert!(artifact.retried);
        assert_eq!(artifact.quality, 0.7);
        assert_eq!(artifact.initial_estimate, first.estimated_byte_size);

        let factor = (limit as f64 / first.estimated_byte_size as f64).sqrt();
        assert_eq!(artifact.width, (512.0 * factor).floor() as u32);
        assert_eq!(artifact.height, (512.0 * factor).floor() as u32);

        // Never larger than the raw pixels
        assert!(artifact.estimated_byte_size < 512 * 512 * 4);
    }

    #[test]
    fn test_pathological_limit_is_reported_not_looped() {
        let mask = noisy_mask(64, 64);
        let artifact = CompressionNegotiator::default().compress(&mask, 1).unwrap();

        assert!(artifact.retried);
        assert!(artifact.width < 64 && artifact.height < 64);
        assert!(matches!(
            artifact.budget_error(1),
            Some(CompressError::SizeBudgetExceeded { limit: 1, .. })
        ));
    }

    #[test]
    fn test_empty_mask_is_rejected() {
        let mask = MaskBuffer::all_black(0, 0);
        assert!(matches!(
            CompressionNegotiator::default().compress(&mask, 1024),
            Err(CompressError::EmptyMask)
        ));
    }

    #[test]
    fn test_data_url_and_blob() {
        let artifact = CompressionNegotiator::default()
            .compress(&MaskBuffer::all_black(8, 8), 1024 * 1024)
            .unwrap();

        let url = artifact.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,/9j/"));

        let blob = artifact.to_blob();
        assert_eq!(blob.file_name, "mask.jpg");
        assert_eq!(blob.content_type, "image/jpeg");
        assert_eq!(blob.len(), artifact.data.len());
    }
}
