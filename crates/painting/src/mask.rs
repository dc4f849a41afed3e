//! Mask rasterization: stroke raster to a binary source-sized mask
//!
//! The drawing surface shows the image letterboxed. Generating the mask runs
//! that placement backwards: only the render rectangle of the stroke raster is
//! sampled, stretched over the full natural-size target, then binarized.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use maskpaint_config::GeometryPolicy;
use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::{ImageGeometry, MaskMapping};
use crate::raster::{ExportError, StrokeRaster};

/// Selected pixel
pub const MASK_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Unselected pixel
pub const MASK_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaskError {
    /// The stroke raster could not be read back
    #[error("Canvas export failed: {0}")]
    Export(#[from] ExportError),

    /// Image placement unknown and the policy refuses to guess
    #[error("Image geometry is not resolved yet")]
    GeometryUnresolved,
}

/// Binary mask in source-image space, opaque black or opaque white only
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuffer {
    image: RgbaImage,
}

impl MaskBuffer {
    /// "No edit region selected"
    pub fn all_black(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, MASK_BLACK),
        }
    }

    /// Binarize a raster of the same size: alpha > 0 is selected
    pub fn from_alpha(raster: &RgbaImage) -> Self {
        let image = RgbaImage::from_fn(raster.width(), raster.height(), |x, y| {
            if raster.get_pixel(x, y).0[3] > 0 {
                MASK_WHITE
            } else {
                MASK_BLACK
            }
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Every pixel is exactly [`MASK_WHITE`] or [`MASK_BLACK`]
    pub fn is_binary(&self) -> bool {
        self.image
            .pixels()
            .all(|p| *p == MASK_WHITE || *p == MASK_BLACK)
    }

    pub fn white_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| **p == MASK_WHITE).count()
    }

    /// Lossless PNG encoding, used for the persisted copy
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Generate the mask for the current stroke raster.
///
/// Stateless: unchanged inputs give a pixel-identical mask.
pub fn generate_mask<R: StrokeRaster + ?Sized>(
    raster: &R,
    geometry: &ImageGeometry,
    policy: GeometryPolicy,
) -> Result<MaskBuffer, MaskError> {
    let mapping = geometry
        .mask_mapping(policy)
        .ok_or(MaskError::GeometryUnresolved)?;
    if mapping.target.is_empty() {
        return Err(MaskError::GeometryUnresolved);
    }

    let source = raster.export()?;
    let mask = binarize_region(&source, &mapping);

    info!(
        "Mask generated: {}x{} from region ({:.1}, {:.1}) {:.1}x{:.1}, {} selected pixels",
        mask.width(),
        mask.height(),
        mapping.source.x,
        mapping.source.y,
        mapping.source.width,
        mapping.source.height,
        mask.white_pixel_count()
    );
    Ok(mask)
}

/// Nearest-neighbour stretch of `mapping.source` onto the target, then
/// alpha > 0 becomes white and everything else black
fn binarize_region(source: &RgbaImage, mapping: &MaskMapping) -> MaskBuffer {
    let (src_w, src_h) = source.dimensions();
    let target = mapping.target;
    let rect = mapping.source;
    let step_x = rect.width / target.width as f32;
    let step_y = rect.height / target.height as f32;

    debug!(
        "binarize_region: {}x{} raster -> {}x{} (step {:.3}, {:.3})",
        src_w, src_h, target.width, target.height, step_x, step_y
    );

    let sample = |start: f32, step: f32, t: u32, limit: u32| -> Option<u32> {
        if limit == 0 {
            return None;
        }
        let s = (start + (t as f32 + 0.5) * step).floor();
        Some((s.max(0.0) as u32).min(limit - 1))
    };

    let image = RgbaImage::from_fn(target.width, target.height, |tx, ty| {
        let sx = sample(rect.x, step_x, tx, src_w);
        let sy = sample(rect.y, step_y, ty, src_h);
        match (sx, sy) {
            (Some(sx), Some(sy)) if source.get_pixel(sx, sy).0[3] > 0 => MASK_WHITE,
            _ => MASK_BLACK,
        }
    });

    MaskBuffer { image }
}
