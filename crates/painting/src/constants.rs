/// Default tile size for the stroke raster.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Brush spacing as a fraction of the stroke width.
pub const DAB_SPACING: f32 = 0.25;

/// Lower bound on dab spacing in pixels, keeps thin strokes from exploding.
pub const MIN_DAB_SPACING: f32 = 0.5;

/// MIME type of the compressed mask.
pub const MASK_CONTENT_TYPE: &str = "image/jpeg";

/// File name the mask is persisted under.
pub const MASK_FILE_NAME: &str = "mask.jpg";
