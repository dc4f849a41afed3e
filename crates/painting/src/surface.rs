//! CPU surface holding the stroke raster in drawing-surface space

use image::RgbaImage;

const TRANSPARENT: [f32; 4] = [0.0; 4];

/// Straight-alpha float raster of the strokes drawn so far
///
/// Untouched pixels stay transparent, which is what the mask stage reads
/// as black.
pub struct CpuSurface {
    pub width: u32,
    pub height: u32,
    /// Row-major `[r, g, b, a]`
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Fill every pixel with `color`
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    #[inline]
    fn slot(&mut self, x: u32, y: u32) -> Option<&mut [f32; 4]> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
            .map(move |i| &mut self.pixels[i])
    }

    /// Pixel at `(x, y)`, `None` outside the surface
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Source-over composite of `color` at `coverage` onto one pixel
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], coverage: f32) {
        if let Some(px) = self.slot(x, y) {
            let a = color[3] * coverage;
            let keep = 1.0 - a;
            *px = [
                color[0] * a + px[0] * keep,
                color[1] * a + px[1] * keep,
                color[2] * a + px[2] * keep,
                a + px[3] * keep,
            ];
        }
    }

    /// Destination-out: scale the pixel down by `1 - amount`
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, amount: f32) {
        if let Some(px) = self.slot(x, y) {
            let keep = (1.0 - amount).max(0.0);
            *px = px.map(|c| c * keep);
        }
    }

    /// Quantize to 8-bit RGBA, rounding each channel
    ///
    /// Returns None when the buffer does not match the dimensions.
    pub fn to_rgba8(&self) -> Option<RgbaImage> {
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect();
        RgbaImage::from_raw(self.width, self.height, raw)
    }
}
