//! Letterbox placement of the source image inside the drawing container
//!
//! Strokes live in drawing-surface space. The source image is shown inside
//! the container at its native aspect ratio, scaled to the largest size that
//! fits and centered on the axis with slack. The helpers here map between the
//! two spaces.

use glam::Vec2;
use maskpaint_config::GeometryPolicy;
use serde::{Deserialize, Serialize};

use crate::types::ImageDimensions;

/// Axis-aligned rectangle in drawing-surface space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RenderRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole container
    pub fn covering(container: ImageDimensions) -> Self {
        Self::new(0.0, 0.0, container.width as f32, container.height as f32)
    }

    /// Width and height are both strictly positive
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Inclusive on all edges, so the bottom-right corner is inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}

/// Largest rectangle with the image's aspect ratio that fits in the container,
/// centered on the axis that does not fill.
///
/// Returns an empty rectangle when either input has a zero side.
pub fn compute_render_rect(natural: Vec2, container: Vec2) -> RenderRect {
    if natural.x <= 0.0 || natural.y <= 0.0 || container.x <= 0.0 || container.y <= 0.0 {
        return RenderRect::default();
    }

    let image_ratio = natural.x / natural.y;
    let container_ratio = container.x / container.y;

    if image_ratio > container_ratio {
        // Wider than the container: width fills, letterbox top and bottom
        let height = container.x / image_ratio;
        RenderRect::new(0.0, (container.y - height) / 2.0, container.x, height)
    } else {
        // Taller (or equal): height fills, pillarbox left and right
        let width = container.y * image_ratio;
        RenderRect::new((container.x - width) / 2.0, 0.0, width, container.y)
    }
}

/// Map a drawing-surface point into source-image pixel space.
pub fn to_source_space(point: Vec2, rect: &RenderRect, natural: Vec2) -> Vec2 {
    let scale = natural / rect.size();
    (point - rect.min()) * scale
}

/// Map a source-image point back into drawing-surface space.
pub fn to_display_space(point: Vec2, rect: &RenderRect, natural: Vec2) -> Vec2 {
    let scale = rect.size() / natural;
    point * scale + rect.min()
}

/// Input gate: is the drawing-surface point over the displayed image?
pub fn is_inside_image(point: Vec2, rect: &RenderRect) -> bool {
    rect.is_valid() && rect.contains(point)
}

/// How mask generation maps the stroke raster onto the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskMapping {
    /// Region of the drawing surface that is sampled
    pub source: RenderRect,
    /// Output size in pixels
    pub target: ImageDimensions,
}

/// Source image size, container size and the derived placement.
///
/// Recomputed whenever the container resizes or a new image loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    natural: Option<ImageDimensions>,
    container: ImageDimensions,
}

impl ImageGeometry {
    /// Geometry for a container with no image loaded yet
    pub fn new(container: ImageDimensions) -> Self {
        Self {
            natural: None,
            container,
        }
    }

    pub fn with_natural(container: ImageDimensions, natural: ImageDimensions) -> Self {
        Self {
            natural: Some(natural),
            container,
        }
    }

    pub fn natural(&self) -> Option<ImageDimensions> {
        self.natural
    }

    pub fn container(&self) -> ImageDimensions {
        self.container
    }

    pub fn set_natural(&mut self, natural: ImageDimensions) {
        self.natural = Some(natural);
    }

    pub fn clear_natural(&mut self) {
        self.natural = None;
    }

    pub fn set_container(&mut self, container: ImageDimensions) {
        self.container = container;
    }

    /// Letterboxed placement, `None` until the image size is known and the
    /// placement is non-degenerate
    pub fn render_rect(&self) -> Option<RenderRect> {
        let natural = self.natural.filter(|n| !n.is_empty())?;
        let rect = compute_render_rect(natural.as_vec2(), self.container.as_vec2());
        rect.is_valid().then_some(rect)
    }

    /// Region that accepts pointer input. Falls back to the whole container
    /// while the image size is unknown.
    pub fn input_region(&self) -> RenderRect {
        self.render_rect()
            .unwrap_or_else(|| RenderRect::covering(self.container))
    }

    /// Drawing-surface point to source pixel, if the placement is known
    pub fn to_source(&self, point: Vec2) -> Option<Vec2> {
        let rect = self.render_rect()?;
        let natural = self.natural?.as_vec2();
        Some(to_source_space(point, &rect, natural))
    }

    /// Resolve the sampling region and output size for mask generation.
    ///
    /// With an unresolved placement, [`GeometryPolicy::FullSurface`] samples the
    /// whole container into a target of the natural size (or the container
    /// size if that is unknown too); [`GeometryPolicy::Abort`] yields `None`.
    pub fn mask_mapping(&self, policy: GeometryPolicy) -> Option<MaskMapping> {
        if let (Some(rect), Some(natural)) = (self.render_rect(), self.natural) {
            return Some(MaskMapping {
                source: rect,
                target: natural,
            });
        }

        match policy {
            GeometryPolicy::Abort => None,
            GeometryPolicy::FullSurface => {
                if self.container.is_empty() {
                    return None;
                }
                let target = self
                    .natural
                    .filter(|n| !n.is_empty())
                    .unwrap_or(self.container);
                Some(MaskMapping {
                    source: RenderRect::covering(self.container),
                    target,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_portrait_in_landscape_ratio_container() {
        // 1024x2048 image (ratio 0.5) in a 360x480 container (ratio 0.75)
        let rect = compute_render_rect(Vec2::new(1024.0, 2048.0), Vec2::new(360.0, 480.0));
        assert!(approx(rect.x, 60.0));
        assert!(approx(rect.y, 0.0));
        assert!(approx(rect.width, 240.0));
        assert!(approx(rect.height, 480.0));
    }

    #[test]
    fn test_landscape_image_letterboxes_vertically() {
        let rect = compute_render_rect(Vec2::new(1600.0, 900.0), Vec2::new(400.0, 400.0));
        assert!(approx(rect.x, 0.0));
        assert!(approx(rect.width, 400.0));
        assert!(approx(rect.height, 225.0));
        assert!(approx(rect.y, 87.5));
    }

    #[test]
    fn test_letterbox_invariant_over_many_shapes() {
        let naturals = [(1.0, 1.0), (1024.0, 2048.0), (3000.0, 200.0), (7.0, 13.0), (640.0, 480.0)];
        let containers = [(360.0, 480.0), (512.0, 512.0), (1920.0, 1080.0), (50.0, 700.0)];

        for &(nw, nh) in &naturals {
            for &(cw, ch) in &containers {
                let rect = compute_render_rect(Vec2::new(nw, nh), Vec2::new(cw, ch));
                assert!(rect.is_valid());

                // Contained
                assert!(rect.x >= -EPS && rect.y >= -EPS);
                assert!(rect.x + rect.width <= cw + EPS);
                assert!(rect.y + rect.height <= ch + EPS);

                // Aspect ratio preserved
                let ratio = rect.width / rect.height;
                assert!(((ratio - nw / nh) / (nw / nh)).abs() < 1e-4);

                // One axis fills, the other is centered
                let fills_w = approx(rect.width, cw);
                let fills_h = approx(rect.height, ch);
                assert!(fills_w || fills_h);
                assert!(approx(rect.x * 2.0 + rect.width, cw));
                assert!(approx(rect.y * 2.0 + rect.height, ch));
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_give_empty_rect() {
        let rect = compute_render_rect(Vec2::ZERO, Vec2::new(360.0, 480.0));
        assert!(!rect.is_valid());
        let rect = compute_render_rect(Vec2::new(10.0, 10.0), Vec2::new(0.0, 480.0));
        assert!(!rect.is_valid());
    }

    #[test]
    fn test_to_source_space_corners() {
        let natural = Vec2::new(1024.0, 2048.0);
        let rect = compute_render_rect(natural, Vec2::new(360.0, 480.0));

        let top_left = to_source_space(Vec2::new(60.0, 0.0), &rect, natural);
        assert!(approx(top_left.x, 0.0) && approx(top_left.y, 0.0));

        let bottom_right = to_source_space(Vec2::new(300.0, 480.0), &rect, natural);
        assert!(approx(bottom_right.x, 1024.0) && approx(bottom_right.y, 2048.0));
    }

    #[test]
    fn test_display_space_inverts_source_space() {
        let natural = Vec2::new(1600.0, 900.0);
        let rect = compute_render_rect(natural, Vec2::new(400.0, 400.0));
        for point in [Vec2::new(0.0, 87.5), Vec2::new(123.4, 200.0), Vec2::new(400.0, 312.5)] {
            let source = to_source_space(point, &rect, natural);
            let back = to_display_space(source, &rect, natural);
            assert!(approx(back.x, point.x) && approx(back.y, point.y));
            assert_eq!(is_inside_image(point, &rect), is_inside_image(back, &rect));
        }
    }

    #[test]
    fn test_is_inside_image() {
        let rect = RenderRect::new(60.0, 0.0, 240.0, 480.0);
        assert!(is_inside_image(Vec2::new(60.0, 0.0), &rect));
        assert!(is_inside_image(Vec2::new(300.0, 480.0), &rect));
        assert!(!is_inside_image(Vec2::new(59.9, 10.0), &rect));
        assert!(!is_inside_image(Vec2::new(100.0, 480.1), &rect));
        assert!(!is_inside_image(Vec2::new(0.0, 0.0), &RenderRect::default()));
    }

    #[test]
    fn test_geometry_without_image() {
        let geometry = ImageGeometry::new(ImageDimensions::new(360, 480));
        assert!(geometry.render_rect().is_none());
        assert!(geometry.to_source(Vec2::new(10.0, 10.0)).is_none());
        assert_eq!(geometry.input_region(), RenderRect::new(0.0, 0.0, 360.0, 480.0));
    }

    #[test]
    fn test_mask_mapping_resolved() {
        let geometry =
            ImageGeometry::with_natural(ImageDimensions::new(360, 480), ImageDimensions::new(1024, 2048));
        for policy in [GeometryPolicy::FullSurface, GeometryPolicy::Abort] {
            let mapping = geometry.mask_mapping(policy).unwrap();
            assert_eq!(mapping.target, ImageDimensions::new(1024, 2048));
            assert!(approx(mapping.source.x, 60.0));
        }
    }

    #[test]
    fn test_mask_mapping_unresolved_policies() {
        let geometry = ImageGeometry::new(ImageDimensions::new(360, 480));

        assert!(geometry.mask_mapping(GeometryPolicy::Abort).is_none());

        let mapping = geometry.mask_mapping(GeometryPolicy::FullSurface).unwrap();
        assert_eq!(mapping.source, RenderRect::new(0.0, 0.0, 360.0, 480.0));
        assert_eq!(mapping.target, ImageDimensions::new(360, 480));
    }

    #[test]
    fn test_mask_mapping_zero_container() {
        let geometry = ImageGeometry::with_natural(ImageDimensions::new(0, 0), ImageDimensions::new(64, 64));
        assert!(geometry.render_rect().is_none());
        let mapping = geometry.mask_mapping(GeometryPolicy::FullSurface);
        assert!(mapping.is_none());
    }
}
