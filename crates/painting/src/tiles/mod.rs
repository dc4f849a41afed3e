//! Tiled stroke raster with dirty tracking
//!
//! The preview loop only exports when some tile changed since the last
//! frame, so idle frames cost a set lookup.

mod dab_application;
mod dirty_tracking;

use std::collections::HashSet;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::surface::CpuSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

/// Stroke raster split into square tiles for change tracking
pub struct TiledSurface {
    pub(crate) surface: CpuSurface,
    pub(crate) tile_size: u32,
    pub(crate) dirty_tiles: HashSet<TileCoord>,
}

impl TiledSurface {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            surface: CpuSurface::new(width, height),
            tile_size: tile_size.max(1),
            dirty_tiles: HashSet::new(),
        }
    }

    pub fn with_default_tile_size(width: u32, height: u32) -> Self {
        Self::new(width, height, DEFAULT_TILE_SIZE)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.surface.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.surface.height
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tile grid size, partial tiles at the right and bottom edges included
    pub fn tile_grid(&self) -> (u32, u32) {
        (
            self.width().div_ceil(self.tile_size),
            self.height().div_ceil(self.tile_size),
        )
    }

    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Erase everything. Every tile counts as changed.
    pub fn clear(&mut self) {
        self.surface.clear([0.0; 4]);
        self.mark_region_dirty(0, 0, self.width(), self.height());
    }
}
