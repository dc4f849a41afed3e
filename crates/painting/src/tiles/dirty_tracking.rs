//! Which tiles changed since the last preview export

use super::{TileCoord, TiledSurface};

impl TiledSurface {
    /// Record every tile overlapping the given rectangle as changed
    pub fn mark_region_dirty(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 || x >= self.width() || y >= self.height() {
            return;
        }
        let last_x = (x.saturating_add(w).min(self.width()) - 1) / self.tile_size;
        let last_y = (y.saturating_add(h).min(self.height()) - 1) / self.tile_size;

        let first_x = x / self.tile_size;
        for ty in y / self.tile_size..=last_y {
            self.dirty_tiles
                .extend((first_x..=last_x).map(|tx| TileCoord { x: tx, y: ty }));
        }
    }

    /// Drain the changed tiles
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.dirty_tiles.drain().collect()
    }

    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }
}
