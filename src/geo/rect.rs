//! Axis-aligned rectangles in world-pixel coordinates.

use super::projection::TILE_SIZE;

/// Half-open rectangle `[left, right) x [top, bottom)` in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl WorldRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle of `width x height` centred on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Self::new(cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }

    /// Footprint of tile `(x, y)` where each tile pixel covers `scale`
    /// world pixels on each axis.
    pub fn tile(x: u32, y: u32, scale: u64) -> Self {
        let side = TILE_SIZE as f64 * scale as f64;
        let left = x as f64 * side;
        let top = y as f64 * side;
        Self::new(left, top, left + side, top + side)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Intersection with `other`, or `None` when empty or degenerate.
    pub fn intersect(&self, other: &WorldRect) -> Option<WorldRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);

        if left >= right || top >= bottom {
            return None;
        }
        Some(WorldRect::new(left, top, right, bottom))
    }
}
