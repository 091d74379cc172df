#![forbid(unsafe_code)]

//! Pixel and grid-cell geometry.
//!
//! Pointer input arrives in CSS pixels relative to the viewport; placements
//! live in integer grid cells. [`GridMetrics`] is the single place where the
//! two spaces meet.
//!
//! Rounding follows the host's `Math.round`: ties round toward positive
//! infinity (`round_half_up(-0.5) == 0`, `round_half_up(-1.5) == -1`).
//! [`f64::round`] rounds ties away from zero and would shift negative drag
//! deltas by one cell at exact half-cell offsets.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::GridConfig;

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for PixelPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PixelPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned box in CSS pixels (a bounding client rect).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Rectangle moved by `offset`.
    #[must_use]
    pub fn translate(&self, offset: PixelPoint) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Whether `point` lies inside (left/top inclusive, right/bottom exclusive).
    #[must_use]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// A rectangle in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl GridRect {
    #[must_use]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    /// Positive-area intersection. Shared edges are not an overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &GridRect) -> bool {
        !(self.right() <= other.x as u32
            || other.right() <= self.x as u32
            || self.bottom() <= other.y as u32
            || other.bottom() <= self.y as u32)
    }
}

/// Round to the nearest integer, ties toward positive infinity.
#[inline]
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Divide and round to a whole number of cells.
///
/// Degenerate divisors (zero, negative, non-finite) and non-finite values
/// yield 0 cells. The `as` cast saturates at the `i32` range.
fn cells(value: f64, divisor: f64) -> i32 {
    if !value.is_finite() || !divisor.is_finite() || divisor <= 0.0 {
        return 0;
    }
    round_half_up(value / divisor) as i32
}

/// Pixel metrics of a grid rendered into a container of known width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    column_count: u16,
    column_width: f64,
    row_height: f64,
    gap: f64,
}

impl GridMetrics {
    /// Derive metrics for `grid` laid out in a container `container_width_px`
    /// wide: `column_width = (W - (cols - 1) * gap) / cols`.
    #[must_use]
    pub fn new(grid: &GridConfig, container_width_px: f64) -> Self {
        let cols = f64::from(grid.column_count.max(1));
        let column_width = (container_width_px - (cols - 1.0) * grid.gap_px) / cols;
        Self {
            column_count: grid.column_count.max(1),
            column_width,
            row_height: grid.row_height_px,
            gap: grid.gap_px,
        }
    }

    #[must_use]
    pub const fn column_count(&self) -> u16 {
        self.column_count
    }

    #[must_use]
    pub const fn column_width(&self) -> f64 {
        self.column_width
    }

    #[must_use]
    pub const fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Distance between the tops of consecutive rows.
    #[must_use]
    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.gap
    }

    /// Distance between the left edges of consecutive columns.
    #[must_use]
    pub fn column_pitch(&self) -> f64 {
        self.column_width + self.gap
    }

    /// Grid column for a pixel offset from the container's left edge.
    #[must_use]
    pub fn to_grid_x(&self, px: f64) -> i32 {
        cells(px, self.column_width)
    }

    /// Grid row for a pixel offset from the container's top edge.
    #[must_use]
    pub fn to_grid_y(&self, px: f64) -> i32 {
        cells(px, self.row_pitch())
    }

    /// Whole rows covered by a vertical pointer delta.
    #[must_use]
    pub fn rows_for_delta(&self, dy: f64) -> i32 {
        cells(dy, self.row_pitch())
    }

    /// Whole columns covered by a horizontal pointer delta.
    #[must_use]
    pub fn columns_for_delta(&self, dx: f64) -> i32 {
        cells(dx, self.column_pitch())
    }

    /// Pixel box of a placement relative to the container's top-left corner.
    #[must_use]
    pub fn cell_rect(&self, rect: &GridRect) -> PixelRect {
        let w = f64::from(rect.w);
        let h = f64::from(rect.h);
        PixelRect::new(
            f64::from(rect.x) * self.column_pitch(),
            f64::from(rect.y) * self.row_pitch(),
            (w * self.column_width + (w - 1.0) * self.gap).max(0.0),
            (h * self.row_height + (h - 1.0) * self.gap).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Breakpoint;

    fn grid(cols: u16, row: f64, gap: f64) -> GridConfig {
        GridConfig {
            column_count: cols,
            row_height_px: row,
            gap_px: gap,
            breakpoint: Breakpoint::Lg,
        }
    }

    #[test]
    fn round_half_up_matches_host_rounding() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(1.49), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-1.51), -2.0);
    }

    #[test]
    fn column_width_subtracts_gaps() {
        // 12 columns, 11 gaps of 16px in 1200px: (1200 - 176) / 12.
        let m = GridMetrics::new(&grid(12, 80.0, 16.0), 1200.0);
        assert!((m.column_width() - 1024.0 / 12.0).abs() < 1e-9);
        assert_eq!(m.row_pitch(), 96.0);
    }

    #[test]
    fn pixel_to_grid_rounds() {
        let m = GridMetrics::new(&grid(4, 100.0, 0.0), 400.0);
        assert_eq!(m.to_grid_x(149.0), 1);
        assert_eq!(m.to_grid_x(150.0), 2);
        assert_eq!(m.to_grid_y(-49.0), 0);
        assert_eq!(m.to_grid_y(-50.0), 0);
        assert_eq!(m.to_grid_y(-51.0), -1);
        assert_eq!(m.rows_for_delta(250.0), 3);
        assert_eq!(m.columns_for_delta(-260.0), -3);
    }

    #[test]
    fn degenerate_container_maps_to_zero() {
        let m = GridMetrics::new(&grid(12, 80.0, 16.0), 0.0);
        assert!(m.column_width() < 0.0);
        assert_eq!(m.to_grid_x(500.0), 0);
        assert_eq!(m.columns_for_delta(f64::NAN), 0);
    }

    #[test]
    fn cell_rect_spans_internal_gaps() {
        let m = GridMetrics::new(&grid(4, 50.0, 10.0), 430.0);
        // column width = (430 - 30) / 4 = 100
        let rect = m.cell_rect(&GridRect::new(1, 2, 2, 3));
        assert_eq!(rect, PixelRect::new(110.0, 120.0, 210.0, 170.0));
    }

    #[test]
    fn grid_rect_overlap_excludes_touching_edges() {
        let a = GridRect::new(0, 0, 2, 2);
        assert!(a.overlaps(&GridRect::new(1, 1, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(2, 0, 2, 2)));
        assert!(!a.overlaps(&GridRect::new(0, 2, 2, 2)));
    }

    #[test]
    fn pixel_rect_contains_is_half_open() {
        let r = PixelRect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(PixelPoint::new(10.0, 10.0)));
        assert!(!r.contains(PixelPoint::new(30.0, 15.0)));
        assert_eq!(
            r.translate(PixelPoint::new(5.0, -5.0)).origin(),
            PixelPoint::new(15.0, 5.0)
        );
    }
}
