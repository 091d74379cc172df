#![forbid(unsafe_code)]

//! Grid layout primitives for dashboard customization.
//!
//! # Role in dashgrid
//! `dashgrid-layout` is the pure layer. It owns the widget placement model,
//! the collision-free compaction kernel, pixel/grid translation, and the
//! per-widget gesture state machine. Nothing in this crate performs I/O or
//! keeps state between calls except the explicit [`GestureController`].
//!
//! # How it fits in the system
//! `dashgrid-web` feeds host pointer events into [`GestureController`]s and
//! renders [`Layout`]s; `dashgrid-runtime` stores committed layouts with
//! undo/redo and debounced persistence.

pub mod compact;
pub mod geometry;
pub mod gesture;
pub mod placement;
pub mod responsive;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use compact::{
    COMPACTION_ITERATION_LIMIT, DEFAULT_COLUMN_COUNT, clamp_to_columns, is_overlapping, move_item,
    sanitize_layout,
};
pub use geometry::{GridMetrics, GridRect, PixelPoint, PixelRect, round_half_up};
pub use gesture::{
    CommittedLayout, CursorAffordance, GestureContext, GestureController, GestureDispatch,
    GestureKind, GestureOutcome, GestureSession, GestureState, HostCommand, IgnoredReason,
    LayoutUpdate,
};
pub use placement::{
    Layout, LayoutValidationError, WidgetCatalog, WidgetId, WidgetPlacement, WidgetSize,
};
pub use responsive::Responsive;

/// Responsive breakpoint tiers.
///
/// Ordered from smallest to largest. Each variant represents a viewport
/// width range determined by [`Breakpoints`].
///
/// | Breakpoint | Default Min Width | Typical Use            |
/// |-----------|-------------------|------------------------|
/// | `Xs`      | < 480 px          | Phones                 |
/// | `Sm`      | 480–767 px        | Large phones           |
/// | `Md`      | 768–1023 px       | Tablets                |
/// | `Lg`      | 1024–1439 px      | Laptops                |
/// | `Xl`      | 1440+ px          | Desktop monitors       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakpoint {
    /// Extra small: narrowest tier.
    Xs,
    /// Small.
    Sm,
    /// Medium.
    Md,
    /// Large.
    Lg,
    /// Extra large.
    Xl,
}

impl Breakpoint {
    /// All breakpoints in ascending order.
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    /// Ordinal index (0–4).
    #[inline]
    const fn index(self) -> usize {
        match self {
            Breakpoint::Xs => 0,
            Breakpoint::Sm => 1,
            Breakpoint::Md => 2,
            Breakpoint::Lg => 3,
            Breakpoint::Xl => 4,
        }
    }

    /// Parse a [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bp| bp.label() == label)
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breakpoint thresholds for responsive grids.
///
/// Each field is the minimum viewport width (CSS pixels) for that
/// breakpoint. `Xs` implicitly starts at width 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoints {
    /// Minimum width for Sm.
    pub sm: u32,
    /// Minimum width for Md.
    pub md: u32,
    /// Minimum width for Lg.
    pub lg: u32,
    /// Minimum width for Xl.
    pub xl: u32,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Breakpoints {
    /// Default breakpoints: 480 / 768 / 1024 / 1440 pixels.
    pub const DEFAULT: Self = Self {
        sm: 480,
        md: 768,
        lg: 1024,
        xl: 1440,
    };

    /// Create breakpoints with explicit thresholds.
    ///
    /// Values are sanitized to be monotonically non-decreasing.
    pub const fn new(sm: u32, md: u32, lg: u32, xl: u32) -> Self {
        let md = if md < sm { sm } else { md };
        let lg = if lg < md { md } else { lg };
        let xl = if xl < lg { lg } else { xl };
        Self { sm, md, lg, xl }
    }

    /// Classify a viewport width into a breakpoint bucket.
    ///
    /// Non-finite or negative widths classify as `Xs`.
    #[must_use]
    pub fn classify_width(self, width_px: f64) -> Breakpoint {
        if !width_px.is_finite() || width_px < 0.0 {
            return Breakpoint::Xs;
        }
        if width_px >= f64::from(self.xl) {
            Breakpoint::Xl
        } else if width_px >= f64::from(self.lg) {
            Breakpoint::Lg
        } else if width_px >= f64::from(self.md) {
            Breakpoint::Md
        } else if width_px >= f64::from(self.sm) {
            Breakpoint::Sm
        } else {
            Breakpoint::Xs
        }
    }

    /// Get the minimum width threshold for a given breakpoint.
    #[must_use]
    pub const fn threshold(self, bp: Breakpoint) -> u32 {
        match bp {
            Breakpoint::Xs => 0,
            Breakpoint::Sm => self.sm,
            Breakpoint::Md => self.md,
            Breakpoint::Lg => self.lg,
            Breakpoint::Xl => self.xl,
        }
    }
}

/// Grid configuration for the current viewport.
///
/// Supplied by a [`GridConfigProvider`]; the kernel and gesture controller
/// read it and never compute it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Number of columns (≥ 1).
    pub column_count: u16,
    /// Height of one row in CSS pixels (> 0).
    pub row_height_px: f64,
    /// Gap between rows and columns in CSS pixels (≥ 0).
    pub gap_px: f64,
    /// Breakpoint this configuration was resolved for.
    #[serde(rename = "breakpointKey")]
    pub breakpoint: Breakpoint,
}

impl GridConfig {
    /// Construct a validated grid configuration.
    pub fn new(
        column_count: u16,
        row_height_px: f64,
        gap_px: f64,
        breakpoint: Breakpoint,
    ) -> Result<Self, GridConfigError> {
        let config = Self {
            column_count,
            row_height_px,
            gap_px,
            breakpoint,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric invariants.
    pub fn validate(&self) -> Result<(), GridConfigError> {
        if self.column_count == 0 {
            return Err(GridConfigError::ZeroColumns);
        }
        if !self.row_height_px.is_finite() || self.row_height_px <= 0.0 {
            return Err(GridConfigError::InvalidRowHeight {
                value: self.row_height_px,
            });
        }
        if !self.gap_px.is_finite() || self.gap_px < 0.0 {
            return Err(GridConfigError::InvalidGap { value: self.gap_px });
        }
        Ok(())
    }

    /// Vertical distance between the tops of two consecutive rows.
    #[must_use]
    pub fn row_pitch(&self) -> f64 {
        self.row_height_px + self.gap_px
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            row_height_px: 80.0,
            gap_px: 16.0,
            breakpoint: Breakpoint::Lg,
        }
    }
}

/// Grid configuration failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridConfigError {
    ZeroColumns,
    InvalidRowHeight { value: f64 },
    InvalidGap { value: f64 },
}

impl fmt::Display for GridConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::InvalidRowHeight { value } => {
                write!(f, "invalid row height {value}px (must be finite and > 0)")
            }
            Self::InvalidGap { value } => {
                write!(f, "invalid gap {value}px (must be finite and >= 0)")
            }
        }
    }
}

impl std::error::Error for GridConfigError {}

/// Source of the grid configuration for the current viewport.
///
/// Implementations are re-evaluated by the host whenever the viewport
/// resizes; the returned value is treated as reactive input.
pub trait GridConfigProvider {
    /// Resolve the grid configuration for a viewport width in CSS pixels.
    fn grid_for_width(&self, viewport_width_px: f64) -> GridConfig;
}

impl<F> GridConfigProvider for F
where
    F: Fn(f64) -> GridConfig,
{
    fn grid_for_width(&self, viewport_width_px: f64) -> GridConfig {
        self(viewport_width_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_width_uses_default_thresholds() {
        let bps = Breakpoints::DEFAULT;
        assert_eq!(bps.classify_width(0.0), Breakpoint::Xs);
        assert_eq!(bps.classify_width(479.9), Breakpoint::Xs);
        assert_eq!(bps.classify_width(480.0), Breakpoint::Sm);
        assert_eq!(bps.classify_width(800.0), Breakpoint::Md);
        assert_eq!(bps.classify_width(1024.0), Breakpoint::Lg);
        assert_eq!(bps.classify_width(2560.0), Breakpoint::Xl);
    }

    #[test]
    fn classify_width_rejects_non_finite() {
        assert_eq!(
            Breakpoints::DEFAULT.classify_width(f64::NAN),
            Breakpoint::Xs
        );
        assert_eq!(Breakpoints::DEFAULT.classify_width(-5.0), Breakpoint::Xs);
    }

    #[test]
    fn labels_round_trip() {
        for bp in Breakpoint::ALL {
            assert_eq!(Breakpoint::from_label(bp.label()), Some(bp));
        }
        assert_eq!(Breakpoint::from_label("XL"), None);
    }

    #[test]
    fn breakpoints_new_is_monotonic() {
        let bps = Breakpoints::new(600, 400, 900, 100);
        assert_eq!(bps.md, 600);
        assert_eq!(bps.xl, 900);
        assert_eq!(bps.threshold(Breakpoint::Xs), 0);
    }

    #[test]
    fn grid_config_validation() {
        assert!(GridConfig::new(12, 80.0, 16.0, Breakpoint::Lg).is_ok());
        assert_eq!(
            GridConfig::new(0, 80.0, 16.0, Breakpoint::Lg),
            Err(GridConfigError::ZeroColumns)
        );
        assert!(matches!(
            GridConfig::new(4, 0.0, 16.0, Breakpoint::Xs),
            Err(GridConfigError::InvalidRowHeight { .. })
        ));
        assert!(matches!(
            GridConfig::new(4, 40.0, -1.0, Breakpoint::Xs),
            Err(GridConfigError::InvalidGap { .. })
        ));
    }

    #[test]
    fn grid_config_serde_uses_host_field_names() {
        let json = serde_json::to_value(GridConfig::default()).unwrap();
        assert_eq!(json["columnCount"], 12);
        assert_eq!(json["breakpointKey"], "lg");
        let back: GridConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, GridConfig::default());
    }

    #[test]
    fn closures_are_providers() {
        let provider = |width: f64| GridConfig {
            column_count: if width < 600.0 { 4 } else { 12 },
            ..GridConfig::default()
        };
        assert_eq!(provider.grid_for_width(320.0).column_count, 4);
        assert_eq!(provider.grid_for_width(1280.0).column_count, 12);
    }
}
