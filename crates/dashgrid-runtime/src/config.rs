#![forbid(unsafe_code)]

//! Dashboard configuration as data.
//!
//! [`DashboardConfig`] groups the store tunables and the responsive grid
//! policy so a host can ship them as a TOML or JSON file instead of code.
//!
//! ```toml
//! [store]
//! debounce_ms = 750
//! max_history = 50
//!
//! [grid.breakpoints]
//! sm = 480
//! md = 768
//! lg = 1024
//! xl = 1440
//!
//! [grid.grids.xs]
//! column_count = 4
//! row_height_px = 72.0
//! gap_px = 12.0
//!
//! [grid.grids.lg]
//! column_count = 12
//! row_height_px = 80.0
//! gap_px = 16.0
//!
//! [grid.variants]
//! xs = "mobile"
//! md = "desktop"
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use dashgrid_layout::{Breakpoint, Breakpoints, GridConfig, GridConfigProvider, Responsive};
use serde::{Deserialize, Serialize};

use crate::LayoutVariant;

// ---------------------------------------------------------------------------
// Store configuration
// ---------------------------------------------------------------------------

/// Tunables of the layout store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Quiet period before a changed layout is written.
    #[serde(rename = "debounce_ms", with = "duration_ms")]
    pub debounce: Duration,
    /// Undo steps kept; older steps are dropped.
    pub max_history: usize,
    /// Drop placements whose id the widget catalog does not know at hydration.
    pub prune_unknown: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            max_history: 100,
            prune_unknown: false,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    #[must_use]
    pub fn with_prune_unknown(mut self, prune_unknown: bool) -> Self {
        self.prune_unknown = prune_unknown;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ---------------------------------------------------------------------------
// Grid policy
// ---------------------------------------------------------------------------

/// Grid shape for one breakpoint tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierGrid {
    pub column_count: u16,
    pub row_height_px: f64,
    pub gap_px: f64,
}

impl TierGrid {
    #[must_use]
    pub const fn new(column_count: u16, row_height_px: f64, gap_px: f64) -> Self {
        Self {
            column_count,
            row_height_px,
            gap_px,
        }
    }

    /// Grid configuration for `breakpoint`.
    #[must_use]
    pub fn at(&self, breakpoint: Breakpoint) -> GridConfig {
        GridConfig {
            column_count: self.column_count,
            row_height_px: self.row_height_px,
            gap_px: self.gap_px,
            breakpoint,
        }
    }
}

/// Breakpoint thresholds, per-tier grids, and the layout variant each tier
/// edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPolicy {
    pub breakpoints: Breakpoints,
    pub grids: Responsive<TierGrid>,
    pub variants: Responsive<LayoutVariant>,
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::DEFAULT,
            grids: Responsive::new(TierGrid::new(4, 80.0, 12.0))
                .at(Breakpoint::Md, TierGrid::new(8, 80.0, 16.0))
                .at(Breakpoint::Lg, TierGrid::new(12, 80.0, 16.0)),
            variants: Responsive::new(LayoutVariant::new("mobile"))
                .at(Breakpoint::Md, LayoutVariant::new("desktop")),
        }
    }
}

/// [`GridConfigProvider`] backed by a [`GridPolicy`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakpointGridProvider {
    policy: GridPolicy,
}

impl BreakpointGridProvider {
    #[must_use]
    pub fn new(policy: GridPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &GridPolicy {
        &self.policy
    }

    /// Tier for a viewport width.
    #[must_use]
    pub fn breakpoint_for(&self, viewport_width_px: f64) -> Breakpoint {
        self.policy.breakpoints.classify_width(viewport_width_px)
    }

    /// Layout variant edited at `breakpoint`.
    #[must_use]
    pub fn variant_for(&self, breakpoint: Breakpoint) -> LayoutVariant {
        self.policy.variants.resolve(breakpoint).clone()
    }

    /// Every distinct variant the policy can select, smallest tier first.
    #[must_use]
    pub fn variants(&self) -> Vec<LayoutVariant> {
        let mut out: Vec<LayoutVariant> = Vec::new();
        for bp in Breakpoint::ALL {
            let variant = self.policy.variants.resolve(bp);
            if !out.contains(variant) {
                out.push(variant.clone());
            }
        }
        out
    }
}

impl GridConfigProvider for BreakpointGridProvider {
    fn grid_for_width(&self, viewport_width_px: f64) -> GridConfig {
        let breakpoint = self.breakpoint_for(viewport_width_px);
        self.policy.grids.resolve(breakpoint).at(breakpoint)
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub store: StoreConfig,
    pub grid: GridPolicy,
}

impl DashboardConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check all parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let bps = self.grid.breakpoints;
        if !(bps.sm <= bps.md && bps.md <= bps.lg && bps.lg <= bps.xl) {
            errors.push(format!(
                "grid.breakpoints must be non-decreasing, got sm={} md={} lg={} xl={}",
                bps.sm, bps.md, bps.lg, bps.xl
            ));
        }

        for (bp, tier) in self.grid.grids.explicit_values() {
            if let Err(e) = tier.at(bp).validate() {
                errors.push(format!("grid.grids.{bp}: {e}"));
            }
        }

        for (bp, variant) in self.grid.variants.explicit_values() {
            if variant.as_str().trim().is_empty() {
                errors.push(format!("grid.variants.{bp} must not be empty"));
            }
        }

        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Grid provider for this policy.
    #[must_use]
    pub fn grid_provider(&self) -> BreakpointGridProvider {
        BreakpointGridProvider::new(self.grid.clone())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-toml")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-toml")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-toml")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.store.debounce, Duration::from_millis(1000));
        assert_eq!(config.store.max_history, 100);
        assert!(!config.store.prune_unknown);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = DashboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn json_overrides_store_fields() {
        let config =
            DashboardConfig::from_json_str(r#"{"store":{"debounce_ms":250,"prune_unknown":true}}"#)
                .unwrap();
        assert_eq!(config.store.debounce, Duration::from_millis(250));
        assert!(config.store.prune_unknown);
        assert_eq!(config.store.max_history, 100);
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn toml_policy_round_trip() {
        let config = DashboardConfig::from_toml_str(
            r#"
            [store]
            max_history = 5

            [grid.grids.xs]
            column_count = 2
            row_height_px = 60.0
            gap_px = 8.0

            [grid.grids.lg]
            column_count = 10
            row_height_px = 90.0
            gap_px = 20.0

            [grid.variants]
            xs = "phone"
            lg = "wide"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.max_history, 5);
        let provider = config.grid_provider();
        assert_eq!(provider.grid_for_width(320.0).column_count, 2);
        assert_eq!(provider.grid_for_width(900.0).column_count, 2);
        let wide = provider.grid_for_width(1300.0);
        assert_eq!(wide.column_count, 10);
        assert_eq!(wide.breakpoint, Breakpoint::Lg);
        assert_eq!(provider.variant_for(Breakpoint::Xl).as_str(), "wide");
        assert_eq!(
            provider.variants(),
            vec![LayoutVariant::new("phone"), LayoutVariant::new("wide")]
        );
    }

    #[cfg(feature = "config-toml")]
    #[test]
    fn toml_syntax_errors_surface() {
        let err = DashboardConfig::from_toml_str("[store\nmax_history = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut config = DashboardConfig::default();
        config.grid.breakpoints = Breakpoints {
            sm: 900,
            md: 100,
            lg: 1024,
            xl: 1440,
        };
        config.grid.grids.set(Breakpoint::Sm, TierGrid::new(0, 80.0, 8.0));
        config.grid.variants.set(Breakpoint::Lg, LayoutVariant::new(" "));
        let errors = config.clone().validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[1].starts_with("grid.grids.sm"));
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(list)) if list.len() == 3
        ));
    }

    #[test]
    fn default_provider_switches_variant_at_md() {
        let provider = BreakpointGridProvider::default();
        let phone = provider.grid_for_width(375.0);
        assert_eq!((phone.column_count, phone.breakpoint), (4, Breakpoint::Xs));
        assert_eq!(provider.variant_for(phone.breakpoint).as_str(), "mobile");
        let laptop = provider.grid_for_width(1280.0);
        assert_eq!(laptop.column_count, 12);
        assert_eq!(provider.variant_for(laptop.breakpoint).as_str(), "desktop");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DashboardConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
