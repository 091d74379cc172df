#![forbid(unsafe_code)]

//! dashgrid public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates, offers a lightweight
//! prelude, and wires them together in [`Dashboard`].

use std::fmt;

pub mod dashboard;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use dashboard::Dashboard;

// --- Layout re-exports -----------------------------------------------------

pub use dashgrid_layout::{
    Breakpoint, Breakpoints, CommittedLayout, CursorAffordance, GestureDispatch, GestureKind,
    GestureOutcome, GridConfig, GridConfigError, GridConfigProvider, GridMetrics, GridRect,
    HostCommand, IgnoredReason, Layout, LayoutUpdate, LayoutValidationError, PixelPoint,
    PixelRect, Responsive, WidgetCatalog, WidgetId, WidgetPlacement, WidgetSize, is_overlapping,
    move_item, sanitize_layout,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "file-storage")]
pub use dashgrid_runtime::FileStorage;
pub use dashgrid_runtime::{
    BreakpointGridProvider, ConfigError, DashboardConfig, DeterministicClock, GridPolicy,
    HistoryPolicy, HydrationSource, LayoutBundle, LayoutStore, LayoutVariant, MemoryStorage,
    MonotonicClock, PersistenceSink, StorageError, StoreConfig, SystemClock,
};

// --- Host re-exports -------------------------------------------------------

pub use dashgrid_web::{
    GridFrame, HostHandle, ListenerHost, PointerSample, RecordingHost, StaticCatalog, TouchPoint,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for dashgrid hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// Persistence backend failure.
    Storage(StorageError),
    /// Grid configuration out of range.
    Grid(GridConfigError),
    /// A layout broke a structural invariant.
    Layout(LayoutValidationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Grid(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Grid(err) => Some(err),
            Self::Layout(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<GridConfigError> for Error {
    fn from(err: GridConfigError) -> Self {
        Self::Grid(err)
    }
}

impl From<LayoutValidationError> for Error {
    fn from(err: LayoutValidationError) -> Self {
        Self::Layout(err)
    }
}

/// Standard result type for dashgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Breakpoint, Dashboard, DashboardConfig, Error, GestureKind, GridConfig, GridFrame,
        HistoryPolicy, Layout, LayoutVariant, PixelPoint, PixelRect, PointerSample, Result,
        StaticCatalog, WidgetPlacement, WidgetSize,
    };

    pub use crate::{layout, runtime, web};
}

pub use dashgrid_layout as layout;
pub use dashgrid_runtime as runtime;
pub use dashgrid_web as web;
