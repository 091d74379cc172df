#![forbid(unsafe_code)]

//! Layout state ownership for dashgrid.
//!
//! # Role in dashgrid
//! `dashgrid-runtime` is the single source of truth for durable layouts. It
//! wraps every tracked [`LayoutVariant`] in one undo/redo history, debounces
//! writes to an injected [`PersistenceSink`], and hydrates from a
//! [`HydrationSource`] at startup.
//!
//! # How it fits in the system
//! Gesture commits produced by `dashgrid-layout` arrive through the host
//! adapter in `dashgrid-web`; the `dashgrid` facade forwards them to
//! [`LayoutStore::set_variant`]. Time is host-driven through
//! [`MonotonicClock`], so the store is deterministic under test.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod history;
pub mod persistence;
pub mod store;

use std::collections::BTreeMap;
use std::fmt;

use dashgrid_layout::Layout;
use serde::{Deserialize, Serialize};

pub use clock::{DeterministicClock, MonotonicClock, SystemClock};
pub use config::{
    BreakpointGridProvider, ConfigError, DashboardConfig, GridPolicy, StoreConfig, TierGrid,
};
pub use debounce::Debouncer;
pub use history::HistoryState;
#[cfg(feature = "file-storage")]
pub use persistence::FileStorage;
pub use persistence::{
    HydrationSource, MemoryStorage, PersistenceSink, StorageError, StorageResult,
};
pub use store::{HistoryPolicy, LayoutStore};

/// Name of an independently tracked layout, e.g. `"desktop"` or `"mobile"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutVariant(String);

impl LayoutVariant {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayoutVariant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for LayoutVariant {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// All tracked variants. One history entry covers the whole bundle.
pub type LayoutBundle = BTreeMap<LayoutVariant, Layout>;
