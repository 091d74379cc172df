#![forbid(unsafe_code)]

//! Widget placements and layouts.
//!
//! A [`Layout`] is the full set of [`WidgetPlacement`]s for one responsive
//! variant. Order inside a layout carries no meaning beyond being the
//! deterministic processing order of the compaction kernel.
//!
//! # Serialized form
//!
//! Layouts serialize as a bare JSON array so they round-trip with the host
//! page's persisted format:
//!
//! ```json
//! [{ "id": "goals", "x": 0, "y": 0, "w": 4, "h": 2, "isResizable": false }]
//! ```
//!
//! `isDraggable` / `isResizable` default to `true` when absent.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::GridRect;

/// Stable identifier of a widget inside a layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WidgetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::borrow::Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

fn default_true() -> bool {
    true
}

/// One widget's rectangle on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    pub id: WidgetId,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    #[serde(default = "default_true")]
    pub is_draggable: bool,
    #[serde(default = "default_true")]
    pub is_resizable: bool,
}

impl WidgetPlacement {
    /// Create a draggable, resizable placement.
    #[must_use]
    pub fn new(id: impl Into<WidgetId>, x: u16, y: u16, w: u16, h: u16) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            is_draggable: true,
            is_resizable: true,
        }
    }

    /// Builder: pin the widget in place.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.is_draggable = false;
        self.is_resizable = false;
        self
    }

    /// Builder: set draggability.
    #[must_use]
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.is_draggable = draggable;
        self
    }

    /// Builder: set resizability.
    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.is_resizable = resizable;
        self
    }

    /// Right edge (exclusive), widened to avoid overflow.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// Bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    /// The placement's rectangle.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    /// Copy with a new position.
    #[must_use]
    pub fn with_position(&self, x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// Copy with a new size.
    #[must_use]
    pub fn with_size(&self, w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            ..self.clone()
        }
    }

    /// Positive-area intersection test. Shared edges do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &WidgetPlacement) -> bool {
        self.rect().overlaps(&other.rect())
    }
}

/// Reasons a layout fails shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutValidationError {
    DuplicateId { id: WidgetId },
    EmptyId { index: usize },
    ZeroSize { id: WidgetId, w: u16, h: u16 },
    ExceedsColumns { id: WidgetId, right: u32, columns: u16 },
    Overlap { first: WidgetId, second: WidgetId },
}

impl fmt::Display for LayoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "widget id {id} appears more than once"),
            Self::EmptyId { index } => write!(f, "placement at index {index} has an empty id"),
            Self::ZeroSize { id, w, h } => {
                write!(f, "widget {id} has size {w}x{h} (both must be >= 1)")
            }
            Self::ExceedsColumns { id, right, columns } => write!(
                f,
                "widget {id} extends to column {right} on a {columns}-column grid"
            ),
            Self::Overlap { first, second } => {
                write!(f, "widgets {first} and {second} overlap")
            }
        }
    }
}

impl std::error::Error for LayoutValidationError {}

/// Ordered collection of widget placements with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    items: Vec<WidgetPlacement>,
}

impl Layout {
    /// Create an empty layout.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WidgetPlacement> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[WidgetPlacement] {
        &self.items
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<WidgetPlacement> {
        self.items
    }

    /// Look up a placement by widget id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetPlacement> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Mutable lookup by widget id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut WidgetPlacement> {
        self.items.iter_mut().find(|item| item.id.as_str() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Widget ids in layout order.
    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.items.iter().map(|item| &item.id)
    }

    /// Append a placement. Replaces an existing placement with the same id.
    pub fn upsert(&mut self, placement: WidgetPlacement) {
        match self.get_mut(placement.id.as_str()) {
            Some(existing) => *existing = placement,
            None => self.items.push(placement),
        }
    }

    /// Return a copy with one placement replaced via `f`. Unknown ids
    /// return an unchanged copy.
    #[must_use]
    pub fn with_item(&self, id: &str, f: impl FnOnce(&mut WidgetPlacement)) -> Layout {
        let mut next = self.clone();
        if let Some(item) = next.get_mut(id) {
            f(item);
        }
        next
    }

    /// Keep only placements matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&WidgetPlacement) -> bool) {
        self.items.retain(f);
    }

    /// Total occupied height in rows (maximum bottom edge).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.items.iter().map(WidgetPlacement::bottom).max().unwrap_or(0)
    }

    /// Occupied rectangle per widget id, independent of order.
    #[must_use]
    pub fn occupied_cells(&self) -> BTreeMap<WidgetId, GridRect> {
        self.items
            .iter()
            .map(|item| (item.id.clone(), item.rect()))
            .collect()
    }

    /// Shape validation: non-empty unique ids and non-zero sizes.
    pub fn validate(&self) -> Result<(), LayoutValidationError> {
        let mut seen = BTreeSet::new();
        for (index, item) in self.items.iter().enumerate() {
            if item.id.as_str().is_empty() {
                return Err(LayoutValidationError::EmptyId { index });
            }
            if !seen.insert(item.id.as_str()) {
                return Err(LayoutValidationError::DuplicateId {
                    id: item.id.clone(),
                });
            }
            if item.w == 0 || item.h == 0 {
                return Err(LayoutValidationError::ZeroSize {
                    id: item.id.clone(),
                    w: item.w,
                    h: item.h,
                });
            }
        }
        Ok(())
    }

    /// Full committed-state validation: shape, column bound, and no overlap.
    pub fn validate_for_columns(&self, columns: u16) -> Result<(), LayoutValidationError> {
        self.validate()?;
        for item in &self.items {
            if item.right() > u32::from(columns) {
                return Err(LayoutValidationError::ExceedsColumns {
                    id: item.id.clone(),
                    right: item.right(),
                    columns,
                });
            }
        }
        for (i, a) in self.items.iter().enumerate() {
            if let Some(b) = self.items[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(LayoutValidationError::Overlap {
                    first: a.id.clone(),
                    second: b.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<WidgetPlacement>> for Layout {
    fn from(items: Vec<WidgetPlacement>) -> Self {
        Self { items }
    }
}

impl FromIterator<WidgetPlacement> for Layout {
    fn from_iter<I: IntoIterator<Item = WidgetPlacement>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Layout {
    type Item = WidgetPlacement;
    type IntoIter = std::vec::IntoIter<WidgetPlacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a WidgetPlacement;
    type IntoIter = std::slice::Iter<'a, WidgetPlacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Default footprint of a catalog widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetSize {
    pub w: u16,
    pub h: u16,
}

impl WidgetSize {
    #[must_use]
    pub const fn new(w: u16, h: u16) -> Self {
        Self { w, h }
    }
}

/// The set of widgets a host can render.
///
/// Layouts only carry ids; the catalog decides which ids are live and how
/// large a newly added widget starts.
pub trait WidgetCatalog {
    /// Whether `id` names a widget the host can render.
    fn contains(&self, id: &WidgetId) -> bool;

    /// Size used when the widget is first placed.
    fn default_size(&self, id: &WidgetId) -> Option<WidgetSize>;
}
