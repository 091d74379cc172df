#![forbid(unsafe_code)]

//! Breakpoint-aware values with inheritance from smaller tiers.
//!
//! A dashboard usually wants a handful of per-tier settings (column count,
//! row height, which layout variant to edit) where most tiers simply reuse
//! the value of the next smaller one. [`Responsive<T>`] stores a mandatory
//! base value for `Xs` plus optional overrides for the larger tiers.
//!
//! ```
//! use dashgrid_layout::{Breakpoint, Responsive};
//!
//! let columns = Responsive::new(4u16)
//!     .at(Breakpoint::Md, 8)
//!     .at(Breakpoint::Lg, 12);
//!
//! assert_eq!(*columns.resolve(Breakpoint::Sm), 4);
//! assert_eq!(*columns.resolve(Breakpoint::Xl), 12);
//! ```
//!
//! # Invariants
//!
//! 1. `Xs` always has a value (the base).
//! 2. A tier without an override resolves to the nearest smaller tier that
//!    has one, falling back to the base.
//!
//! # Serialized form
//!
//! A map keyed by tier label. `xs` is required, every other key optional:
//! `{ "xs": 4, "md": 8, "lg": 12 }`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Breakpoint;

/// A value that varies by [`Breakpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Responsive<T> {
    base: T,
    /// Overrides for `Sm`, `Md`, `Lg`, `Xl` in that order.
    overrides: [Option<T>; 4],
}

impl<T> Responsive<T> {
    /// Create a responsive value whose base (`Xs`) is `base`.
    #[must_use]
    pub fn new(base: T) -> Self {
        Self {
            base,
            overrides: [None, None, None, None],
        }
    }

    /// Set the value for a breakpoint (builder form).
    #[must_use]
    pub fn at(mut self, bp: Breakpoint, value: T) -> Self {
        self.set(bp, value);
        self
    }

    /// Set the value for a breakpoint. Setting `Xs` replaces the base.
    pub fn set(&mut self, bp: Breakpoint, value: T) {
        match bp.index().checked_sub(1) {
            Some(slot) => self.overrides[slot] = Some(value),
            None => self.base = value,
        }
    }

    /// Drop the override for a breakpoint. Clearing `Xs` is a no-op.
    pub fn clear(&mut self, bp: Breakpoint) {
        if let Some(slot) = bp.index().checked_sub(1) {
            self.overrides[slot] = None;
        }
    }

    /// Resolve the effective value for a breakpoint.
    #[must_use]
    pub fn resolve(&self, bp: Breakpoint) -> &T {
        self.overrides[..bp.index()]
            .iter()
            .rev()
            .find_map(Option::as_ref)
            .unwrap_or(&self.base)
    }

    /// Whether a tier carries its own value rather than inheriting one.
    #[must_use]
    pub fn has_explicit(&self, bp: Breakpoint) -> bool {
        match bp.index().checked_sub(1) {
            Some(slot) => self.overrides[slot].is_some(),
            None => true,
        }
    }

    /// Tiers with their own value, smallest first.
    pub fn explicit_values(&self) -> impl Iterator<Item = (Breakpoint, &T)> {
        std::iter::once((Breakpoint::Xs, &self.base)).chain(
            Breakpoint::ALL[1..]
                .iter()
                .zip(self.overrides.iter())
                .filter_map(|(&bp, value)| value.as_ref().map(|v| (bp, v))),
        )
    }

    /// Map every stored value to a new type.
    #[must_use]
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Responsive<U> {
        Responsive {
            base: f(&self.base),
            overrides: [
                self.overrides[0].as_ref().map(&f),
                self.overrides[1].as_ref().map(&f),
                self.overrides[2].as_ref().map(&f),
                self.overrides[3].as_ref().map(&f),
            ],
        }
    }
}

impl<T: Default> Default for Responsive<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Display> fmt::Display for Responsive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Responsive(")?;
        for (i, (bp, value)) in self.explicit_values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bp}={value}")?;
        }
        write!(f, ")")
    }
}

impl<T: Serialize> Serialize for Responsive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (bp, value) in self.explicit_values() {
            map.serialize_entry(bp.label(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Responsive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = BTreeMap::<String, T>::deserialize(deserializer)?;
        let base = map
            .remove(Breakpoint::Xs.label())
            .ok_or_else(|| D::Error::missing_field("xs"))?;
        let mut value = Responsive::new(base);
        for (label, v) in map {
            let bp = Breakpoint::from_label(&label)
                .ok_or_else(|| D::Error::unknown_field(&label, &["xs", "sm", "md", "lg", "xl"]))?;
            value.set(bp, v);
        }
        Ok(value)
    }
}
