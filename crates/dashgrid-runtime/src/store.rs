#![forbid(unsafe_code)]

//! History-capable layout store.
//!
//! [`LayoutStore`] owns the durable [`LayoutBundle`]: one
//! [`HistoryState`] over every tracked variant, so a single user-visible
//! edit is exactly one undo step no matter how many variants it touches.
//!
//! # Persistence
//!
//! Every change (edit, undo, redo, reset) restarts a [`Debouncer`]. When the
//! quiet window elapses, [`tick_at`](LayoutStore::tick_at) writes the
//! variants whose layout differs from what was last written. A drag therefore
//! costs one write, not one per pointer move. [`flush`](LayoutStore::flush)
//! writes immediately; dropping the store flushes pending writes.
//!
//! Save failures are logged and dropped: the in-memory state stays
//! authoritative and the next change retries.

use std::time::Duration;

use dashgrid_layout::{Layout, WidgetCatalog, sanitize_layout};

use crate::clock::{MonotonicClock, SystemClock};
use crate::config::StoreConfig;
use crate::debounce::Debouncer;
use crate::history::HistoryState;
use crate::persistence::{HydrationSource, PersistenceSink};
use crate::{LayoutBundle, LayoutVariant};

const TARGET: &str = "dashgrid.store";
const PERSIST_TARGET: &str = "dashgrid.persist";

/// Whether a change becomes an undo step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HistoryPolicy {
    /// Push the previous value onto the undo stack.
    #[default]
    Record,
    /// Replace the present only (hydration, programmatic fixes).
    Skip,
}

pub struct LayoutStore {
    history: HistoryState<LayoutBundle>,
    defaults: LayoutBundle,
    persisted: LayoutBundle,
    sink: Box<dyn PersistenceSink>,
    clock: Box<dyn MonotonicClock>,
    debouncer: Debouncer,
    config: StoreConfig,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("variants", &self.history.present().len())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("sink", &self.sink.name())
            .field("pending_write", &self.debouncer.is_pending())
            .field("config", &self.config)
            .finish()
    }
}

impl LayoutStore {
    /// Create a store whose present value is `defaults`.
    ///
    /// Nothing is written until the first change.
    #[must_use]
    pub fn new(
        defaults: LayoutBundle,
        sink: impl PersistenceSink + 'static,
        config: StoreConfig,
    ) -> Self {
        Self {
            history: HistoryState::new(defaults.clone(), config.max_history),
            persisted: defaults.clone(),
            defaults,
            sink: Box::new(sink),
            clock: Box::new(SystemClock::new()),
            debouncer: Debouncer::new(config.debounce),
            config,
        }
    }

    /// Replace the time source (builder form).
    #[must_use]
    pub fn with_clock(mut self, clock: impl MonotonicClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Load every default variant from `source` without creating undo steps.
    ///
    /// Missing or invalid stored layouts fall back to the default. Valid ones
    /// are compacted before use.
    pub fn hydrate(&mut self, source: &dyn HydrationSource) {
        self.hydrate_inner(source, None);
    }

    /// Like [`hydrate`](Self::hydrate), and when
    /// [`StoreConfig::prune_unknown`] is set, drops placements the catalog
    /// does not know.
    pub fn hydrate_with_catalog(
        &mut self,
        source: &dyn HydrationSource,
        catalog: &dyn WidgetCatalog,
    ) {
        self.hydrate_inner(source, Some(catalog));
    }

    fn hydrate_inner(&mut self, source: &dyn HydrationSource, catalog: Option<&dyn WidgetCatalog>) {
        let mut bundle = LayoutBundle::new();
        for (variant, default) in &self.defaults {
            let layout = match source.load(variant) {
                Ok(Some(stored)) => match stored.validate() {
                    Ok(()) => sanitize_layout(&stored),
                    Err(e) => {
                        tracing::warn!(
                            target: TARGET,
                            variant = %variant,
                            error = %e,
                            "stored layout failed validation, using default"
                        );
                        default.clone()
                    }
                },
                Ok(None) => default.clone(),
                Err(e) => {
                    tracing::warn!(
                        target: TARGET,
                        variant = %variant,
                        error = %e,
                        "failed to load stored layout, using default"
                    );
                    default.clone()
                }
            };
            bundle.insert(variant.clone(), layout);
        }

        if self.config.prune_unknown {
            if let Some(catalog) = catalog {
                for (variant, layout) in &mut bundle {
                    let before = layout.len();
                    layout.retain(|item| catalog.contains(&item.id));
                    if layout.len() != before {
                        tracing::debug!(
                            target: TARGET,
                            variant = %variant,
                            pruned = before - layout.len(),
                            "pruned unknown widgets"
                        );
                    }
                }
            }
        }

        tracing::debug!(target: TARGET, variants = bundle.len(), "hydrated layouts");
        self.persisted = bundle.clone();
        self.history.replace(bundle);
    }

    // ====================================================================
    // Queries
    // ====================================================================

    #[must_use]
    pub fn present(&self) -> &LayoutBundle {
        self.history.present()
    }

    /// Present layout of one variant.
    #[must_use]
    pub fn variant(&self, variant: &LayoutVariant) -> Option<&Layout> {
        self.history.present().get(variant)
    }

    #[must_use]
    pub fn defaults(&self) -> &LayoutBundle {
        &self.defaults
    }

    #[must_use]
    pub fn history(&self) -> &HistoryState<LayoutBundle> {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a debounced write is waiting.
    #[must_use]
    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Time until the pending write fires, `None` when idle.
    #[must_use]
    pub fn time_until_write(&self) -> Option<Duration> {
        self.debouncer.time_until_due(self.clock.now_mono())
    }

    // ====================================================================
    // Mutations
    // ====================================================================

    /// Replace the whole bundle.
    ///
    /// A bundle equal to the present is dropped: no undo step, no write.
    /// A gesture that puts a widget back where it started therefore leaves
    /// history unchanged.
    pub fn set(&mut self, bundle: LayoutBundle, policy: HistoryPolicy) {
        if &bundle == self.history.present() {
            return;
        }
        match policy {
            HistoryPolicy::Record => self.history.record(bundle),
            HistoryPolicy::Skip => self.history.replace(bundle),
        }
        tracing::debug!(
            target: TARGET,
            policy = ?policy,
            undo_depth = self.history.undo_depth(),
            "layout updated"
        );
        self.schedule_write();
    }

    /// Derive the next bundle from the present one.
    pub fn update(
        &mut self,
        f: impl FnOnce(&LayoutBundle) -> LayoutBundle,
        policy: HistoryPolicy,
    ) {
        let next = f(self.history.present());
        self.set(next, policy);
    }

    /// Replace one variant's layout.
    pub fn set_variant(&mut self, variant: LayoutVariant, layout: Layout, policy: HistoryPolicy) {
        self.update(
            |present| {
                let mut next = present.clone();
                next.insert(variant, layout);
                next
            },
            policy,
        );
    }

    /// Step back one edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            tracing::debug!(target: TARGET, undo_depth = self.history.undo_depth(), "undo");
            self.schedule_write();
        }
        changed
    }

    /// Step forward one edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            tracing::debug!(target: TARGET, redo_depth = self.history.redo_depth(), "redo");
            self.schedule_write();
        }
        changed
    }

    /// Return to the default layouts and forget all history.
    pub fn reset_to_default(&mut self) {
        self.history.reset(self.defaults.clone());
        tracing::debug!(target: TARGET, "reset to default layouts");
        self.schedule_write();
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Run a due debounced write using the store's clock.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now_mono();
        self.tick_at(now)
    }

    /// Run a due debounced write at `now`. Returns the number of variants
    /// written.
    pub fn tick_at(&mut self, now: Duration) -> usize {
        if self.debouncer.poll_at(now) {
            self.write_changed()
        } else {
            0
        }
    }

    /// Write changed variants immediately and cancel the pending timer.
    pub fn flush(&mut self) -> usize {
        self.debouncer.cancel();
        self.write_changed()
    }

    fn schedule_write(&mut self) {
        let now = self.clock.now_mono();
        self.debouncer.schedule_at(now);
    }

    fn write_changed(&mut self) -> usize {
        let mut written = 0;
        for (variant, layout) in self.history.present() {
            if self.persisted.get(variant) == Some(layout) {
                continue;
            }
            match self.sink.save(variant, layout) {
                Ok(()) => {
                    self.persisted.insert(variant.clone(), layout.clone());
                    written += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        target: PERSIST_TARGET,
                        sink = self.sink.name(),
                        variant = %variant,
                        error = %e,
                        "failed to persist layout"
                    );
                }
            }
        }
        if written > 0 {
            tracing::debug!(
                target: PERSIST_TARGET,
                sink = self.sink.name(),
                written,
                "persisted layouts"
            );
        }
        written
    }
}

impl Drop for LayoutStore {
    fn drop(&mut self) {
        if self.debouncer.is_pending() {
            self.flush();
        }
    }
}
