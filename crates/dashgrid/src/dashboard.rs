#![forbid(unsafe_code)]

//! End-to-end wiring of one customizable dashboard.
//!
//! ```text
//! viewport width --GridConfigProvider--> GridConfig + variant
//! pointer sample --WidgetGestureAdapter--> GestureDispatch
//!     Live      --> GridContainer preview
//!     Committed --> LayoutStore::set_variant (one undo step)
//! render()      --> GridFrame for the current variant
//! ```

use std::collections::BTreeMap;

use dashgrid_layout::{
    Breakpoint, GestureContext, GestureDispatch, GestureKind, GridConfig, GridConfigProvider,
    IgnoredReason, Layout, LayoutValidationError, PixelPoint, PixelRect, Responsive,
    WidgetCatalog, WidgetId, clamp_to_columns, sanitize_layout,
};
use dashgrid_runtime::{
    BreakpointGridProvider, DashboardConfig, HistoryPolicy, HydrationSource, LayoutBundle,
    LayoutStore, LayoutVariant, PersistenceSink,
};
use dashgrid_web::{GridContainer, GridFrame, HostHandle, PointerSample, WidgetGestureAdapter};

const TARGET: &str = "dashgrid.dashboard";

static EMPTY: Layout = Layout::new();

/// A dashboard: store, grid, container and one gesture adapter per widget.
pub struct Dashboard<P: GridConfigProvider> {
    provider: P,
    variants: Responsive<LayoutVariant>,
    store: LayoutStore,
    container: GridContainer,
    catalog: Box<dyn WidgetCatalog>,
    host: HostHandle,
    adapters: BTreeMap<WidgetId, WidgetGestureAdapter>,
    customize_mode: bool,
    viewport_width: f64,
}

impl Dashboard<BreakpointGridProvider> {
    /// Build from a configuration document.
    ///
    /// The store is created from `defaults` and hydrated from `source`.
    pub fn from_config(
        config: DashboardConfig,
        defaults: LayoutBundle,
        sink: impl PersistenceSink + 'static,
        source: &dyn HydrationSource,
        catalog: impl WidgetCatalog + 'static,
        host: HostHandle,
        viewport_width: f64,
    ) -> crate::Result<Self> {
        let config = config.validated()?;
        let mut store = LayoutStore::new(defaults, sink, config.store.clone());
        store.hydrate_with_catalog(source, &catalog);
        Ok(Self::new(
            config.grid_provider(),
            config.grid.variants.clone(),
            store,
            catalog,
            host,
            viewport_width,
        ))
    }
}

impl<P: GridConfigProvider> Dashboard<P> {
    /// Assemble a dashboard from its parts. Starts outside customize mode.
    pub fn new(
        provider: P,
        variants: Responsive<LayoutVariant>,
        store: LayoutStore,
        catalog: impl WidgetCatalog + 'static,
        host: HostHandle,
        viewport_width: f64,
    ) -> Self {
        let grid = provider.grid_for_width(viewport_width);
        let mut dashboard = Self {
            provider,
            variants,
            store,
            container: GridContainer::new(grid),
            catalog: Box::new(catalog),
            host,
            adapters: BTreeMap::new(),
            customize_mode: false,
            viewport_width,
        };
        dashboard.fit_to_columns();
        dashboard
    }

    // ====================================================================
    // Queries
    // ====================================================================

    #[must_use]
    pub fn grid(&self) -> &GridConfig {
        self.container.grid()
    }

    #[must_use]
    pub fn breakpoint(&self) -> Breakpoint {
        self.container.grid().breakpoint
    }

    #[must_use]
    pub const fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Variant edited at the current breakpoint.
    #[must_use]
    pub fn current_variant(&self) -> &LayoutVariant {
        self.variants.resolve(self.breakpoint())
    }

    /// Committed layout of the current variant.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        self.store.variant(self.current_variant()).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub const fn customize_mode(&self) -> bool {
        self.customize_mode
    }

    #[must_use]
    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Visual translation of a widget being dragged.
    #[must_use]
    pub fn visual_offset(&self, widget: &str) -> PixelPoint {
        self.adapters
            .get(widget)
            .map_or(PixelPoint::ORIGIN, WidgetGestureAdapter::visual_offset)
    }

    /// Whether any widget has an active gesture.
    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.adapters.values().any(WidgetGestureAdapter::is_active)
    }

    /// Frame for the current variant (or the active preview).
    #[must_use]
    pub fn render(&self) -> GridFrame {
        let committed = self.store.variant(self.current_variant()).unwrap_or(&EMPTY);
        self.container.render(committed, self.catalog.as_ref())
    }

    // ====================================================================
    // Host inputs
    // ====================================================================

    /// Re-evaluate the grid for a new viewport width.
    pub fn set_viewport_width(&mut self, width_px: f64) {
        self.viewport_width = width_px;
        let grid = self.provider.grid_for_width(width_px);
        if grid == *self.container.grid() {
            return;
        }
        tracing::debug!(
            target: TARGET,
            width = width_px,
            breakpoint = %grid.breakpoint,
            columns = grid.column_count,
            "grid changed"
        );
        self.cancel_gestures();
        self.container.set_grid(grid);
        self.fit_to_columns();
        self.prune_adapters();
    }

    /// Measured container bounding box, `None` while unmounted.
    pub fn set_container_rect(&mut self, rect: Option<PixelRect>) {
        self.container.set_container_rect(rect);
    }

    /// Leaving customize mode cancels every active gesture.
    pub fn set_customize_mode(&mut self, enabled: bool) {
        if self.customize_mode == enabled {
            return;
        }
        self.customize_mode = enabled;
        if !enabled {
            self.cancel_gestures();
        }
    }

    /// Pointer-down on a widget header or drag handle. `element` is the
    /// widget's measured bounding box.
    pub fn pointer_down_header(
        &mut self,
        widget: &str,
        sample: PointerSample,
        element: Option<PixelRect>,
    ) -> GestureDispatch {
        self.pointer_down(GestureKind::Drag, widget, sample, element)
    }

    /// Pointer-down on the bottom-edge resize affordance.
    pub fn pointer_down_resize_vertical(
        &mut self,
        widget: &str,
        sample: PointerSample,
    ) -> GestureDispatch {
        self.pointer_down(GestureKind::ResizeVertical, widget, sample, None)
    }

    /// Pointer-down on the right-edge resize affordance.
    pub fn pointer_down_resize_horizontal(
        &mut self,
        widget: &str,
        sample: PointerSample,
    ) -> GestureDispatch {
        self.pointer_down(GestureKind::ResizeHorizontal, widget, sample, None)
    }

    pub fn pointer_down(
        &mut self,
        kind: GestureKind,
        widget: &str,
        sample: PointerSample,
        element: Option<PixelRect>,
    ) -> GestureDispatch {
        if !self.adapters.contains_key(widget) && !self.layout().contains(widget) {
            return GestureDispatch::ignored(&WidgetId::new(widget), IgnoredReason::UnknownWidget);
        }
        let host = &self.host;
        let adapter = self
            .adapters
            .entry(WidgetId::new(widget))
            .or_insert_with(|| WidgetGestureAdapter::new(widget, host.clone()));
        let ctx =
            gesture_context(&self.store, &self.variants, &self.container, self.customize_mode)
                .with_element(element);
        let dispatch = adapter.pointer_down(kind, &ctx, sample);
        self.forward(dispatch)
    }

    pub fn pointer_move(&mut self, widget: &str, sample: PointerSample) -> GestureDispatch {
        let Some(adapter) = self.adapters.get_mut(widget) else {
            return GestureDispatch::ignored(
                &WidgetId::new(widget),
                IgnoredReason::NoActiveSession,
            );
        };
        let ctx =
            gesture_context(&self.store, &self.variants, &self.container, self.customize_mode);
        let dispatch = adapter.pointer_move(&ctx, sample);
        self.forward(dispatch)
    }

    pub fn pointer_up(&mut self, widget: &str, sample: PointerSample) -> GestureDispatch {
        let Some(adapter) = self.adapters.get_mut(widget) else {
            return GestureDispatch::ignored(
                &WidgetId::new(widget),
                IgnoredReason::NoActiveSession,
            );
        };
        let ctx =
            gesture_context(&self.store, &self.variants, &self.container, self.customize_mode);
        let dispatch = adapter.pointer_up(&ctx, sample);
        self.forward(dispatch)
    }

    /// Host pointer-cancel, blur or lost capture.
    pub fn pointer_cancel(&mut self, widget: &str, pointer_id: u32) -> GestureDispatch {
        let Some(adapter) = self.adapters.get_mut(widget) else {
            return GestureDispatch::ignored(
                &WidgetId::new(widget),
                IgnoredReason::NoActiveSession,
            );
        };
        let dispatch = adapter.pointer_cancel(pointer_id);
        if !dispatch.is_ignored() {
            self.container.clear_preview();
        }
        dispatch
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Step back one edit. The restored layout is fitted to the current
    /// grid, which may be narrower than the one it was made on.
    pub fn undo(&mut self) -> bool {
        self.cancel_gestures();
        let changed = self.store.undo();
        if changed {
            self.fit_to_columns();
            self.prune_adapters();
        }
        changed
    }

    /// Step forward one edit, fitted like [`undo`](Self::undo).
    pub fn redo(&mut self) -> bool {
        self.cancel_gestures();
        let changed = self.store.redo();
        if changed {
            self.fit_to_columns();
            self.prune_adapters();
        }
        changed
    }

    pub fn reset_to_default(&mut self) {
        self.cancel_gestures();
        self.store.reset_to_default();
        self.fit_to_columns();
        self.prune_adapters();
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    /// Run a due debounced write at `now` (store clock time).
    pub fn tick_at(&mut self, now: std::time::Duration) -> usize {
        self.store.tick_at(now)
    }

    /// Run a due debounced write using the store's clock.
    pub fn tick(&mut self) -> usize {
        self.store.tick()
    }

    pub fn flush(&mut self) -> usize {
        self.store.flush()
    }

    // ====================================================================
    // Internals
    // ====================================================================

    /// Route a gesture update: previews stay in the container, commits go to
    /// the store as one undo step.
    fn forward(&mut self, mut dispatch: GestureDispatch) -> GestureDispatch {
        let Some(update) = dispatch.update.take() else {
            if !self.is_gesture_active() {
                self.container.clear_preview();
            }
            return dispatch;
        };
        if let Some(committed) = self.container.route(update.clone()) {
            let variant = self.current_variant().clone();
            self.store
                .set_variant(variant, committed.into_layout(), HistoryPolicy::Record);
        }
        dispatch.update = Some(update);
        dispatch
    }

    fn cancel_gestures(&mut self) {
        for adapter in self.adapters.values_mut() {
            adapter.teardown();
        }
        self.container.clear_preview();
    }

    /// Drop idle adapters whose widget is no longer on screen.
    fn prune_adapters(&mut self) {
        let layout = self
            .store
            .variant(self.variants.resolve(self.container.grid().breakpoint))
            .unwrap_or(&EMPTY);
        self.adapters
            .retain(|id, adapter| adapter.is_active() || layout.contains(id.as_str()));
    }

    /// Clamp the current variant to the grid's column count without
    /// recording history.
    fn fit_to_columns(&mut self) {
        let columns = self.container.grid().column_count;
        let variant = self.current_variant().clone();
        let Some(layout) = self.store.variant(&variant) else {
            return;
        };
        let exceeds = matches!(
            layout.validate_for_columns(columns),
            Err(LayoutValidationError::ExceedsColumns { .. })
        );
        if !exceeds {
            return;
        }
        let fitted = sanitize_layout(&clamp_to_columns(layout, columns));
        tracing::debug!(
            target: TARGET,
            variant = %variant,
            columns,
            "clamped layout to grid columns"
        );
        self.store.set_variant(variant, fitted, HistoryPolicy::Skip);
    }
}

/// Context for the layout on screen: the container's preview if any, else
/// the committed layout of the variant selected by the current grid.
fn gesture_context<'a>(
    store: &'a LayoutStore,
    variants: &Responsive<LayoutVariant>,
    container: &'a GridContainer,
    customize_mode: bool,
) -> GestureContext<'a> {
    let committed = store
        .variant(variants.resolve(container.grid().breakpoint))
        .unwrap_or(&EMPTY);
    GestureContext::new(
        container.displayed(committed),
        container.grid(),
        container.container_rect(),
    )
    .with_customize_mode(customize_mode)
}

impl<P: GridConfigProvider> std::fmt::Debug for Dashboard<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("breakpoint", &self.breakpoint())
            .field("variant", self.current_variant())
            .field("customize_mode", &self.customize_mode)
            .field("store", &self.store)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
