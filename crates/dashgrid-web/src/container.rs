#![forbid(unsafe_code)]

//! Grid composition: layout in, render frame out.
//!
//! [`GridContainer::render`] turns the current layout into a [`GridFrame`]:
//! the CSS grid template plus, for every renderable placement, its grid area
//! and a freshly built [`WidgetContext`]. Contexts are rebuilt on every render
//! so a gesture never runs against a layout older than the last frame.
//!
//! The container also routes gesture updates: `Live` layouts become the
//! preview shown until release, `Committed` layouts clear the preview and are
//! handed back for forwarding to the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashgrid_layout::{
    CommittedLayout, GestureContext, GridConfig, Layout, LayoutUpdate, PixelRect, WidgetCatalog,
    WidgetId, WidgetPlacement, WidgetSize, sanitize_layout,
};

const TARGET: &str = "dashgrid.container";

/// CSS grid template of the container element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridTemplate {
    pub column_count: u16,
    pub row_height_px: f64,
    pub gap_px: f64,
}

impl GridTemplate {
    #[must_use]
    pub const fn from_grid(grid: &GridConfig) -> Self {
        Self {
            column_count: grid.column_count,
            row_height_px: grid.row_height_px,
            gap_px: grid.gap_px,
        }
    }

    /// Value for `grid-template-columns`.
    #[must_use]
    pub fn css_columns(&self) -> String {
        format!("repeat({}, minmax(0, 1fr))", self.column_count)
    }

    /// Value for `grid-auto-rows`.
    #[must_use]
    pub fn css_auto_rows(&self) -> String {
        format!("{}px", self.row_height_px)
    }

    /// Value for `gap`.
    #[must_use]
    pub fn css_gap(&self) -> String {
        format!("{}px", self.gap_px)
    }
}

/// 1-based CSS grid line placement of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridArea {
    pub column_start: u32,
    pub column_span: u16,
    pub row_start: u32,
    pub row_span: u16,
}

impl GridArea {
    #[must_use]
    pub fn from_placement(placement: &WidgetPlacement) -> Self {
        Self {
            column_start: u32::from(placement.x) + 1,
            column_span: placement.w,
            row_start: u32::from(placement.y) + 1,
            row_span: placement.h,
        }
    }

    /// Value for `grid-column`, e.g. `1 / span 4`.
    #[must_use]
    pub fn css_column(&self) -> String {
        format!("{} / span {}", self.column_start, self.column_span)
    }

    /// Value for `grid-row`.
    #[must_use]
    pub fn css_row(&self) -> String {
        format!("{} / span {}", self.row_start, self.row_span)
    }
}

/// Everything a widget's gesture handling needs from its container.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetContext {
    /// Full layout of the frame. A single-widget commit still produces a
    /// full layout.
    pub layout: Arc<Layout>,
    pub grid: GridConfig,
    /// Container bounding box in viewport pixels.
    pub container: Option<PixelRect>,
}

impl WidgetContext {
    /// Borrow as a gesture context.
    #[must_use]
    pub fn gesture_context(&self, customize_mode: bool) -> GestureContext<'_> {
        GestureContext::new(&self.layout, &self.grid, self.container)
            .with_customize_mode(customize_mode)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderedWidget {
    pub id: WidgetId,
    pub placement: WidgetPlacement,
    pub area: GridArea,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub context: WidgetContext,
}

/// One render of the grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridFrame {
    pub template: GridTemplate,
    pub widgets: Vec<RenderedWidget>,
    /// Whether the frame shows an uncommitted preview.
    pub is_preview: bool,
}

impl GridFrame {
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&RenderedWidget> {
        self.widgets.iter().find(|w| w.id.as_str() == id)
    }

    /// Rows spanned by the rendered widgets.
    #[must_use]
    pub fn height_rows(&self) -> u32 {
        self.widgets
            .iter()
            .map(|w| w.placement.bottom())
            .max()
            .unwrap_or(0)
    }
}

/// Grid composition state for one dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct GridContainer {
    grid: GridConfig,
    container: Option<PixelRect>,
    preview: Option<Layout>,
}

impl GridContainer {
    #[must_use]
    pub const fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            container: None,
            preview: None,
        }
    }

    #[must_use]
    pub const fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Switch grid configuration. Any preview belongs to the old grid and is
    /// dropped.
    pub fn set_grid(&mut self, grid: GridConfig) {
        if grid != self.grid {
            self.grid = grid;
            self.preview = None;
        }
    }

    /// Measured container bounding box, `None` while unmounted.
    pub fn set_container_rect(&mut self, rect: Option<PixelRect>) {
        self.container = rect;
    }

    #[must_use]
    pub const fn container_rect(&self) -> Option<PixelRect> {
        self.container
    }

    #[must_use]
    pub fn preview(&self) -> Option<&Layout> {
        self.preview.as_ref()
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    /// Layout currently on screen: the preview if any, else `committed`.
    #[must_use]
    pub fn displayed<'a>(&'a self, committed: &'a Layout) -> &'a Layout {
        self.preview.as_ref().unwrap_or(committed)
    }

    /// Absorb a gesture update. Returns the layout to forward to the store.
    pub fn route(&mut self, update: LayoutUpdate) -> Option<CommittedLayout> {
        match update {
            LayoutUpdate::Live(layout) => {
                self.preview = Some(layout);
                None
            }
            LayoutUpdate::Committed(committed) => {
                self.preview = None;
                Some(committed)
            }
        }
    }

    /// Build the frame for `committed` (or the active preview).
    ///
    /// Placements the catalog does not know, and empty ones, are skipped but
    /// stay in the layout.
    #[must_use]
    pub fn render(&self, committed: &Layout, catalog: &dyn WidgetCatalog) -> GridFrame {
        let displayed = self.displayed(committed);
        let shared = Arc::new(displayed.clone());
        let mut widgets = Vec::with_capacity(displayed.len());
        for placement in displayed {
            if !catalog.contains(&placement.id) {
                tracing::debug!(target: TARGET, widget = %placement.id, "skipping unknown widget");
                continue;
            }
            if placement.w == 0 || placement.h == 0 {
                tracing::debug!(target: TARGET, widget = %placement.id, "skipping empty placement");
                continue;
            }
            widgets.push(RenderedWidget {
                id: placement.id.clone(),
                placement: placement.clone(),
                area: GridArea::from_placement(placement),
                context: WidgetContext {
                    layout: Arc::clone(&shared),
                    grid: self.grid,
                    container: self.container,
                },
            });
        }
        GridFrame {
            template: GridTemplate::from_grid(&self.grid),
            widgets,
            is_preview: self.preview.is_some(),
        }
    }
}

/// In-memory widget catalog keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCatalog {
    widgets: BTreeMap<WidgetId, WidgetSize>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_widget(mut self, id: impl Into<WidgetId>, size: WidgetSize) -> Self {
        self.insert(id, size);
        self
    }

    pub fn insert(&mut self, id: impl Into<WidgetId>, size: WidgetSize) {
        self.widgets.insert(id.into(), size);
    }

    pub fn remove(&mut self, id: &WidgetId) -> Option<WidgetSize> {
        self.widgets.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &WidgetId> {
        self.widgets.keys()
    }

    /// Place every widget at its default size, left to right, wrapping at
    /// `column_count`, then compact.
    #[must_use]
    pub fn default_layout(&self, column_count: u16) -> Layout {
        let columns = column_count.max(1);
        let mut x = 0u16;
        let items: Vec<_> = self
            .widgets
            .iter()
            .map(|(id, size)| {
                let w = size.w.clamp(1, columns);
                if x.saturating_add(w) > columns {
                    x = 0;
                }
                let item = WidgetPlacement::new(id.clone(), x, 0, w, size.h.max(1));
                x += w;
                item
            })
            .collect();
        sanitize_layout(&Layout::from(items))
    }
}

impl WidgetCatalog for StaticCatalog {
    fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    fn default_size(&self, id: &WidgetId) -> Option<WidgetSize> {
        self.widgets.get(id).copied()
    }
}

impl<I: Into<WidgetId>> FromIterator<(I, WidgetSize)> for StaticCatalog {
    fn from_iter<T: IntoIterator<Item = (I, WidgetSize)>>(iter: T) -> Self {
        Self {
            widgets: iter
                .into_iter()
                .map(|(id, size)| (id.into(), size))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgrid_layout::{Breakpoint, is_overlapping};
    use pretty_assertions::assert_eq;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_widget("goals", WidgetSize::new(6, 2))
            .with_widget("entries", WidgetSize::new(6, 3))
            .with_widget("messages", WidgetSize::new(12, 2))
    }

    fn grid() -> GridConfig {
        GridConfig::new(12, 80.0, 16.0, Breakpoint::Lg).unwrap()
    }

    #[test]
    fn template_and_areas_use_one_based_lines() {
        let container = GridContainer::new(grid());
        let layout = Layout::from(vec![WidgetPlacement::new("goals", 3, 2, 4, 2)]);
        let frame = container.render(&layout, &catalog());
        assert_eq!(frame.template.css_columns(), "repeat(12, minmax(0, 1fr))");
        assert_eq!(frame.template.css_auto_rows(), "80px");
        assert_eq!(frame.template.css_gap(), "16px");
        let goals = frame.widget("goals").unwrap();
        assert_eq!(goals.area.css_column(), "4 / span 4");
        assert_eq!(goals.area.css_row(), "3 / span 2");
        assert_eq!(frame.height_rows(), 4);
    }

    #[test]
    fn unknown_widgets_are_skipped_not_removed() {
        let container = GridContainer::new(grid());
        let layout = Layout::from(vec![
            WidgetPlacement::new("goals", 0, 0, 6, 2),
            WidgetPlacement::new("retired", 6, 0, 6, 2),
        ]);
        let frame = container.render(&layout, &catalog());
        assert_eq!(frame.widgets.len(), 1);
        assert!(frame.widget("retired").is_none());
        // The context still carries the full layout.
        assert_eq!(frame.widgets[0].context.layout.len(), 2);
    }

    #[test]
    fn contexts_are_rebuilt_per_render() {
        let mut container = GridContainer::new(grid());
        container.set_container_rect(Some(PixelRect::new(0.0, 0.0, 1200.0, 800.0)));
        let first = Layout::from(vec![WidgetPlacement::new("goals", 0, 0, 6, 2)]);
        let second = Layout::from(vec![WidgetPlacement::new("goals", 6, 0, 6, 2)]);
        let a = container.render(&first, &catalog());
        let b = container.render(&second, &catalog());
        assert_eq!(a.widgets[0].context.layout.get("goals").unwrap().x, 0);
        assert_eq!(b.widgets[0].context.layout.get("goals").unwrap().x, 6);
        assert_eq!(
            b.widgets[0].context.container,
            Some(PixelRect::new(0.0, 0.0, 1200.0, 800.0))
        );
    }

    #[test]
    fn live_updates_preview_and_commits_clear_it() {
        let mut container = GridContainer::new(grid());
        let committed = Layout::from(vec![WidgetPlacement::new("goals", 0, 0, 6, 2)]);
        let live = committed.with_item("goals", |item| item.h = 5);

        assert!(container.route(LayoutUpdate::Live(live.clone())).is_none());
        let frame = container.render(&committed, &catalog());
        assert!(frame.is_preview);
        assert_eq!(frame.widget("goals").unwrap().area.row_span, 5);

        let forwarded = container.route(LayoutUpdate::Committed(CommittedLayout::compact(&live)));
        assert_eq!(forwarded.map(Layout::from), Some(live));
        assert!(container.preview().is_none());
    }

    #[test]
    fn grid_change_drops_preview() {
        let mut container = GridContainer::new(grid());
        container.route(LayoutUpdate::Live(Layout::new()));
        container.set_grid(GridConfig::new(4, 80.0, 12.0, Breakpoint::Xs).unwrap());
        assert!(container.preview().is_none());
        assert_eq!(container.grid().column_count, 4);
    }

    #[test]
    fn default_layout_wraps_and_is_collision_free() {
        let layout = catalog().default_layout(12);
        assert_eq!(layout.len(), 3);
        for a in &layout {
            for b in &layout {
                if a.id != b.id {
                    assert!(!is_overlapping(Some(a), Some(b)));
                }
            }
            assert!(a.right() <= 12);
        }
        // entries (6 wide) and goals (6 wide) share the first row.
        assert_eq!(layout.get("entries").unwrap().y, 0);
        assert_eq!(layout.get("goals").unwrap().y, 0);
        assert_eq!(layout.get("messages").unwrap().y, 3);
    }

    #[test]
    fn catalog_reports_default_sizes() {
        let catalog: StaticCatalog = [("a", WidgetSize::new(2, 2))].into_iter().collect();
        assert!(catalog.contains(&WidgetId::new("a")));
        assert_eq!(catalog.default_size(&WidgetId::new("a")), Some(WidgetSize::new(2, 2)));
        assert_eq!(catalog.default_size(&WidgetId::new("b")), None);
    }

    struct TargetCapture {
        events: std::sync::Arc<std::sync::Mutex<Vec<(String, String)>>>,
    }

    struct MessageVisitor(String);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for TargetCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.events
                .lock()
                .unwrap()
                .push((event.metadata().target().to_string(), visitor.0));
        }
    }

    #[test]
    fn unknown_widget_is_skipped_with_debug_event() {
        use tracing_subscriber::layer::SubscriberExt;

        let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(TargetCapture {
            events: events.clone(),
        });
        let layout = Layout::from(vec![
            WidgetPlacement::new("goals", 0, 0, 6, 2),
            WidgetPlacement::new("retired", 6, 0, 6, 2),
        ]);
        let frame = tracing::subscriber::with_default(subscriber, || {
            GridContainer::new(grid()).render(&layout, &catalog())
        });

        assert_eq!(frame.widgets.len(), 1);
        assert!(frame.widget("retired").is_none());
        let events = events.lock().unwrap();
        assert!(
            events
                .iter()
                .any(|(target, message)| target == TARGET && message == "skipping unknown widget"),
            "missing container event: {events:?}"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn frame_serializes_without_widget_context() {
        let layout = Layout::from(vec![WidgetPlacement::new("goals", 3, 2, 4, 2)]);
        let frame = GridContainer::new(grid()).render(&layout, &catalog());
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["template"]["column_count"], 12);
        assert_eq!(json["is_preview"], false);
        let widget = &json["widgets"][0];
        assert_eq!(widget["id"], "goals");
        assert_eq!(widget["area"]["column_start"], 4);
        assert_eq!(widget["area"]["row_span"], 2);
        assert!(widget.get("context").is_none());
    }
}
