#![forbid(unsafe_code)]

//! Collision-free vertical compaction.
//!
//! # Algorithm
//!
//! [`sanitize_layout`] sorts a copy of the placements by `(y, x)` (stable, so
//! equal keys keep their input order) and places them one at a time:
//!
//! 1. **Pull up**: while the row above is free of every already-placed item,
//!    move up one row.
//! 2. **Push down**: while the item overlaps any already-placed item, move
//!    down one row.
//!
//! Earlier placements are never revisited, so the result is collision-free
//! but not minimal in height. Both loops stop after
//! [`COMPACTION_ITERATION_LIMIT`] steps, log at error level, and keep the
//! partial position.
//!
//! Compaction never changes `x` or `w`. Keeping placements inside the grid's
//! columns is the job of [`move_item`] and [`clamp_to_columns`].

use crate::placement::{Layout, WidgetPlacement};

/// Column count assumed by callers that have no grid configuration at hand.
pub const DEFAULT_COLUMN_COUNT: u16 = 12;

/// Maximum single-row steps per phase for one item.
pub const COMPACTION_ITERATION_LIMIT: u32 = 1000;

const TARGET: &str = "dashgrid.compact";

/// Positive-area overlap test. A missing operand never overlaps.
#[must_use]
pub fn is_overlapping(a: Option<&WidgetPlacement>, b: Option<&WidgetPlacement>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.overlaps(b),
        _ => false,
    }
}

fn collides(item: &WidgetPlacement, placed: &[WidgetPlacement]) -> bool {
    placed.iter().any(|other| item.overlaps(other))
}

fn pull_up(item: &mut WidgetPlacement, placed: &[WidgetPlacement]) {
    let mut steps = 0;
    while item.y > 0 {
        if steps >= COMPACTION_ITERATION_LIMIT {
            tracing::error!(
                target: TARGET,
                widget = %item.id,
                phase = "pull_up",
                y = item.y,
                limit = COMPACTION_ITERATION_LIMIT,
                "compaction iteration limit reached, keeping partial position"
            );
            return;
        }
        let above = item.with_position(item.x, item.y - 1);
        if collides(&above, placed) {
            return;
        }
        item.y -= 1;
        steps += 1;
    }
}

fn push_down(item: &mut WidgetPlacement, placed: &[WidgetPlacement]) {
    let mut steps = 0;
    while collides(item, placed) {
        if steps >= COMPACTION_ITERATION_LIMIT || item.y == u16::MAX {
            tracing::error!(
                target: TARGET,
                widget = %item.id,
                phase = "push_down",
                y = item.y,
                limit = COMPACTION_ITERATION_LIMIT,
                "compaction iteration limit reached, keeping partial position"
            );
            return;
        }
        item.y += 1;
        steps += 1;
    }
}

/// Remove overlaps and vertical gaps.
///
/// The output is ordered by the `(y, x)` processing order, not the input
/// order.
#[must_use]
pub fn sanitize_layout(layout: &Layout) -> Layout {
    let mut queue: Vec<WidgetPlacement> = layout.iter().cloned().collect();
    queue.sort_by_key(|item| (item.y, item.x));

    let mut placed: Vec<WidgetPlacement> = Vec::with_capacity(queue.len());
    for mut item in queue {
        pull_up(&mut item, &placed);
        push_down(&mut item, &placed);
        placed.push(item);
    }
    Layout::from(placed)
}

/// Move one widget and compact.
///
/// `new_x` is clamped to `[0, column_count - w]` (the upper bound saturates at
/// 0 when the widget is wider than the grid) and `new_y` to `>= 0`. An unknown
/// id returns the layout unchanged and uncompacted.
#[must_use]
pub fn move_item(
    layout: &Layout,
    id: &str,
    new_x: i32,
    new_y: i32,
    column_count: u16,
) -> Layout {
    let Some(item) = layout.get(id) else {
        return layout.clone();
    };
    let max_x = i32::from(column_count.saturating_sub(item.w));
    let x = clamp_cell(new_x, max_x);
    let y = clamp_cell(new_y, i32::from(u16::MAX));
    sanitize_layout(&layout.with_item(id, |item| {
        item.x = x;
        item.y = y;
    }))
}

/// Clamp an already-computed cell coordinate into `[0, max]`.
pub(crate) fn clamp_cell(value: i32, max: i32) -> u16 {
    u16::try_from(value.clamp(0, max.max(0))).unwrap_or(u16::MAX)
}

/// Fit every placement inside `columns`: widths shrink to at most `columns`,
/// then `x` shifts left until `x + w <= columns`. Rows are untouched, so the
/// result usually needs a [`sanitize_layout`] pass.
#[must_use]
pub fn clamp_to_columns(layout: &Layout, columns: u16) -> Layout {
    let columns = columns.max(1);
    layout
        .iter()
        .map(|item| {
            let w = item.w.clamp(1, columns);
            let x = item.x.min(columns - w);
            WidgetPlacement {
                x,
                w,
                ..item.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    fn p(id: &str, x: u16, y: u16, w: u16, h: u16) -> WidgetPlacement {
        WidgetPlacement::new(id, x, y, w, h)
    }

    fn layout(items: Vec<WidgetPlacement>) -> Layout {
        Layout::from(items)
    }

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: tracing::Level,
        target: String,
        fields: Vec<(String, String)>,
    }

    struct EventCapture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for EventCapture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            self.events.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields: visitor.0,
            });
        }
    }

    fn with_captured_events<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(EventCapture {
            events: events.clone(),
        });
        let out = tracing::subscriber::with_default(subscriber, f);
        let captured = events.lock().unwrap().clone();
        (out, captured)
    }

    fn field<'a>(event: &'a CapturedEvent, name: &str) -> Option<&'a str> {
        event
            .fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn overlap_requires_positive_area() {
        let a = p("a", 0, 0, 2, 2);
        assert!(is_overlapping(Some(&a), Some(&p("b", 1, 1, 2, 2))));
        assert!(!is_overlapping(Some(&a), Some(&p("b", 2, 0, 2, 2))));
        assert!(!is_overlapping(Some(&a), Some(&p("b", 0, 2, 2, 2))));
        assert!(!is_overlapping(Some(&a), None));
        assert!(!is_overlapping(None, None));
    }

    #[test]
    fn empty_layout_stays_empty() {
        assert!(sanitize_layout(&Layout::new()).is_empty());
    }

    #[test]
    fn fully_overlapping_pair_stacks_in_input_order() {
        let out = sanitize_layout(&layout(vec![p("x", 0, 0, 4, 2), p("y", 0, 0, 4, 2)]));
        assert_eq!(
            out,
            layout(vec![p("x", 0, 0, 4, 2), p("y", 0, 2, 4, 2)])
        );
    }

    #[test]
    fn gaps_are_pulled_up() {
        let out = sanitize_layout(&layout(vec![p("a", 0, 5, 3, 1), p("b", 4, 9, 2, 2)]));
        assert_eq!(out.get("a").unwrap().y, 0);
        assert_eq!(out.get("b").unwrap().y, 0);
    }

    #[test]
    fn pull_up_stops_under_placed_item() {
        let out = sanitize_layout(&layout(vec![p("top", 0, 0, 4, 3), p("low", 2, 8, 4, 1)]));
        assert_eq!(out.get("low").unwrap().y, 3);
    }

    #[test]
    fn output_follows_sort_order() {
        let out = sanitize_layout(&layout(vec![
            p("c", 0, 4, 1, 1),
            p("b", 3, 0, 1, 1),
            p("a", 0, 0, 1, 1),
        ]));
        let ids: Vec<_> = out.ids().map(|id| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn earlier_placements_are_not_revisited() {
        // "wide" is pushed below "dot" even though moving "dot" would let
        // both share row 0; cell (1, 0) stays empty.
        let out = sanitize_layout(&layout(vec![p("dot", 0, 0, 1, 1), p("wide", 0, 0, 2, 1)]));
        assert_eq!(out.get("dot").unwrap().y, 0);
        assert_eq!(out.get("wide").unwrap().y, 1);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn move_item_clamps_negative_targets() {
        let base = layout(vec![p("w", 6, 4, 4, 2)]);
        let out = move_item(&base, "w", -5, -3, DEFAULT_COLUMN_COUNT);
        let item = out.get("w").unwrap();
        assert_eq!((item.x, item.y), (0, 0));
    }

    #[test]
    fn move_item_clamps_to_right_edge() {
        let base = layout(vec![p("w", 0, 0, 2, 1)]);
        let out = move_item(&base, "w", 2, 0, 3);
        assert_eq!(out.get("w").unwrap().x, 1);
    }

    #[test]
    fn move_item_with_oversized_widget_pins_to_zero() {
        let base = layout(vec![p("w", 0, 0, 6, 1)]);
        let out = move_item(&base, "w", 3, 0, 4);
        assert_eq!(out.get("w").unwrap().x, 0);
    }

    #[test]
    fn move_item_unknown_id_is_identity() {
        let base = layout(vec![p("a", 0, 3, 1, 1)]);
        assert_eq!(move_item(&base, "nope", 0, 0, 12), base);
    }

    #[test]
    fn move_item_compacts_neighbours() {
        let base = layout(vec![p("a", 0, 0, 4, 2), p("b", 0, 2, 4, 2)]);
        let out = move_item(&base, "b", 0, 0, 12);
        // Equal (y, x) keys keep input order: "a" stays on top.
        assert_eq!(out.get("a").unwrap().y, 0);
        assert_eq!(out.get("b").unwrap().y, 2);
        let out = move_item(&base, "b", 6, 0, 12);
        assert_eq!(out.get("b").unwrap().rect().y, 0);
        assert_eq!(out.get("b").unwrap().x, 6);
    }

    #[test]
    fn clamp_to_columns_shrinks_and_shifts() {
        let out = clamp_to_columns(
            &layout(vec![p("wide", 2, 0, 8, 1), p("far", 5, 1, 2, 1)]),
            4,
        );
        let wide = out.get("wide").unwrap();
        assert_eq!((wide.x, wide.w), (0, 4));
        let far = out.get("far").unwrap();
        assert_eq!((far.x, far.w), (2, 2));
    }

    #[test]
    fn pull_up_guard_logs_and_keeps_partial_position() {
        let (out, events) =
            with_captured_events(|| sanitize_layout(&layout(vec![p("deep", 0, 1500, 1, 1)])));
        assert_eq!(out.get("deep").unwrap().y, 500);
        let errors: Vec<_> = events
            .iter()
            .filter(|e| e.level == tracing::Level::ERROR && e.target == TARGET)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(field(errors[0], "phase"), Some("pull_up"));
        assert_eq!(field(errors[0], "widget"), Some("deep"));
    }

    #[test]
    fn push_down_guard_logs_and_keeps_partial_position() {
        let (out, events) = with_captured_events(|| {
            sanitize_layout(&layout(vec![p("pillar", 0, 0, 2, 2000), p("late", 1, 0, 1, 1)]))
        });
        assert_eq!(out.get("late").unwrap().y, 1000);
        let phases: Vec<_> = events
            .iter()
            .filter(|e| e.level == tracing::Level::ERROR)
            .filter_map(|e| field(e, "phase"))
            .collect();
        assert_eq!(phases, vec!["push_down"]);
    }

    #[test]
    fn compaction_without_guard_hits_is_silent() {
        let (_, events) = with_captured_events(|| {
            sanitize_layout(&layout(vec![p("a", 0, 0, 2, 2), p("b", 0, 0, 2, 2)]))
        });
        assert!(events.iter().all(|e| e.level != tracing::Level::ERROR));
    }
}
