//! Property invariants for the compaction kernel.
//!
//! Random layouts (small `y` values so the iteration guard is never reached)
//! must compact into collision-free, column-bounded layouts, and compaction
//! must be idempotent on occupied cells.

use dashgrid_layout::{
    Layout, WidgetPlacement, clamp_to_columns, is_overlapping, move_item, sanitize_layout,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn arb_layout() -> impl Strategy<Value = (u16, Layout)> {
    (1u16..=12).prop_flat_map(|columns| {
        let item = (0u16..16, 0u16..50, 1u16..=6, 1u16..=5);
        prop::collection::vec(item, 0..20).prop_map(move |raw| {
            let layout: Layout = raw
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, w, h))| WidgetPlacement::new(format!("w{i}"), x, y, w, h))
                .collect();
            (columns, clamp_to_columns(&layout, columns))
        })
    })
}

fn assert_no_overlap(layout: &Layout) {
    let items = layout.as_slice();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            assert!(
                !is_overlapping(Some(a), Some(b)),
                "{} and {} overlap in {layout:?}",
                a.id,
                b.id
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn sanitize_output_never_overlaps((_, layout) in arb_layout()) {
        assert_no_overlap(&sanitize_layout(&layout));
    }

    #[test]
    fn sanitize_keeps_ids_columns_and_sizes((_, layout) in arb_layout()) {
        let out = sanitize_layout(&layout);
        prop_assert_eq!(out.len(), layout.len());
        for item in &layout {
            let placed = out.get(item.id.as_str()).expect("id survives compaction");
            prop_assert_eq!((placed.x, placed.w, placed.h), (item.x, item.w, item.h));
        }
    }

    #[test]
    fn clamped_layouts_stay_column_bounded((columns, layout) in arb_layout()) {
        let out = sanitize_layout(&layout);
        prop_assert!(out.validate_for_columns(columns).is_ok());
    }

    #[test]
    fn sanitize_is_idempotent_on_occupied_cells((_, layout) in arb_layout()) {
        let once = sanitize_layout(&layout);
        let twice = sanitize_layout(&once);
        assert_eq!(once.occupied_cells(), twice.occupied_cells());
    }

    #[test]
    fn move_item_respects_bounds(
        (columns, layout) in arb_layout(),
        pick in any::<prop::sample::Index>(),
        new_x in -20i32..40,
        new_y in -20i32..60,
    ) {
        prop_assume!(!layout.is_empty());
        let id = layout.as_slice()[pick.index(layout.len())].id.clone();
        let out = move_item(&layout, id.as_str(), new_x, new_y, columns);
        prop_assert!(out.validate_for_columns(columns).is_ok());
        let moved = out.get(id.as_str()).expect("moved widget present");
        let max_x = i32::from(columns - moved.w);
        prop_assert_eq!(i32::from(moved.x), new_x.clamp(0, max_x));
    }
}

#[test]
fn two_identical_items_stack() {
    let layout = Layout::from(vec![
        WidgetPlacement::new("x", 0, 0, 4, 2),
        WidgetPlacement::new("y", 0, 0, 4, 2),
    ]);
    let expected = Layout::from(vec![
        WidgetPlacement::new("x", 0, 0, 4, 2),
        WidgetPlacement::new("y", 0, 2, 4, 2),
    ]);
    assert_eq!(sanitize_layout(&layout), expected);
}
