#![no_main]

use arbitrary::Arbitrary;
use dashgrid_layout::{Layout, WidgetPlacement, clamp_to_columns, move_item, sanitize_layout};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Item {
    x: u8,
    y: u8,
    w: u8,
    h: u8,
}

#[derive(Debug, Arbitrary)]
struct Input {
    columns: u8,
    items: Vec<Item>,
    mover: u8,
    new_x: i16,
    new_y: i16,
}

fuzz_target!(|input: Input| {
    // 1..=24 columns, at most 32 items of height 1..=8 keeps every item well
    // under the compaction guard.
    let columns = u16::from(input.columns % 24) + 1;
    let items: Vec<_> = input
        .items
        .iter()
        .take(32)
        .enumerate()
        .map(|(i, item)| {
            WidgetPlacement::new(
                format!("w{i}"),
                u16::from(item.x),
                u16::from(item.y % 64),
                u16::from(item.w % 12) + 1,
                u16::from(item.h % 8) + 1,
            )
        })
        .collect();
    let layout = clamp_to_columns(&Layout::from(items), columns);

    let compacted = sanitize_layout(&layout);
    assert_eq!(compacted.len(), layout.len(), "items lost");
    assert!(
        compacted.validate_for_columns(columns).is_ok(),
        "compacted layout invalid"
    );
    assert_eq!(
        sanitize_layout(&compacted).occupied_cells(),
        compacted.occupied_cells(),
        "compaction not idempotent"
    );

    if !layout.is_empty() {
        let id = format!("w{}", usize::from(input.mover) % layout.len());
        let moved = move_item(
            &compacted,
            &id,
            i32::from(input.new_x),
            i32::from(input.new_y % 64),
            columns,
        );
        assert!(moved.validate_for_columns(columns).is_ok(), "move broke layout");
    }
});
