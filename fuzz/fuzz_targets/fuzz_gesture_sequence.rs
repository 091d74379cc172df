#![no_main]

use arbitrary::Arbitrary;
use dashgrid_layout::{
    Breakpoint, GestureContext, GestureController, GestureKind, GridConfig, Layout, LayoutUpdate,
    PixelPoint, PixelRect, WidgetPlacement,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Step {
    Down { kind: u8, x: i16, y: i16 },
    Move { x: i16, y: i16 },
    Up { x: i16, y: i16 },
    Cancel,
    Customize(bool),
}

// Coordinates stay within +-255px so repeated resizes keep every item far
// below the compaction guard.
fn point(x: i16, y: i16) -> PixelPoint {
    PixelPoint::new(f64::from(x % 256), f64::from(y % 256))
}

fuzz_target!(|steps: Vec<Step>| {
    let grid = GridConfig {
        column_count: 6,
        row_height_px: 40.0,
        gap_px: 8.0,
        breakpoint: Breakpoint::Md,
    };
    let container = Some(PixelRect::new(0.0, 0.0, 600.0, 800.0));
    let mut layout = Layout::from(vec![
        WidgetPlacement::new("a", 0, 0, 3, 2),
        WidgetPlacement::new("b", 3, 0, 3, 1),
        WidgetPlacement::new("c", 0, 2, 6, 1),
    ]);
    let mut controller = GestureController::new("a");
    let mut customize = true;

    for step in steps.into_iter().take(64) {
        let ctx = GestureContext::new(&layout, &grid, container)
            .with_element(Some(PixelRect::new(0.0, 0.0, 296.0, 88.0)))
            .with_customize_mode(customize);
        let dispatch = match step {
            Step::Down { kind, x, y } => {
                let kind = match kind % 3 {
                    0 => GestureKind::Drag,
                    1 => GestureKind::ResizeVertical,
                    _ => GestureKind::ResizeHorizontal,
                };
                controller.begin(kind, &ctx, point(x, y))
            }
            Step::Move { x, y } => controller.pointer_move(&ctx, point(x, y)),
            Step::Up { x, y } => controller.pointer_up(&ctx, point(x, y)),
            Step::Cancel => controller.pointer_cancel(),
            Step::Customize(on) => {
                customize = on;
                continue;
            }
        };
        if let Some(LayoutUpdate::Committed(committed)) = dispatch.update {
            let next = committed.into_layout();
            assert!(
                next.validate_for_columns(grid.column_count).is_ok(),
                "committed layout invalid"
            );
            layout = next;
        }
    }
});
