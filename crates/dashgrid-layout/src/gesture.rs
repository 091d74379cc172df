#![forbid(unsafe_code)]

//! Per-widget drag and resize state machine.
//!
//! ```text
//! Idle --begin--> Active(session) --pointer_up-----> Idle (committed update)
//!                        |        \--pointer_cancel--> Idle (no update)
//!                        \--pointer_move--> Active (live update / visual offset)
//! ```
//!
//! The controller never touches the host. Every input returns a
//! [`GestureDispatch`] listing the layout update to forward (if any), the
//! visual offset to apply to the dragged element, and the [`HostCommand`]s the
//! adapter must execute (listener registration, text selection, cursor).
//!
//! Updates follow an explicit two-phase protocol:
//! - [`LayoutUpdate::Live`]: uncompacted, emitted on every resize move so the
//!   widget grows or shrinks without neighbours jumping mid-gesture.
//! - [`LayoutUpdate::Committed`]: always compacted, emitted once on pointer-up.
//!
//! Drags emit no live layout; they only move the element visually until
//! release.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GridConfig;
use crate::compact::{clamp_cell, sanitize_layout};
use crate::geometry::{GridMetrics, GridRect, PixelPoint, PixelRect};
use crate::placement::{Layout, WidgetId, WidgetPlacement};

const TARGET: &str = "dashgrid.gesture";

/// Interaction kind of a gesture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    /// Move the widget; started from its header or a drag handle.
    Drag,
    /// Change `h`; started from the bottom-edge affordance.
    ResizeVertical,
    /// Change `w`; started from the right-edge affordance.
    ResizeHorizontal,
}

impl GestureKind {
    /// Cursor shown while a session of this kind is active.
    #[must_use]
    pub const fn cursor(self) -> CursorAffordance {
        match self {
            Self::Drag => CursorAffordance::Grabbing,
            Self::ResizeVertical => CursorAffordance::RowResize,
            Self::ResizeHorizontal => CursorAffordance::ColResize,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drag => "drag",
            Self::ResizeVertical => "resize_vertical",
            Self::ResizeHorizontal => "resize_horizontal",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ephemeral state of one active interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureSession {
    pub kind: GestureKind,
    pub widget_id: WidgetId,
    /// Pointer position at pointer-down, viewport pixels.
    pub origin_pointer: PixelPoint,
    /// Placement at pointer-down.
    pub origin_placement: GridRect,
    /// Element's top-left relative to the container at pointer-down.
    pub origin_element_offset: PixelPoint,
}

/// Everything the controller reads from its surroundings for one input.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    /// The current committed layout.
    pub layout: &'a Layout,
    pub grid: &'a GridConfig,
    /// Container bounding box in viewport pixels.
    pub container: Option<PixelRect>,
    /// Widget element bounding box in viewport pixels.
    pub element: Option<PixelRect>,
    pub customize_mode: bool,
}

impl<'a> GestureContext<'a> {
    /// Context in customize mode without measured element rect.
    #[must_use]
    pub fn new(layout: &'a Layout, grid: &'a GridConfig, container: Option<PixelRect>) -> Self {
        Self {
            layout,
            grid,
            container,
            element: None,
            customize_mode: true,
        }
    }

    #[must_use]
    pub fn with_element(mut self, element: Option<PixelRect>) -> Self {
        self.element = element;
        self
    }

    #[must_use]
    pub fn with_customize_mode(mut self, customize_mode: bool) -> Self {
        self.customize_mode = customize_mode;
        self
    }

    fn metrics(&self) -> Option<GridMetrics> {
        self.container
            .map(|container| GridMetrics::new(self.grid, container.width))
    }
}

/// A layout that has been through [`sanitize_layout`].
///
/// There is no other way to construct one, so a committed update is always
/// collision-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedLayout(Layout);

impl CommittedLayout {
    /// Compact `layout` and mark it committed.
    #[must_use]
    pub fn compact(layout: &Layout) -> Self {
        Self(sanitize_layout(layout))
    }

    #[must_use]
    pub fn as_layout(&self) -> &Layout {
        &self.0
    }

    #[must_use]
    pub fn into_layout(self) -> Layout {
        self.0
    }
}

impl AsRef<Layout> for CommittedLayout {
    fn as_ref(&self) -> &Layout {
        &self.0
    }
}

impl From<CommittedLayout> for Layout {
    fn from(committed: CommittedLayout) -> Self {
        committed.0
    }
}

/// Layout change requested by a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutUpdate {
    /// In-progress preview, not compacted, not recorded.
    Live(Layout),
    /// Final compacted layout for the store.
    Committed(CommittedLayout),
}

impl LayoutUpdate {
    #[must_use]
    pub fn layout(&self) -> &Layout {
        match self {
            Self::Live(layout) => layout,
            Self::Committed(committed) => committed.as_layout(),
        }
    }

    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Cursor shape requested while a gesture is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorAffordance {
    Default,
    Grabbing,
    RowResize,
    ColResize,
}

impl CursorAffordance {
    /// CSS `cursor` value.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grabbing => "grabbing",
            Self::RowResize => "row-resize",
            Self::ColResize => "col-resize",
        }
    }
}

/// Side effect the host adapter must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum HostCommand {
    /// Register global pointer-move/up/cancel listeners for this widget.
    AttachPointerListeners,
    /// Remove them again.
    DetachPointerListeners,
    /// `true` suppresses text selection, `false` releases the suppression.
    SuppressTextSelection(bool),
    SetCursor(CursorAffordance),
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    NotCustomizing,
    MissingContainer,
    MissingElement,
    UnknownWidget,
    NotDraggable,
    NotResizable,
    SessionAlreadyActive,
    NoActiveSession,
    /// Input came from a different pointer than the one that armed the session.
    PointerMismatch,
}

impl IgnoredReason {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotCustomizing => "not_customizing",
            Self::MissingContainer => "missing_container",
            Self::MissingElement => "missing_element",
            Self::UnknownWidget => "unknown_widget",
            Self::NotDraggable => "not_draggable",
            Self::NotResizable => "not_resizable",
            Self::SessionAlreadyActive => "session_already_active",
            Self::NoActiveSession => "no_active_session",
            Self::PointerMismatch => "pointer_mismatch",
        }
    }
}

impl fmt::Display for IgnoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What one input did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum GestureOutcome {
    Started(GestureKind),
    Updated,
    Committed,
    Canceled,
    Ignored(IgnoredReason),
}

/// Result of feeding one input into a [`GestureController`].
#[derive(Debug, Clone, PartialEq)]
pub struct GestureDispatch {
    pub update: Option<LayoutUpdate>,
    /// Visual translation for the dragged element; `Some(ORIGIN)` resets it.
    pub visual_offset: Option<PixelPoint>,
    pub commands: Vec<HostCommand>,
    pub outcome: GestureOutcome,
}

impl GestureDispatch {
    fn new(outcome: GestureOutcome) -> Self {
        Self {
            update: None,
            visual_offset: None,
            commands: Vec::new(),
            outcome,
        }
    }

    /// An input that changed nothing, logged at debug.
    pub fn ignored(widget: &WidgetId, reason: IgnoredReason) -> Self {
        tracing::debug!(target: TARGET, widget = %widget, reason = reason.label(), "gesture input ignored");
        Self::new(GestureOutcome::Ignored(reason))
    }

    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.outcome, GestureOutcome::Ignored(_))
    }
}

/// Gesture lifecycle state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Active(GestureSession),
}

/// Drag/resize state machine for one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureController {
    widget_id: WidgetId,
    state: GestureState,
}

impl GestureController {
    #[must_use]
    pub fn new(widget_id: impl Into<WidgetId>) -> Self {
        Self {
            widget_id: widget_id.into(),
            state: GestureState::Idle,
        }
    }

    #[must_use]
    pub fn widget_id(&self) -> &WidgetId {
        &self.widget_id
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<&GestureSession> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Active(session) => Some(session),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::Active(_))
    }

    /// Arm a session from pointer-down at `pointer` (viewport pixels).
    pub fn begin(
        &mut self,
        kind: GestureKind,
        ctx: &GestureContext<'_>,
        pointer: PixelPoint,
    ) -> GestureDispatch {
        let reject = |reason| GestureDispatch::ignored(&self.widget_id, reason);
        if !ctx.customize_mode {
            return reject(IgnoredReason::NotCustomizing);
        }
        if self.is_active() {
            return reject(IgnoredReason::SessionAlreadyActive);
        }
        let (Some(container), Some(metrics)) = (ctx.container, ctx.metrics()) else {
            return reject(IgnoredReason::MissingContainer);
        };
        let Some(placement) = ctx.layout.get(self.widget_id.as_str()) else {
            return reject(IgnoredReason::UnknownWidget);
        };
        let origin_element_offset = match (kind, ctx.element) {
            (_, Some(element)) => element.origin() - container.origin(),
            (GestureKind::Drag, None) => return reject(IgnoredReason::MissingElement),
            (_, None) => metrics.cell_rect(&placement.rect()).origin(),
        };
        match kind {
            GestureKind::Drag if !placement.is_draggable => {
                return reject(IgnoredReason::NotDraggable);
            }
            GestureKind::ResizeVertical | GestureKind::ResizeHorizontal
                if !placement.is_resizable =>
            {
                return reject(IgnoredReason::NotResizable);
            }
            _ => {}
        }

        tracing::debug!(
            target: TARGET,
            widget = %self.widget_id,
            kind = kind.label(),
            x = placement.x,
            y = placement.y,
            w = placement.w,
            h = placement.h,
            "gesture started"
        );
        self.state = GestureState::Active(GestureSession {
            kind,
            widget_id: self.widget_id.clone(),
            origin_pointer: pointer,
            origin_placement: placement.rect(),
            origin_element_offset,
        });

        let mut dispatch = GestureDispatch::new(GestureOutcome::Started(kind));
        dispatch.commands = vec![
            HostCommand::AttachPointerListeners,
            HostCommand::SuppressTextSelection(true),
            HostCommand::SetCursor(kind.cursor()),
        ];
        if kind == GestureKind::Drag {
            dispatch.visual_offset = Some(PixelPoint::ORIGIN);
        }
        dispatch
    }

    /// Pointer moved while a session may be active.
    pub fn pointer_move(&mut self, ctx: &GestureContext<'_>, pointer: PixelPoint) -> GestureDispatch {
        let GestureState::Active(session) = &self.state else {
            return GestureDispatch::ignored(&self.widget_id, IgnoredReason::NoActiveSession);
        };
        if session.kind == GestureKind::Drag {
            let mut dispatch = GestureDispatch::new(GestureOutcome::Updated);
            dispatch.visual_offset = Some(pointer - session.origin_pointer);
            return dispatch;
        }
        match resized_layout(session, ctx, pointer) {
            Ok(layout) => {
                let mut dispatch = GestureDispatch::new(GestureOutcome::Updated);
                dispatch.update = Some(LayoutUpdate::Live(layout));
                dispatch
            }
            Err(reason) => GestureDispatch::ignored(&self.widget_id, reason),
        }
    }

    /// Pointer released: end the session and commit the final layout.
    pub fn pointer_up(&mut self, ctx: &GestureContext<'_>, pointer: PixelPoint) -> GestureDispatch {
        let GestureState::Active(session) = std::mem::take(&mut self.state) else {
            return GestureDispatch::ignored(&self.widget_id, IgnoredReason::NoActiveSession);
        };
        let next = match session.kind {
            GestureKind::Drag => dropped_layout(&session, ctx, pointer),
            GestureKind::ResizeVertical | GestureKind::ResizeHorizontal => {
                resized_layout(&session, ctx, pointer)
            }
        };
        match next {
            Ok(layout) => {
                let committed = CommittedLayout::compact(&layout);
                if let Some(item) = committed.as_layout().get(self.widget_id.as_str()) {
                    tracing::debug!(
                        target: TARGET,
                        widget = %self.widget_id,
                        kind = session.kind.label(),
                        x = item.x,
                        y = item.y,
                        w = item.w,
                        h = item.h,
                        "gesture committed"
                    );
                }
                let mut dispatch = release(&session, GestureOutcome::Committed);
                dispatch.update = Some(LayoutUpdate::Committed(committed));
                dispatch
            }
            Err(reason) => {
                tracing::debug!(
                    target: TARGET,
                    widget = %self.widget_id,
                    reason = reason.label(),
                    "gesture ended without commit"
                );
                release(&session, GestureOutcome::Canceled)
            }
        }
    }

    /// Host canceled the pointer: end the session, keep the committed layout.
    pub fn pointer_cancel(&mut self) -> GestureDispatch {
        match self.force_cancel() {
            Some(dispatch) => dispatch,
            None => GestureDispatch::ignored(&self.widget_id, IgnoredReason::NoActiveSession),
        }
    }

    /// Reset to idle from any state. Returns `None` when already idle.
    ///
    /// Teardown paths use this to release host resources without an input
    /// event.
    pub fn force_cancel(&mut self) -> Option<GestureDispatch> {
        let GestureState::Active(session) = std::mem::take(&mut self.state) else {
            return None;
        };
        tracing::debug!(
            target: TARGET,
            widget = %self.widget_id,
            kind = session.kind.label(),
            "gesture canceled"
        );
        Some(release(&session, GestureOutcome::Canceled))
    }
}

fn release(session: &GestureSession, outcome: GestureOutcome) -> GestureDispatch {
    let mut dispatch = GestureDispatch::new(outcome);
    dispatch.commands = vec![
        HostCommand::DetachPointerListeners,
        HostCommand::SuppressTextSelection(false),
        HostCommand::SetCursor(CursorAffordance::Default),
    ];
    if session.kind == GestureKind::Drag {
        dispatch.visual_offset = Some(PixelPoint::ORIGIN);
    }
    dispatch
}

fn current_item<'a>(
    session: &GestureSession,
    ctx: &GestureContext<'a>,
) -> Result<&'a WidgetPlacement, IgnoredReason> {
    ctx.layout
        .get(session.widget_id.as_str())
        .ok_or(IgnoredReason::UnknownWidget)
}

/// Layout with the widget at the grid cell under its dropped top-left corner.
fn dropped_layout(
    session: &GestureSession,
    ctx: &GestureContext<'_>,
    pointer: PixelPoint,
) -> Result<Layout, IgnoredReason> {
    let metrics = ctx.metrics().ok_or(IgnoredReason::MissingContainer)?;
    let item = current_item(session, ctx)?;
    let dropped = session.origin_element_offset + (pointer - session.origin_pointer);
    let max_x = i32::from(ctx.grid.column_count.saturating_sub(item.w));
    let x = clamp_cell(metrics.to_grid_x(dropped.x), max_x);
    let y = clamp_cell(metrics.to_grid_y(dropped.y), i32::from(u16::MAX));
    Ok(ctx.layout.with_item(session.widget_id.as_str(), |item| {
        item.x = x;
        item.y = y;
    }))
}

/// Layout with the widget's size derived from the pointer delta.
fn resized_layout(
    session: &GestureSession,
    ctx: &GestureContext<'_>,
    pointer: PixelPoint,
) -> Result<Layout, IgnoredReason> {
    let metrics = ctx.metrics().ok_or(IgnoredReason::MissingContainer)?;
    current_item(session, ctx)?;
    let origin = session.origin_placement;
    let delta = pointer - session.origin_pointer;
    let id = session.widget_id.as_str();
    let layout = match session.kind {
        GestureKind::ResizeVertical => {
            let rows = i32::from(origin.h) + metrics.rows_for_delta(delta.y);
            let h = clamp_cell(rows.max(1), i32::from(u16::MAX));
            ctx.layout.with_item(id, |item| item.h = h)
        }
        GestureKind::ResizeHorizontal => {
            let max_w = i32::from(ctx.grid.column_count.saturating_sub(origin.x).max(1));
            let cols = i32::from(origin.w) + metrics.columns_for_delta(delta.x);
            let w = clamp_cell(cols.max(1), max_w);
            ctx.layout.with_item(id, |item| item.w = w)
        }
        GestureKind::Drag => ctx.layout.clone(),
    };
    Ok(layout)
}
