#![forbid(unsafe_code)]

//! Per-widget bridge between host pointer events and the gesture controller.
//!
//! [`WidgetGestureAdapter`] feeds [`PointerSample`]s into one
//! [`GestureController`] and executes the [`HostCommand`]s it returns:
//! - one active pointer per widget; input from any other pointer is ignored,
//! - listeners and selection suppression are held as guards while a session
//!   is active and released on pointer-up, pointer-cancel and drop.

use dashgrid_layout::{
    GestureContext, GestureController, GestureDispatch, GestureKind, HostCommand, IgnoredReason,
    PixelPoint, WidgetId,
};

use crate::listener::{HostHandle, ListenerLease, SelectionSuppressor};
use crate::pointer::PointerSample;

const TARGET: &str = "dashgrid.host";

/// Gesture lifecycle driver for one rendered widget.
pub struct WidgetGestureAdapter {
    controller: GestureController,
    host: HostHandle,
    lease: Option<ListenerLease>,
    selection: Option<SelectionSuppressor>,
    active_pointer: Option<u32>,
    visual_offset: PixelPoint,
}

impl WidgetGestureAdapter {
    #[must_use]
    pub fn new(widget_id: impl Into<WidgetId>, host: HostHandle) -> Self {
        Self {
            controller: GestureController::new(widget_id),
            host,
            lease: None,
            selection: None,
            active_pointer: None,
            visual_offset: PixelPoint::ORIGIN,
        }
    }

    #[must_use]
    pub fn widget_id(&self) -> &WidgetId {
        self.controller.widget_id()
    }

    #[must_use]
    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Pointer id that armed the current session.
    #[must_use]
    pub const fn active_pointer_id(&self) -> Option<u32> {
        self.active_pointer
    }

    /// Current visual translation of the dragged element.
    #[must_use]
    pub const fn visual_offset(&self) -> PixelPoint {
        self.visual_offset
    }

    /// Whether this adapter currently holds the global listeners.
    #[must_use]
    pub fn holds_listeners(&self) -> bool {
        self.lease.is_some()
    }

    /// Pointer-down on the header or drag handle (`Drag`) or on a resize
    /// affordance.
    pub fn pointer_down(
        &mut self,
        kind: GestureKind,
        ctx: &GestureContext<'_>,
        sample: PointerSample,
    ) -> GestureDispatch {
        if self.is_active() {
            return GestureDispatch::ignored(self.widget_id(), IgnoredReason::SessionAlreadyActive);
        }
        let dispatch = self.controller.begin(kind, ctx, sample.position);
        if self.controller.is_active() {
            self.active_pointer = Some(sample.pointer_id);
        }
        self.apply(&dispatch);
        dispatch
    }

    pub fn pointer_move(
        &mut self,
        ctx: &GestureContext<'_>,
        sample: PointerSample,
    ) -> GestureDispatch {
        if let Some(dispatch) = self.reject_foreign(sample) {
            return dispatch;
        }
        let dispatch = self.controller.pointer_move(ctx, sample.position);
        self.apply(&dispatch);
        dispatch
    }

    pub fn pointer_up(&mut self, ctx: &GestureContext<'_>, sample: PointerSample) -> GestureDispatch {
        if let Some(dispatch) = self.reject_foreign(sample) {
            return dispatch;
        }
        let dispatch = self.controller.pointer_up(ctx, sample.position);
        self.apply(&dispatch);
        dispatch
    }

    /// Host pointer-cancel (also used for blur and lost capture).
    pub fn pointer_cancel(&mut self, pointer_id: u32) -> GestureDispatch {
        if self.active_pointer.is_some_and(|active| active != pointer_id) {
            return GestureDispatch::ignored(self.widget_id(), IgnoredReason::PointerMismatch);
        }
        let dispatch = self.controller.pointer_cancel();
        self.apply(&dispatch);
        dispatch
    }

    /// End any session without an input event (teardown).
    pub fn teardown(&mut self) -> Option<GestureDispatch> {
        let dispatch = self.controller.force_cancel()?;
        tracing::debug!(target: TARGET, widget = %self.widget_id(), "session torn down");
        self.apply(&dispatch);
        Some(dispatch)
    }

    fn reject_foreign(&self, sample: PointerSample) -> Option<GestureDispatch> {
        match self.active_pointer {
            Some(active) if active != sample.pointer_id => Some(GestureDispatch::ignored(
                self.widget_id(),
                IgnoredReason::PointerMismatch,
            )),
            _ => None,
        }
    }

    fn apply(&mut self, dispatch: &GestureDispatch) {
        for command in &dispatch.commands {
            match *command {
                HostCommand::AttachPointerListeners => {
                    if self.lease.is_none() {
                        self.lease = Some(self.host.acquire_listeners(self.controller.widget_id()));
                    }
                }
                HostCommand::DetachPointerListeners => {
                    self.lease = None;
                }
                HostCommand::SuppressTextSelection(true) => {
                    if self.selection.is_none() {
                        self.selection = Some(self.host.suppress_selection());
                    }
                }
                HostCommand::SuppressTextSelection(false) => {
                    self.selection = None;
                }
                HostCommand::SetCursor(cursor) => {
                    self.host.set_cursor(self.controller.widget_id(), cursor);
                }
            }
        }
        if let Some(offset) = dispatch.visual_offset {
            self.visual_offset = offset;
        }
        if !self.controller.is_active() {
            self.active_pointer = None;
        }
    }
}

impl Drop for WidgetGestureAdapter {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

impl std::fmt::Debug for WidgetGestureAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetGestureAdapter")
            .field("widget", self.widget_id())
            .field("state", self.controller.state())
            .field("active_pointer", &self.active_pointer)
            .field("holds_listeners", &self.lease.is_some())
            .field("visual_offset", &self.visual_offset)
            .finish()
    }
}
