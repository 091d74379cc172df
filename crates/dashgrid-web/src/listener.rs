#![forbid(unsafe_code)]

//! Scoped ownership of the host's global gesture resources.
//!
//! Window-level pointer listeners and the page-wide text-selection switch are
//! the only shared mutable host state. They are modelled as guards:
//!
//! - [`ListenerLease`]: acquiring attaches the widget's move/up/cancel
//!   listeners, dropping detaches them.
//! - [`SelectionSuppressor`]: reference-counted. Selection is disabled when the
//!   first guard is taken and re-enabled when the last one drops, so
//!   concurrent sessions on different widgets cannot re-enable it early.
//!
//! Both guards hold a [`HostHandle`], so release happens on every path
//! including component teardown.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dashgrid_layout::{CursorAffordance, WidgetId};

const TARGET: &str = "dashgrid.host";

/// Side-effect surface of the embedding page.
pub trait ListenerHost {
    /// Register global pointer-move/up/cancel listeners routed to `widget`.
    fn attach(&mut self, widget: &WidgetId);
    /// Remove them again.
    fn detach(&mut self, widget: &WidgetId);
    /// Enable or disable text selection page-wide.
    fn set_text_selection(&mut self, enabled: bool);
    fn set_cursor(&mut self, widget: &WidgetId, cursor: CursorAffordance);
}

struct HostInner {
    host: Box<dyn ListenerHost>,
    attached: Vec<WidgetId>,
    selection_holds: usize,
}

/// Shared handle to a [`ListenerHost`]. Clones refer to the same host.
///
/// Single-threaded by construction (UI main thread).
#[derive(Clone)]
pub struct HostHandle {
    inner: Rc<RefCell<HostInner>>,
}

impl HostHandle {
    #[must_use]
    pub fn new(host: impl ListenerHost + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HostInner {
                host: Box::new(host),
                attached: Vec::new(),
                selection_holds: 0,
            })),
        }
    }

    /// Attach listeners for `widget` until the lease drops.
    #[must_use]
    pub fn acquire_listeners(&self, widget: &WidgetId) -> ListenerLease {
        {
            let mut inner = self.inner.borrow_mut();
            inner.host.attach(widget);
            inner.attached.push(widget.clone());
        }
        tracing::trace!(target: TARGET, widget = %widget, "listeners attached");
        ListenerLease {
            handle: self.clone(),
            widget: widget.clone(),
        }
    }

    /// Disable text selection until the guard drops.
    #[must_use]
    pub fn suppress_selection(&self) -> SelectionSuppressor {
        let mut inner = self.inner.borrow_mut();
        inner.selection_holds += 1;
        if inner.selection_holds == 1 {
            inner.host.set_text_selection(false);
        }
        drop(inner);
        SelectionSuppressor {
            handle: self.clone(),
        }
    }

    pub fn set_cursor(&self, widget: &WidgetId, cursor: CursorAffordance) {
        self.inner.borrow_mut().host.set_cursor(widget, cursor);
    }

    /// Widgets whose listeners are currently attached, in acquisition order.
    #[must_use]
    pub fn attached(&self) -> Vec<WidgetId> {
        self.inner.borrow().attached.clone()
    }

    #[must_use]
    pub fn is_selection_suppressed(&self) -> bool {
        self.inner.borrow().selection_holds > 0
    }

    fn release_listeners(&self, widget: &WidgetId) {
        let mut inner = self.inner.borrow_mut();
        inner.host.detach(widget);
        if let Some(pos) = inner.attached.iter().position(|w| w == widget) {
            inner.attached.remove(pos);
        }
        drop(inner);
        tracing::trace!(target: TARGET, widget = %widget, "listeners detached");
    }

    fn release_selection(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.selection_holds = inner.selection_holds.saturating_sub(1);
        if inner.selection_holds == 0 {
            inner.host.set_text_selection(true);
        }
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HostHandle")
            .field("attached", &inner.attached)
            .field("selection_holds", &inner.selection_holds)
            .finish()
    }
}

/// RAII registration of one widget's global pointer listeners.
#[must_use = "dropping the lease detaches the listeners"]
pub struct ListenerLease {
    handle: HostHandle,
    widget: WidgetId,
}

impl ListenerLease {
    #[must_use]
    pub fn widget(&self) -> &WidgetId {
        &self.widget
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.handle.release_listeners(&self.widget);
    }
}

impl fmt::Debug for ListenerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerLease")
            .field("widget", &self.widget)
            .finish()
    }
}

/// Reference-counted text-selection suppression.
#[must_use = "dropping the guard may re-enable text selection"]
pub struct SelectionSuppressor {
    handle: HostHandle,
}

impl Drop for SelectionSuppressor {
    fn drop(&mut self) {
        self.handle.release_selection();
    }
}

impl fmt::Debug for SelectionSuppressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSuppressor").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording host
// ─────────────────────────────────────────────────────────────────────────────

/// One call made on a [`ListenerHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostCall {
    Attach(WidgetId),
    Detach(WidgetId),
    TextSelection(bool),
    Cursor(WidgetId, CursorAffordance),
}

/// Host that records every call. Clones share the log.
///
/// Useful for headless hosts and for replaying what a page would have done.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }
}

impl ListenerHost for RecordingHost {
    fn attach(&mut self, widget: &WidgetId) {
        self.calls.borrow_mut().push(HostCall::Attach(widget.clone()));
    }

    fn detach(&mut self, widget: &WidgetId) {
        self.calls.borrow_mut().push(HostCall::Detach(widget.clone()));
    }

    fn set_text_selection(&mut self, enabled: bool) {
        self.calls.borrow_mut().push(HostCall::TextSelection(enabled));
    }

    fn set_cursor(&mut self, widget: &WidgetId, cursor: CursorAffordance) {
        self.calls
            .borrow_mut()
            .push(HostCall::Cursor(widget.clone(), cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> WidgetId {
        WidgetId::new(s)
    }

    #[test]
    fn lease_detaches_on_drop() {
        let recorder = RecordingHost::new();
        let handle = HostHandle::new(recorder.clone());
        let lease = handle.acquire_listeners(&id("a"));
        assert_eq!(handle.attached(), vec![id("a")]);
        drop(lease);
        assert!(handle.attached().is_empty());
        assert_eq!(
            recorder.calls(),
            vec![HostCall::Attach(id("a")), HostCall::Detach(id("a"))]
        );
    }

    #[test]
    fn selection_restored_only_after_last_guard() {
        let recorder = RecordingHost::new();
        let handle = HostHandle::new(recorder.clone());
        let first = handle.suppress_selection();
        let second = handle.suppress_selection();
        drop(first);
        assert!(handle.is_selection_suppressed());
        drop(second);
        assert!(!handle.is_selection_suppressed());
        assert_eq!(
            recorder.calls(),
            vec![HostCall::TextSelection(false), HostCall::TextSelection(true)]
        );
    }

    #[test]
    fn cursor_passes_through() {
        let recorder = RecordingHost::new();
        let handle = HostHandle::new(recorder.clone());
        handle.set_cursor(&id("a"), CursorAffordance::Grabbing);
        assert_eq!(
            recorder.take(),
            vec![HostCall::Cursor(id("a"), CursorAffordance::Grabbing)]
        );
        assert!(recorder.calls().is_empty());
    }
}
