#![forbid(unsafe_code)]

//! `dashgrid-web` connects the dashgrid engine to an embedding page.
//!
//! Design goals:
//! - **Host-driven I/O**: the page pushes pointer samples and container
//!   measurements; side effects come back as calls on a [`ListenerHost`].
//! - **Scoped host resources**: global listeners and text-selection
//!   suppression are guards, released on every session end including drop.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! This crate does not bind to `wasm-bindgen`; a thin JS shim implements
//! [`ListenerHost`] and forwards DOM events.

pub mod adapter;
pub mod container;
pub mod listener;
pub mod pointer;

pub use adapter::WidgetGestureAdapter;
pub use container::{
    GridArea, GridContainer, GridFrame, GridTemplate, RenderedWidget, StaticCatalog, WidgetContext,
};
pub use listener::{
    HostCall, HostHandle, ListenerHost, ListenerLease, RecordingHost, SelectionSuppressor,
};
pub use pointer::{MOUSE_POINTER_ID, PointerSample, TouchPoint};
