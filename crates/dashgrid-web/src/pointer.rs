#![forbid(unsafe_code)]

//! Pointer and touch input normalisation.
//!
//! Mouse, pen and touch all reduce to a [`PointerSample`]: one pointer id and
//! one viewport position. Multi-touch is flattened to the first touch point.

use dashgrid_layout::PixelPoint;

/// Pointer id used for mouse input, matching the browser's convention.
pub const MOUSE_POINTER_ID: u32 = 1;

/// One entry of a touch list, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchPoint {
    pub identifier: u32,
    pub client_x: f64,
    pub client_y: f64,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(identifier: u32, client_x: f64, client_y: f64) -> Self {
        Self {
            identifier,
            client_x,
            client_y,
        }
    }

    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        PixelPoint::new(self.client_x, self.client_y)
    }
}

/// Normalised pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerSample {
    pub pointer_id: u32,
    pub position: PixelPoint,
}

impl PointerSample {
    #[must_use]
    pub const fn new(pointer_id: u32, position: PixelPoint) -> Self {
        Self {
            pointer_id,
            position,
        }
    }

    /// Mouse input at viewport `(x, y)`.
    #[must_use]
    pub const fn mouse(x: f64, y: f64) -> Self {
        Self::new(MOUSE_POINTER_ID, PixelPoint::new(x, y))
    }

    /// Position of the first touch point, if any.
    ///
    /// Non-finite coordinates are rejected.
    #[must_use]
    pub fn from_touches(touches: &[TouchPoint]) -> Option<PixelPoint> {
        Self::first_touch(touches).map(|sample| sample.position)
    }

    /// Sample for the first touch point, keeping its identifier as the
    /// pointer id.
    #[must_use]
    pub fn first_touch(touches: &[TouchPoint]) -> Option<Self> {
        let first = touches.first()?;
        let position = first.position();
        position
            .is_finite()
            .then(|| Self::new(first.identifier, position))
    }

    /// Whether the coordinates are usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
    }
}
