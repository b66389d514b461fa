//! Pointer input for the map
//!
//! The host translates raw browser/window events into [`PointerEvent`]s
//! before handing them to the mode controller. A click is only reported when
//! the pointer did not drag between press and release.

use mapsketch_core::MapCoordinate;

/// Which button produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button / primary touch
    Primary,
    /// Right button, delivered as a context-menu event
    Secondary,
}

/// A pointer event resolved to map space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position under the pointer in map coordinates
    pub coordinate: MapCoordinate,
    /// Map units per screen pixel at the current zoom
    pub resolution: f64,
}

impl PointerEvent {
    /// Create a pointer event
    pub fn new(coordinate: MapCoordinate, resolution: f64) -> Self {
        Self {
            coordinate,
            resolution,
        }
    }

    /// Event at a map position with one map unit per pixel
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(MapCoordinate::new(x, y), 1.0)
    }

    /// Convert a pixel tolerance to map units at this event's resolution
    pub fn tolerance(&self, pixels: f64) -> f64 {
        pixels * self.resolution.abs()
    }
}

/// What the host should do with the browser's own context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenu {
    /// The event was consumed; suppress the default menu
    Suppress,
    /// Not handled; let the default menu open
    Default,
}

impl ContextMenu {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, ContextMenu::Suppress)
    }
}
