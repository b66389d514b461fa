//! In-progress drawing sessions
//!
//! A [`DrawSession`] collects the vertices of one shape between the first
//! click and completion. Dropping or aborting a session releases everything
//! it holds; nothing is added to the vector source until the session
//! completes.

use crate::geometry::{Geometry, MapCoordinate};

/// Shape kinds that are drawn vertex by vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SketchKind {
    Line,
    Polygon,
    Circle,
}

/// Result of feeding a click to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SketchProgress {
    /// More input is needed
    Continue,
    /// The shape is finished
    Complete(Geometry),
}

/// Vertices collected for one shape
#[derive(Debug, Clone)]
pub struct DrawSession {
    kind: SketchKind,
    vertices: Vec<MapCoordinate>,
    /// Rubber-band position following the pointer
    pointer: Option<MapCoordinate>,
    /// Map-unit distance at which a click snaps onto the first polygon vertex
    snap_tolerance: f64,
}

impl DrawSession {
    /// Start a session with its first vertex
    pub fn start(kind: SketchKind, first: MapCoordinate, snap_tolerance: f64) -> Self {
        Self {
            kind,
            vertices: vec![first],
            pointer: None,
            snap_tolerance,
        }
    }

    pub fn kind(&self) -> SketchKind {
        self.kind
    }

    /// Vertices placed so far
    pub fn vertices(&self) -> &[MapCoordinate] {
        &self.vertices
    }

    /// Current pointer position, if it has moved since the last click
    pub fn pointer(&self) -> Option<MapCoordinate> {
        self.pointer
    }

    /// Track the pointer for the preview segment
    pub fn move_pointer(&mut self, point: MapCoordinate) {
        self.pointer = Some(point);
    }

    /// Feed a click to the session
    pub fn add_vertex(&mut self, point: MapCoordinate) -> SketchProgress {
        self.pointer = None;
        match self.kind {
            SketchKind::Circle => {
                let center = self.vertices[0];
                // A rim click on the center would leave a zero-radius circle
                if center.distance_to(&point) <= self.snap_tolerance {
                    return SketchProgress::Continue;
                }
                SketchProgress::Complete(Geometry::Circle {
                    center,
                    radius: center.distance_to(&point),
                })
            }
            SketchKind::Polygon => {
                let closes = self.vertices.len() >= 3
                    && self.vertices[0].distance_to(&point) <= self.snap_tolerance;
                if closes {
                    SketchProgress::Complete(Geometry::Polygon {
                        rings: vec![std::mem::take(&mut self.vertices)],
                    })
                } else {
                    self.vertices.push(point);
                    SketchProgress::Continue
                }
            }
            SketchKind::Line => {
                self.vertices.push(point);
                SketchProgress::Continue
            }
        }
    }

    /// Finalize with the vertices placed so far
    ///
    /// Returns `None` when there are too few vertices for the shape.
    pub fn finish(self) -> Option<Geometry> {
        match self.kind {
            SketchKind::Line if self.vertices.len() >= 2 => Some(Geometry::LineString {
                coordinates: self.vertices,
            }),
            SketchKind::Polygon if self.vertices.len() >= 3 => Some(Geometry::Polygon {
                rings: vec![self.vertices],
            }),
            _ => None,
        }
    }

    /// Abandon the session
    pub fn abort(self) {
        tracing::debug!(kind = ?self.kind, vertices = self.vertices.len(), "sketch aborted");
    }
}
