//! Map Sketch Core Library
//!
//! Geometry, the shared feature collection, drawing sessions and the
//! measurement engine behind the map drawing tools.

pub mod config;
pub mod draw;
pub mod feature;
pub mod geometry;
pub mod measurement;
pub mod status;

pub use config::{ConfigError, ToolsConfig};
pub use draw::{DrawSession, SketchKind, SketchProgress};
pub use feature::{DrawnFeature, FeatureId, VectorSource};
pub use geometry::{Extent, Geometry, GeometryKind, MapCoordinate, VertexHandle};
pub use measurement::{
    anchor_position, compute_area, compute_distance, format_area, format_distance, measure,
    DetachedOverlays, MeasureError, MeasureKind, MeasureOutcome, MeasurementEngine,
    MeasurementRecord, Overlay, OverlayHost, OverlayId, OverlayOptions, Positioning,
};
pub use status::{StatusLog, StatusSink};
