//! Measurement engine
//!
//! Reduces a drawn geometry to a scalar (length in meters or area in square
//! meters), formats it with unit auto-scaling and keeps one on-map overlay per
//! measured feature. Clicking a measured feature again hides its overlay;
//! records only go away through [`MeasurementEngine::clear_all`].

use crate::feature::{DrawnFeature, FeatureId};
use crate::geometry::{Geometry, GeometryKind, MapCoordinate};
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for an overlay element
pub type OverlayId = uuid::Uuid;

/// Distances at or above this many meters are shown in kilometers
const KILOMETER: f64 = 1_000.0;

/// Areas at or above this many square meters are shown in square kilometers
const SQUARE_KILOMETER: f64 = 1_000_000.0;

/// Type of measurement being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureKind {
    /// Path length, perimeter or circumference
    Distance,
    /// Enclosed area
    Area,
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureKind::Distance => f.write_str("distance"),
            MeasureKind::Area => f.write_str("area"),
        }
    }
}

/// Why a geometry could not be measured
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeasureError {
    #[error("cannot measure {kind} of a {geometry}")]
    Unsupported {
        kind: MeasureKind,
        geometry: GeometryKind,
    },

    #[error("cannot measure area: lines have no area")]
    LineHasNoArea,
}

/// Total length of a line, perimeter of a polygon (holes included) or
/// circumference of a circle
pub fn compute_distance(geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::LineString { .. } => geometry.length(),
        Geometry::Polygon { .. } => geometry.perimeter(),
        Geometry::Circle { radius, .. } => Some(2.0 * std::f64::consts::PI * radius),
        Geometry::Point { .. } => None,
    }
}

/// Planar area of a polygon (outer boundary minus holes) or a circle
pub fn compute_area(geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::Polygon { .. } | Geometry::Circle { .. } => geometry.area(),
        Geometry::LineString { .. } | Geometry::Point { .. } => None,
    }
}

/// Measure a geometry, distinguishing lines from unsupported kinds
pub fn measure(kind: MeasureKind, geometry: &Geometry) -> Result<f64, MeasureError> {
    let value = match kind {
        MeasureKind::Distance => compute_distance(geometry),
        MeasureKind::Area => compute_area(geometry),
    };
    value.ok_or(match (kind, geometry.kind()) {
        (MeasureKind::Area, GeometryKind::LineString) => MeasureError::LineHasNoArea,
        (kind, geometry) => MeasureError::Unsupported { kind, geometry },
    })
}

/// Format a distance in meters: whole meters below 1 km, else km to 2 decimals
pub fn format_distance(meters: f64) -> String {
    if meters < KILOMETER {
        format!("{}m", meters.round())
    } else {
        format!("{:.2}km", round_half_up(meters / KILOMETER))
    }
}

/// Format an area in square meters: m² below 1 km², else km², both to 2 decimals
pub fn format_area(square_meters: f64) -> String {
    if square_meters < SQUARE_KILOMETER {
        format!("{:.2} m²", round_half_up(square_meters))
    } else {
        format!("{:.2} km²", round_half_up(square_meters / SQUARE_KILOMETER))
    }
}

/// Round to two decimals with ties away from zero
fn round_half_up(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a value for the given measurement kind
pub fn format_measurement(kind: MeasureKind, value: f64) -> String {
    match kind {
        MeasureKind::Distance => format_distance(value),
        MeasureKind::Area => format_area(value),
    }
}

/// Compute where the overlay for a measurement should be anchored
///
/// Distance labels sit toward the top of the shape and area labels toward
/// the bottom so both can be shown at once. Combinations without a dedicated
/// anchor fall back to the click position.
pub fn anchor_position(
    kind: MeasureKind,
    geometry: &Geometry,
    click: MapCoordinate,
) -> MapCoordinate {
    match (kind, geometry) {
        // Middle vertex by index, not by arc length
        (MeasureKind::Distance, Geometry::LineString { coordinates }) => coordinates
            .get(coordinates.len() / 2)
            .copied()
            .unwrap_or(click),

        (MeasureKind::Distance, Geometry::Polygon { .. }) => match geometry.extent() {
            Some(extent) => {
                MapCoordinate::new(extent.center_x(), extent.max_y - extent.height() * 0.1)
            }
            None => click,
        },

        (MeasureKind::Distance, Geometry::Circle { center, radius }) => {
            MapCoordinate::new(center.x, center.y + radius * 0.7)
        }

        (MeasureKind::Area, Geometry::Polygon { .. }) => match geometry.extent() {
            Some(extent) => {
                MapCoordinate::new(extent.center_x(), extent.min_y + extent.height() * 0.3)
            }
            None => click,
        },

        (MeasureKind::Area, Geometry::Circle { center, radius }) => {
            MapCoordinate::new(center.x, center.y - radius * 0.3)
        }

        _ => click,
    }
}

/// How an overlay element is placed relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    BottomCenter,
    TopCenter,
}

/// Presentation options fixed when an overlay is created
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayOptions {
    pub positioning: Positioning,
    /// Pixel offset from the anchor
    pub offset: (i32, i32),
    /// CSS class of the overlay element
    pub class_name: &'static str,
}

impl OverlayOptions {
    /// Options used for a measurement of the given kind
    pub fn for_kind(kind: MeasureKind) -> Self {
        match kind {
            MeasureKind::Distance => Self {
                positioning: Positioning::BottomCenter,
                offset: (0, -10),
                class_name: "measurement-popup",
            },
            MeasureKind::Area => Self {
                positioning: Positioning::TopCenter,
                offset: (0, 10),
                class_name: "measurement-popup area-measurement",
            },
        }
    }
}

/// Map overlay showing a measurement result
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    id: OverlayId,
    /// Anchor on the map, `None` while hidden
    position: Option<MapCoordinate>,
    content: String,
    options: OverlayOptions,
}

impl Overlay {
    fn new(options: OverlayOptions) -> Self {
        Self {
            id: OverlayId::new_v4(),
            position: None,
            content: String::new(),
            options,
        }
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn position(&self) -> Option<MapCoordinate> {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn options(&self) -> &OverlayOptions {
        &self.options
    }

    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }
}

/// The map's overlay layer
///
/// Implemented by the host that renders overlays; the engine is its only
/// caller.
pub trait OverlayHost {
    /// A new overlay was created
    fn add_overlay(&mut self, overlay: &Overlay);
    /// Position or content of an existing overlay changed
    fn update_overlay(&mut self, overlay: &Overlay);
    /// The overlay was destroyed
    fn remove_overlay(&mut self, id: OverlayId);
}

/// Host that does not render anything
#[derive(Debug, Default)]
pub struct DetachedOverlays;

impl OverlayHost for DetachedOverlays {
    fn add_overlay(&mut self, _overlay: &Overlay) {}
    fn update_overlay(&mut self, _overlay: &Overlay) {}
    fn remove_overlay(&mut self, _id: OverlayId) {}
}

/// Association between a measured feature and its overlay
#[derive(Debug, Clone)]
pub struct MeasurementRecord {
    feature: FeatureId,
    /// Kind of the last measurement shown
    kind: MeasureKind,
    /// Last computed value in meters or square meters
    value: f64,
    overlay: Overlay,
}

impl MeasurementRecord {
    pub fn feature(&self) -> FeatureId {
        self.feature
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn is_visible(&self) -> bool {
        self.overlay.is_visible()
    }
}

/// Result of toggling a feature's measurement display
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureOutcome {
    /// The overlay is now visible with this text
    Shown { overlay: OverlayId, text: String },
    /// A visible overlay was hidden
    Hidden,
    /// The geometry cannot be measured this way
    NotMeasurable(MeasureError),
}

impl MeasureOutcome {
    /// Message for the status area
    pub fn status_message(&self, kind: MeasureKind) -> String {
        match self {
            MeasureOutcome::Shown { text, .. } => match kind {
                MeasureKind::Distance => format!("Distance measured: {text}"),
                MeasureKind::Area => format!("Area measured: {text}"),
            },
            MeasureOutcome::Hidden => "Measurement hidden".to_string(),
            MeasureOutcome::NotMeasurable(MeasureError::LineHasNoArea) => {
                "Cannot measure area of this shape (lines have no area)".to_string()
            }
            MeasureOutcome::NotMeasurable(MeasureError::Unsupported { kind, .. }) => {
                format!("Cannot measure {kind} of this shape")
            }
        }
    }
}

/// Owns the feature → overlay registry
pub struct MeasurementEngine {
    records: HashMap<FeatureId, MeasurementRecord>,
    host: Box<dyn OverlayHost>,
}

impl MeasurementEngine {
    /// Create an engine rendering through `host`
    pub fn new(host: Box<dyn OverlayHost>) -> Self {
        Self {
            records: HashMap::new(),
            host,
        }
    }

    /// Create an engine with no rendering host
    pub fn detached() -> Self {
        Self::new(Box::new(DetachedOverlays))
    }

    /// Show or hide the measurement of `feature`
    ///
    /// A visible overlay is hidden and its record kept. Otherwise the value is
    /// computed, and the feature's overlay (created on first use) is updated
    /// and placed at the anchor for `kind`.
    pub fn toggle_display(
        &mut self,
        feature: &DrawnFeature,
        click: MapCoordinate,
        kind: MeasureKind,
    ) -> MeasureOutcome {
        let id = feature.id();

        if let Some(record) = self.records.get_mut(&id) {
            if record.overlay.is_visible() {
                record.overlay.position = None;
                self.host.update_overlay(&record.overlay);
                tracing::debug!(feature = %id, "measurement hidden");
                return MeasureOutcome::Hidden;
            }
        }

        let value = match measure(kind, feature.geometry()) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(feature = %id, %error, "geometry not measurable");
                return MeasureOutcome::NotMeasurable(error);
            }
        };
        let text = format_measurement(kind, value);
        let position = anchor_position(kind, feature.geometry(), click);

        let host = &mut self.host;
        let record = self.records.entry(id).or_insert_with(|| {
            let overlay = Overlay::new(OverlayOptions::for_kind(kind));
            host.add_overlay(&overlay);
            MeasurementRecord {
                feature: id,
                kind,
                value,
                overlay,
            }
        });
        record.kind = kind;
        record.value = value;
        record.overlay.content = text.clone();
        record.overlay.position = Some(position);
        self.host.update_overlay(&record.overlay);

        tracing::debug!(feature = %id, %kind, value, "measurement shown");
        MeasureOutcome::Shown {
            overlay: record.overlay.id,
            text,
        }
    }

    /// Hide every overlay, keeping all records
    pub fn hide_all(&mut self) {
        for record in self.records.values_mut() {
            if record.overlay.is_visible() {
                record.overlay.position = None;
                self.host.update_overlay(&record.overlay);
            }
        }
    }

    /// Remove every overlay from the map and drop all records
    ///
    /// Returns the number of records destroyed.
    pub fn clear_all(&mut self) -> usize {
        let count = self.records.len();
        for (_, record) in self.records.drain() {
            self.host.remove_overlay(record.overlay.id);
        }
        tracing::debug!(count, "measurements cleared");
        count
    }

    /// Get the record for a feature
    pub fn record(&self, feature: FeatureId) -> Option<&MeasurementRecord> {
        self.records.get(&feature)
    }

    /// Iterate over all records
    pub fn records(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.records.values()
    }

    /// Get total count of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of overlays currently shown
    pub fn visible_count(&self) -> usize {
        self.records.values().filter(|r| r.is_visible()).count()
    }
}

impl Default for MeasurementEngine {
    fn default() -> Self {
        Self::detached()
    }
}

impl fmt::Debug for MeasurementEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementEngine")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f64::consts::PI;
    use std::rc::Rc;

    fn c(x: f64, y: f64) -> MapCoordinate {
        MapCoordinate::new(x, y)
    }

    #[derive(Debug, Clone, PartialEq)]
    enum HostCall {
        Add(OverlayId),
        Update(OverlayId, Option<MapCoordinate>),
        Remove(OverlayId),
    }

    #[derive(Clone, Default)]
    struct RecordingHost(Rc<RefCell<Vec<HostCall>>>);

    impl OverlayHost for RecordingHost {
        fn add_overlay(&mut self, overlay: &Overlay) {
            self.0.borrow_mut().push(HostCall::Add(overlay.id()));
        }

        fn update_overlay(&mut self, overlay: &Overlay) {
            self.0
                .borrow_mut()
                .push(HostCall::Update(overlay.id(), overlay.position()));
        }

        fn remove_overlay(&mut self, id: OverlayId) {
            self.0.borrow_mut().push(HostCall::Remove(id));
        }
    }

    fn square_polygon() -> Geometry {
        Geometry::Polygon {
            rings: vec![vec![c(0.0, 0.0), c(100.0, 0.0), c(100.0, 50.0), c(0.0, 50.0)]],
        }
    }

    #[test]
    fn test_distance_of_line() {
        let line = Geometry::LineString {
            coordinates: vec![c(0.0, 0.0), c(3.0, 0.0), c(3.0, 4.0)],
        };
        assert_eq!(compute_distance(&line), Some(7.0));
        assert_eq!(compute_area(&line), None);
    }

    #[test]
    fn test_circle_distance_and_area() {
        let circle = Geometry::Circle { center: c(0.0, 0.0), radius: 10.0 };
        assert!((compute_area(&circle).unwrap() - 100.0 * PI).abs() < 1e-9);
        assert!((compute_distance(&circle).unwrap() - 20.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_distance_includes_holes() {
        let polygon = Geometry::Polygon {
            rings: vec![
                vec![c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 10.0)],
                vec![c(2.0, 2.0), c(4.0, 2.0), c(4.0, 4.0), c(2.0, 4.0)],
            ],
        };
        assert_eq!(compute_distance(&polygon), Some(48.0));
        assert_eq!(compute_area(&polygon), Some(96.0));
    }

    #[test]
    fn test_point_is_not_measurable() {
        let point = Geometry::Point { position: c(1.0, 1.0) };
        assert_eq!(compute_distance(&point), None);
        assert_eq!(
            measure(MeasureKind::Distance, &point),
            Err(MeasureError::Unsupported {
                kind: MeasureKind::Distance,
                geometry: GeometryKind::Point,
            })
        );
    }

    #[test]
    fn test_line_area_has_its_own_error() {
        let line = Geometry::LineString { coordinates: vec![c(0.0, 0.0), c(1.0, 0.0)] };
        assert_eq!(measure(MeasureKind::Area, &line), Err(MeasureError::LineHasNoArea));
        let point = Geometry::Point { position: c(0.0, 0.0) };
        assert_ne!(measure(MeasureKind::Area, &point), Err(MeasureError::LineHasNoArea));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(12.4), "12m");
        assert_eq!(format_distance(12.5), "13m");
        assert_eq!(format_distance(1000.0), "1.00km");
        assert_eq!(format_distance(12_500.0), "12.50km");
        assert_eq!(format_distance(1125.0), "1.13km");
    }

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(999_999.0), "999999.00 m²");
        assert_eq!(format_area(1_000_000.0), "1.00 km²");
        assert_eq!(format_area(12.5), "12.50 m²");
        assert_eq!(format_area(2_500_000.0), "2.50 km²");
        assert_eq!(format_area(1_125_000.0), "1.13 km²");
        assert_eq!(format_area(0.125), "0.13 m²");
    }

    #[test]
    fn test_anchor_positions() {
        let click = c(-1.0, -1.0);

        let line = Geometry::LineString {
            coordinates: vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(100.0, 0.0)],
        };
        assert_eq!(anchor_position(MeasureKind::Distance, &line, click), c(2.0, 0.0));

        let polygon = square_polygon();
        assert_eq!(anchor_position(MeasureKind::Distance, &polygon, click), c(50.0, 45.0));
        assert_eq!(anchor_position(MeasureKind::Area, &polygon, click), c(50.0, 15.0));

        let circle = Geometry::Circle { center: c(10.0, 10.0), radius: 10.0 };
        assert_eq!(anchor_position(MeasureKind::Distance, &circle, click), c(10.0, 17.0));
        assert_eq!(anchor_position(MeasureKind::Area, &circle, click), c(10.0, 7.0));
    }

    #[test]
    fn test_anchor_falls_back_to_click() {
        let click = c(3.0, 4.0);
        let point = Geometry::Point { position: c(0.0, 0.0) };
        assert_eq!(anchor_position(MeasureKind::Distance, &point, click), click);
        let line = Geometry::LineString { coordinates: vec![c(0.0, 0.0), c(1.0, 0.0)] };
        assert_eq!(anchor_position(MeasureKind::Area, &line, click), click);
        let empty = Geometry::LineString { coordinates: Vec::new() };
        assert_eq!(anchor_position(MeasureKind::Distance, &empty, click), click);
    }

    #[test]
    fn test_toggle_shows_then_hides_same_overlay() {
        let host = RecordingHost::default();
        let mut engine = MeasurementEngine::new(Box::new(host.clone()));
        let feature = DrawnFeature::new(square_polygon());

        let first = engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Distance);
        let MeasureOutcome::Shown { overlay: shown_id, text } = first else {
            panic!("expected overlay to be shown");
        };
        assert_eq!(text, "300m");

        assert_eq!(
            engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Distance),
            MeasureOutcome::Hidden
        );
        let record = engine.record(feature.id()).unwrap();
        assert_eq!(record.overlay().id(), shown_id);
        assert!(!record.is_visible());

        let calls = host.0.borrow();
        assert_eq!(calls.iter().filter(|c| matches!(c, HostCall::Add(_))).count(), 1);
        assert_eq!(calls.last(), Some(&HostCall::Update(shown_id, None)));
    }

    #[test]
    fn test_reshow_reuses_record() {
        let mut engine = MeasurementEngine::detached();
        let feature = DrawnFeature::new(square_polygon());

        let first = engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Area);
        engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Area);
        let third = engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Area);
        assert_eq!(first, third);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.visible_count(), 1);
    }

    #[test]
    fn test_clear_all_destroys_records() {
        let host = RecordingHost::default();
        let mut engine = MeasurementEngine::new(Box::new(host.clone()));
        let feature = DrawnFeature::new(square_polygon());

        let MeasureOutcome::Shown { overlay: before, .. } =
            engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Distance)
        else {
            panic!("expected overlay to be shown");
        };
        assert_eq!(engine.clear_all(), 1);
        assert!(engine.is_empty());
        assert!(host.0.borrow().contains(&HostCall::Remove(before)));

        let MeasureOutcome::Shown { overlay: after, .. } =
            engine.toggle_display(&feature, c(0.0, 0.0), MeasureKind::Distance)
        else {
            panic!("expected overlay to be shown");
        };
        assert_ne!(before, after);
    }

    #[test]
    fn test_not_measurable_creates_no_record() {
        let mut engine = MeasurementEngine::detached();
        let line = DrawnFeature::new(Geometry::LineString {
            coordinates: vec![c(0.0, 0.0), c(10.0, 0.0)],
        });
        let outcome = engine.toggle_display(&line, c(0.0, 0.0), MeasureKind::Area);
        assert_eq!(outcome, MeasureOutcome::NotMeasurable(MeasureError::LineHasNoArea));
        assert!(engine.record(line.id()).is_none());
        assert_eq!(
            outcome.status_message(MeasureKind::Area),
            "Cannot measure area of this shape (lines have no area)"
        );
    }

    #[test]
    fn test_hide_all_keeps_records() {
        let mut engine = MeasurementEngine::detached();
        let a = DrawnFeature::new(square_polygon());
        let b = DrawnFeature::new(Geometry::Circle { center: c(0.0, 0.0), radius: 5.0 });
        engine.toggle_display(&a, c(0.0, 0.0), MeasureKind::Distance);
        engine.toggle_display(&b, c(0.0, 0.0), MeasureKind::Distance);
        assert_eq!(engine.visible_count(), 2);

        engine.hide_all();
        assert_eq!(engine.visible_count(), 0);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_overlay_options_per_kind() {
        let distance = OverlayOptions::for_kind(MeasureKind::Distance);
        assert_eq!(distance.positioning, Positioning::BottomCenter);
        assert_eq!(distance.offset, (0, -10));
        let area = OverlayOptions::for_kind(MeasureKind::Area);
        assert_eq!(area.positioning, Positioning::TopCenter);
        assert_eq!(area.class_name, "measurement-popup area-measurement");
    }
}
