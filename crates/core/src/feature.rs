//! Drawn features and the shared vector source
//!
//! Every shape the user draws lives in a single [`VectorSource`]. Features are
//! keyed by a [`FeatureId`] assigned at creation, which is what measurement
//! records and selection refer to.

use crate::geometry::{Geometry, MapCoordinate};
use std::collections::HashMap;

/// Unique identifier for a drawn feature
///
/// Generated using UUID v4, stable for the lifetime of the feature.
pub type FeatureId = uuid::Uuid;

/// A geometry owned by the vector source
#[derive(Debug, Clone)]
pub struct DrawnFeature {
    /// Unique identifier
    id: FeatureId,

    /// Geometry, mutated in place by edit-mode vertex drags
    geometry: Geometry,

    /// Text shown next to point features
    label: Option<String>,

    /// Whether this feature is the most recently clicked one
    selected: bool,
}

impl DrawnFeature {
    /// Create a new feature with generated ID
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: FeatureId::new_v4(),
            geometry,
            label: None,
            selected: false,
        }
    }

    /// Create a text label feature at a position
    pub fn text(position: MapCoordinate, label: impl Into<String>) -> Self {
        Self::new(Geometry::Point { position }).with_label(label)
    }

    /// Attach a text label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the feature ID
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Get the geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Get mutable geometry reference
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Get the label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Check if feature is selected
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Set selection state
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// Feature collection shared by drawing, editing and measuring
#[derive(Debug, Default)]
pub struct VectorSource {
    /// All features indexed by ID
    features: HashMap<FeatureId, DrawnFeature>,

    /// Insertion order; later entries render on top
    order: Vec<FeatureId>,
}

impl VectorSource {
    /// Create a new empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature, returning its ID
    pub fn add(&mut self, feature: DrawnFeature) -> FeatureId {
        let id = feature.id();
        if self.features.insert(id, feature).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Remove a feature by ID
    pub fn remove(&mut self, id: FeatureId) -> Option<DrawnFeature> {
        let feature = self.features.remove(&id)?;
        self.order.retain(|&fid| fid != id);
        Some(feature)
    }

    /// Get a feature by ID
    pub fn get(&self, id: FeatureId) -> Option<&DrawnFeature> {
        self.features.get(&id)
    }

    /// Get a mutable reference to a feature by ID
    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut DrawnFeature> {
        self.features.get_mut(&id)
    }

    /// Iterate features in insertion (render) order
    pub fn iter(&self) -> impl Iterator<Item = &DrawnFeature> {
        self.order.iter().filter_map(|id| self.features.get(id))
    }

    /// Get count of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if source is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Remove every feature
    pub fn clear(&mut self) {
        self.features.clear();
        self.order.clear();
    }

    /// Find the topmost feature under a point
    pub fn feature_at(&self, point: &MapCoordinate, tolerance: f64) -> Option<FeatureId> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.features.get(id))
            .find(|f| f.geometry().hit_test(point, tolerance))
            .map(DrawnFeature::id)
    }

    /// Mark `id` as the only selected feature, or clear the selection
    pub fn select_only(&mut self, id: Option<FeatureId>) {
        for feature in self.features.values_mut() {
            feature.set_selected(Some(feature.id()) == id);
        }
    }

    /// ID of the currently selected feature
    pub fn selected(&self) -> Option<FeatureId> {
        self.iter().find(|f| f.is_selected()).map(DrawnFeature::id)
    }
}
