// SPDX-License-Identifier: PMPL-1.0-or-later
//! Spatial filter row: "within current map view" and "within selection".

use geoclause_predicate::Predicate;
use geoclause_spatial::{BoundingBox, FeatureGeometry};
use serde::{Deserialize, Serialize};

use crate::metadata::FeatureTypeDef;

/// Map state the spatial filter reads when a query runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    /// Visible map extent.
    pub viewport: Option<BoundingBox>,
    /// Geometry of the single selected feature, if exactly one is selected.
    pub current_feature: Option<FeatureGeometry>,
    /// Geometries of every selected feature.
    #[serde(default)]
    pub selection: Vec<FeatureGeometry>,
}

/// Two checkboxes producing an optional `intersects` predicate on the
/// feature type's primary geometry field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeomClauseView {
    geom_field: Option<String>,
    within_viewport: bool,
    within_selection: bool,
}

impl GeomClauseView {
    pub fn new(feature_type: &FeatureTypeDef) -> Self {
        Self {
            geom_field: feature_type.primary_geom_name.clone(),
            within_viewport: false,
            within_selection: false,
        }
    }

    pub fn geom_field(&self) -> Option<&str> {
        self.geom_field.as_deref()
    }

    pub fn within_viewport(&self) -> bool {
        self.within_viewport
    }

    pub fn within_selection(&self) -> bool {
        self.within_selection
    }

    pub fn set_within_viewport(&mut self, checked: bool) {
        self.within_viewport = checked;
    }

    pub fn set_within_selection(&mut self, checked: bool) {
        self.within_selection = checked;
    }

    /// The selection checkbox is only enabled for a polygonal current feature.
    pub fn selection_enabled(&self, map: &MapState) -> bool {
        self.geom_field.is_some()
            && map
                .current_feature
                .as_ref()
                .is_some_and(|g| g.geometry_type().is_polygonal())
    }

    /// `viewport AND (sel_1 OR sel_2 ...)`, either side optional. `None` when
    /// nothing is checked or applicable.
    pub fn value(&self, map: &MapState) -> Option<Predicate> {
        let field = self.geom_field.as_deref()?;

        let viewport = match (self.within_viewport, &map.viewport) {
            (true, Some(bounds)) => Some(Predicate::intersects(field, bounds)),
            _ => None,
        };

        let selection = if self.within_selection && self.selection_enabled(map) {
            let mut parts = map
                .selection
                .iter()
                .map(|geometry| Predicate::intersects(field, geometry.to_geojson()));
            parts.next().map(|first| Predicate::or_all(first, parts))
        } else {
            None
        };

        match (viewport, selection) {
            (Some(viewport), Some(selection)) => Some(viewport.and(&selection)),
            (viewport, selection) => viewport.or(selection),
        }
    }
}
