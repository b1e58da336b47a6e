// SPDX-License-Identifier: PMPL-1.0-or-later
//! The feature datasource the dialog queries.

use std::collections::HashMap;

use async_trait::async_trait;
use geoclause_builder::FeatureTypeDef;
use geoclause_predicate::Predicate;
use geoclause_spatial::FeatureGeometry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DatasourceError;

/// A feature returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<FeatureGeometry>,
}

impl Feature {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: Map::new(),
            geometry: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: FeatureGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

/// Options passed with a feature query. Serializes as `{"predicate": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuery {
    pub predicate: Predicate,
}

impl FeatureQuery {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }
}

/// Remote feature source.
///
/// Implementations must be `Send + Sync` so a dialog can be shared across
/// Tokio tasks.
#[async_trait]
pub trait FeatureDatasource: Send + Sync {
    /// Features of `feature_type` matching `query.predicate`.
    async fn get_features(
        &self,
        feature_type: &str,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, DatasourceError>;

    /// Field metadata for each requested feature type, keyed by name.
    async fn dd_info_for(
        &self,
        feature_types: &[String],
    ) -> Result<HashMap<String, FeatureTypeDef>, DatasourceError>;
}
