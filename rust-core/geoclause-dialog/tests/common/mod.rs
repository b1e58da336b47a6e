// SPDX-License-Identifier: PMPL-1.0-or-later
//! In-memory datasource for dialog tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use geoclause_builder::{BaseType, FeatureTypeDef, FieldDef};
use geoclause_dialog::{DatasourceError, Feature, FeatureDatasource, FeatureQuery};
use tokio::sync::Notify;

/// How a mock query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Server(u16),
    Unauthorized,
}

/// Returns canned features per feature type and records every query as it
/// arrived over the wire.
///
/// With `gated`, each `get_features` call signals `started` and then waits
/// for `release` before answering.
#[derive(Default)]
pub struct MockDatasource {
    pub metadata: HashMap<String, FeatureTypeDef>,
    pub features: HashMap<String, Vec<Feature>>,
    pub failure: Option<Failure>,
    pub gated: bool,
    pub started: Notify,
    pub release: Notify,
    queries: Mutex<Vec<(String, FeatureQuery)>>,
}

impl MockDatasource {
    pub fn new() -> Self {
        let pole = FeatureTypeDef::new(
            "pole",
            vec![
                FieldDef::new("status", BaseType::String).with_enum(["ok", "faulty"]),
                FieldDef::new("height", BaseType::Numeric),
                FieldDef::new("location", BaseType::Other),
            ],
        )
        .with_primary_geom("location");
        let cable = FeatureTypeDef::new("cable", vec![FieldDef::new("length", BaseType::Double)]);

        let poles = vec![
            Feature::new("pole/1").with_property("status", "faulty").with_property("height", 12),
            Feature::new("pole/2").with_property("status", "faulty").with_property("height", 14),
        ];

        Self {
            metadata: [("pole".to_string(), pole), ("cable".to_string(), cable)].into(),
            features: [("pole".to_string(), poles), ("cable".to_string(), Vec::new())].into(),
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(Failure::Server(status)),
            ..Self::new()
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            failure: Some(Failure::Unauthorized),
            ..Self::new()
        }
    }

    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::new()
        }
    }

    pub fn gated_failing(status: u16) -> Self {
        Self {
            gated: true,
            ..Self::failing(status)
        }
    }

    pub fn queries(&self) -> Vec<(String, FeatureQuery)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeatureDatasource for MockDatasource {
    async fn get_features(
        &self,
        feature_type: &str,
        query: &FeatureQuery,
    ) -> Result<Vec<Feature>, DatasourceError> {
        let wire = serde_json::to_string(query)?;
        let received: FeatureQuery = serde_json::from_str(&wire)?;
        self.queries
            .lock()
            .unwrap()
            .push((feature_type.to_string(), received));
        if self.gated {
            self.started.notify_one();
            self.release.notified().await;
        }
        match self.failure {
            Some(Failure::Server(status)) => {
                return Err(DatasourceError::Server {
                    status,
                    message: "query engine unavailable".into(),
                })
            }
            Some(Failure::Unauthorized) => {
                return Err(DatasourceError::Unauthorized("session expired".into()))
            }
            None => {}
        }
        self.features
            .get(feature_type)
            .cloned()
            .ok_or_else(|| DatasourceError::NotFound(feature_type.to_string()))
    }

    async fn dd_info_for(
        &self,
        feature_types: &[String],
    ) -> Result<HashMap<String, FeatureTypeDef>, DatasourceError> {
        Ok(feature_types
            .iter()
            .filter_map(|name| self.metadata.get(name).map(|def| (name.clone(), def.clone())))
            .collect())
    }
}
