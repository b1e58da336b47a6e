// SPDX-License-Identifier: PMPL-1.0-or-later
//! Ad-hoc query dialog.
//!
//! Owns the clause tree and spatial filter for one feature type, runs the
//! combined predicate against a [`FeatureDatasource`] and keeps the result as
//! the current feature set.
//!
//! All methods take `&self`; the dialog can be shared through an `Arc`. At
//! most one query runs at a time unless the config allows more, and a
//! response that outlives a feature-type change or predicate reload is
//! dropped instead of applied.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use geoclause_builder::{BranchPath, ClauseTree, FeatureTypeDef, GeomClauseView, MapState};
use geoclause_predicate::Predicate;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{DialogConfig, Layout};
use crate::datasource::{Feature, FeatureDatasource, FeatureQuery};
use crate::error::{DatasourceError, DialogError, Result};

/// Status line of the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueryStatus {
    Idle,
    Running,
    /// Blocked by row validation; messages are on the rows.
    Invalid,
    Succeeded { count: usize },
    Failed { message: String },
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStatus::Idle => Ok(()),
            QueryStatus::Running => f.write_str("Running query..."),
            QueryStatus::Invalid => f.write_str("Please correct the highlighted clauses"),
            QueryStatus::Succeeded { count: 1 } => f.write_str("1 feature found"),
            QueryStatus::Succeeded { count } => write!(f, "{} features found", count),
            QueryStatus::Failed { message } => write!(f, "Query failed: {}", message),
        }
    }
}

/// Result of one `run_query` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Completed {
        count: usize,
        /// Handheld layout only: the count is shown as a link to the list.
        show_results_link: bool,
    },
    /// Validation failed; `(row path, message)` for each rejected row.
    Invalid { messages: Vec<(BranchPath, String)> },
    /// The dialog changed while the query ran; the result was dropped.
    Stale,
}

/// Features produced by the last successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentFeatureSet {
    pub feature_type: String,
    pub predicate: Predicate,
    pub features: Vec<Feature>,
    pub retrieved_at: DateTime<Utc>,
}

struct Session {
    feature_type: Arc<FeatureTypeDef>,
    tree: ClauseTree,
    geom: GeomClauseView,
}

impl Session {
    fn new(feature_type: Arc<FeatureTypeDef>) -> Self {
        Self {
            tree: ClauseTree::new(Arc::clone(&feature_type)),
            geom: GeomClauseView::new(&feature_type),
            feature_type,
        }
    }
}

struct DialogState {
    session: Option<Session>,
    map: MapState,
    status: QueryStatus,
    current_set: Option<CurrentFeatureSet>,
}

/// Releases an in-flight slot when a query finishes, however it finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AdHocQueryDialog<D: FeatureDatasource> {
    datasource: Arc<D>,
    config: DialogConfig,
    state: Mutex<DialogState>,
    in_flight: AtomicUsize,
    generation: AtomicU64,
}

impl<D: FeatureDatasource> AdHocQueryDialog<D> {
    pub fn new(datasource: Arc<D>, config: DialogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            datasource,
            config,
            state: Mutex::new(DialogState {
                session: None,
                map: MapState::default(),
                status: QueryStatus::Idle,
                current_set: None,
            }),
            in_flight: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Fetch metadata for `name` and start over with a blank clause.
    #[instrument(skip(self))]
    pub async fn select_feature_type(&self, name: &str) -> Result<()> {
        let mut info = self.datasource.dd_info_for(&[name.to_string()]).await?;
        let def = info
            .remove(name)
            .ok_or_else(|| DialogError::UnknownFeatureType(name.to_string()))?;
        self.set_feature_type(def).await;
        Ok(())
    }

    /// Start over with a blank clause for already-known metadata.
    pub async fn set_feature_type(&self, def: FeatureTypeDef) {
        let mut state = self.state.lock().await;
        info!(feature_type = %def.name, "feature type selected");
        state.session = Some(Session::new(Arc::new(def)));
        state.status = QueryStatus::Idle;
        self.bump_generation();
    }

    pub async fn feature_type(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.session.as_ref().map(|s| s.feature_type.name.clone())
    }

    /// Rebuild the clause rows from a saved predicate.
    pub async fn load_predicate(&self, predicate: &Predicate) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(DialogError::NoFeatureType)?;
        session.tree.build_display_for(Some(predicate));
        self.bump_generation();
        Ok(())
    }

    /// Run `f` against the clause tree.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut ClauseTree) -> R) -> Result<R> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(DialogError::NoFeatureType)?;
        Ok(f(&mut session.tree))
    }

    /// Run `f` against the spatial filter row.
    pub async fn edit_geom<R>(&self, f: impl FnOnce(&mut GeomClauseView) -> R) -> Result<R> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(DialogError::NoFeatureType)?;
        Ok(f(&mut session.geom))
    }

    pub async fn set_map_state(&self, map: MapState) {
        self.state.lock().await.map = map;
    }

    /// Remove a row. Removing the root row leaves a blank clause.
    pub async fn remove_row(&self, path: &BranchPath) -> Result<Predicate> {
        if path.is_root() {
            self.handle_parent_row_delete().await?;
            return Ok(Predicate::TRUE);
        }
        self.edit(|tree| tree.remove(path)).await?.map_err(DialogError::from)
    }

    /// The root row removed itself: rebuild from a blank predicate.
    pub async fn handle_parent_row_delete(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(DialogError::NoFeatureType)?;
        session.tree.build_display_for(None);
        debug!("root clause removed, dialog reset to a blank clause");
        Ok(())
    }

    /// Predicate the next `run_query` would send, without validating.
    pub async fn predicate(&self) -> Result<Predicate> {
        let state = self.state.lock().await;
        let session = state.session.as_ref().ok_or(DialogError::NoFeatureType)?;
        let clauses = session.tree.value()?;
        Ok(match session.geom.value(&state.map) {
            Some(spatial) => clauses.and(&spatial),
            None => clauses,
        })
    }

    pub async fn status(&self) -> QueryStatus {
        self.state.lock().await.status.clone()
    }

    pub async fn current_feature_set(&self) -> Option<CurrentFeatureSet> {
        self.state.lock().await.current_set.clone()
    }

    fn acquire(&self) -> Result<InFlight<'_>> {
        if self.config.reject_concurrent_queries {
            if self
                .in_flight
                .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                warn!("query already in flight, ignoring run request");
                return Err(DialogError::QueryInFlight);
            }
        } else {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
        }
        Ok(InFlight(&self.in_flight))
    }

    async fn fetch(&self, feature_type: &str, query: &FeatureQuery) -> std::result::Result<Vec<Feature>, DatasourceError> {
        let request = self.datasource.get_features(feature_type, query);
        match self.config.query_timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), request)
                .await
                .unwrap_or(Err(DatasourceError::Timeout(ms))),
            None => request.await,
        }
    }

    /// Validate, combine the clause tree with the spatial filter and query
    /// the datasource.
    ///
    /// Invalid rows give [`QueryOutcome::Invalid`]. Datasource failures are
    /// logged, shown in the status and then returned, even when the dialog
    /// changed while the query ran. A late success is dropped as
    /// [`QueryOutcome::Stale`].
    #[instrument(skip(self))]
    pub async fn run_query(&self) -> Result<QueryOutcome> {
        let _slot = self.acquire()?;

        let (feature_type, predicate, generation) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let session = state.session.as_mut().ok_or(DialogError::NoFeatureType)?;

            if !session.tree.validate() {
                state.status = QueryStatus::Invalid;
                return Ok(QueryOutcome::Invalid {
                    messages: session.tree.messages(),
                });
            }
            let clauses = session.tree.value()?;
            let predicate = match session.geom.value(&state.map) {
                Some(spatial) => clauses.and(&spatial),
                None => clauses,
            };
            state.status = QueryStatus::Running;
            (
                session.feature_type.name.clone(),
                predicate,
                self.generation.load(Ordering::SeqCst),
            )
        };

        debug!(feature_type = %feature_type, predicate = %predicate, "running ad-hoc query");
        let query = FeatureQuery::new(predicate);
        let result = self.fetch(&feature_type, &query).await;

        let mut state = self.state.lock().await;
        let stale =
            self.config.discard_stale_results && self.generation.load(Ordering::SeqCst) != generation;

        match result {
            Ok(_) if stale => {
                debug!(feature_type = %feature_type, "dialog changed while querying, dropping result");
                if state.status == QueryStatus::Running && self.in_flight.load(Ordering::SeqCst) == 1 {
                    state.status = QueryStatus::Idle;
                }
                Ok(QueryOutcome::Stale)
            }
            Ok(features) => {
                let count = features.len();
                info!(feature_type = %feature_type, count, "ad-hoc query completed");
                state.status = QueryStatus::Succeeded { count };
                state.current_set = Some(CurrentFeatureSet {
                    feature_type,
                    predicate: query.predicate,
                    features,
                    retrieved_at: Utc::now(),
                });
                Ok(QueryOutcome::Completed {
                    count,
                    show_results_link: self.config.layout == Layout::Handheld && count > 0,
                })
            }
            Err(e) => {
                error!(feature_type = %feature_type, error = %e, "ad-hoc query failed");
                state.status = QueryStatus::Failed {
                    message: e.to_string(),
                };
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(QueryStatus::Idle.to_string(), "");
        assert_eq!(QueryStatus::Succeeded { count: 1 }.to_string(), "1 feature found");
        assert_eq!(QueryStatus::Succeeded { count: 0 }.to_string(), "0 features found");
        assert_eq!(
            QueryStatus::Failed { message: "Timeout after 50ms".into() }.to_string(),
            "Query failed: Timeout after 50ms"
        );
    }

    #[test]
    fn test_status_json() {
        assert_eq!(
            serde_json::to_value(QueryStatus::Succeeded { count: 3 }).unwrap(),
            serde_json::json!({"state": "succeeded", "count": 3})
        );
    }
}
