// SPDX-License-Identifier: PMPL-1.0-or-later
//! Geoclause Dialog
//!
//! The ad-hoc query dialog: pick a feature type, edit clauses, optionally
//! restrict to the map view or selection, and run the resulting predicate
//! against a [`FeatureDatasource`].

pub mod config;
pub mod datasource;
pub mod dialog;
pub mod error;

pub use config::{DialogConfig, Layout};
pub use datasource::{Feature, FeatureDatasource, FeatureQuery};
pub use dialog::{AdHocQueryDialog, CurrentFeatureSet, QueryOutcome, QueryStatus};
pub use error::{DatasourceError, DialogError};
