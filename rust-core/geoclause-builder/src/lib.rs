// SPDX-License-Identifier: PMPL-1.0-or-later
//! Geoclause Builder
//!
//! Editable clause rows that mirror a [`Predicate`](geoclause_predicate::Predicate)
//! tree. A comparison is a [`SimpleClauseView`]; an `and`/`or` is a
//! [`JoinClauseView`] over two branch rows. A [`ClauseTree`] owns the rows,
//! applies structural edits through a pure reducer and rebuilds the rows from
//! the resulting predicate.
//!
//! ```
//! use std::sync::Arc;
//! use geoclause_builder::{BaseType, BranchPath, ClauseTree, FeatureTypeDef, FieldDef};
//! use geoclause_predicate::Predicate;
//!
//! let pole = FeatureTypeDef::new("pole", vec![FieldDef::new("height", BaseType::Double)]);
//! let mut tree = ClauseTree::new(Arc::new(pole));
//! let root = BranchPath::root();
//! tree.set_field(&root, Some("height")).unwrap();
//! tree.set_operator(&root, ">").unwrap();
//! tree.set_value(&root, serde_json::json!("10")).unwrap();
//! assert!(tree.validate());
//! assert_eq!(tree.value().unwrap(), Predicate::gt("height", 10));
//! ```

pub mod editor;
pub mod error;
pub mod geom;
pub mod join;
pub mod metadata;
pub mod operators;
pub mod reducer;
pub mod row;
pub mod simple;
pub mod tree;
pub mod view;

pub use editor::{EditorKind, ValueEditor};
pub use error::ClauseError;
pub use geom::{GeomClauseView, MapState};
pub use join::JoinClauseView;
pub use metadata::{BaseType, FeatureTypeDef, FieldDef};
pub use operators::{operators_for, ClauseOperator};
pub use row::{BranchPath, ClauseEvent, QueryRow, RowChrome};
pub use simple::SimpleClauseView;
pub use tree::ClauseTree;
pub use view::{ClauseShape, ClauseView, RowDescription};
