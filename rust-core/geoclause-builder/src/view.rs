// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clause rows as one tree type, and the flat row listing used for display.

use std::sync::Arc;

use geoclause_predicate::{JoinOperator, OperatorType, Predicate};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::join::JoinClauseView;
use crate::metadata::FeatureTypeDef;
use crate::row::{BranchPath, QueryRow, RowChrome};
use crate::simple::SimpleClauseView;

/// Which row type displays a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseShape {
    Simple,
    Join,
}

impl ClauseShape {
    /// `and`/`or` get a join row. Everything else, `not` included, is one
    /// simple row. Used for the root and for every branch.
    pub fn of(predicate: &Predicate) -> Self {
        match predicate.kind() {
            OperatorType::JoinOp => ClauseShape::Join,
            _ => ClauseShape::Simple,
        }
    }
}

/// A row of the clause tree.
#[derive(Debug)]
pub enum ClauseView {
    Simple(SimpleClauseView),
    Join(JoinClauseView),
}

impl ClauseView {
    pub fn build(predicate: &Predicate, feature_type: Arc<FeatureTypeDef>, chrome: RowChrome) -> Self {
        match ClauseShape::of(predicate) {
            ClauseShape::Simple => ClauseView::Simple(SimpleClauseView::new(predicate, feature_type, chrome)),
            ClauseShape::Join => ClauseView::Join(JoinClauseView::new(predicate, feature_type, chrome)),
        }
    }

    /// Root row for a whole predicate.
    pub fn root(predicate: &Predicate, feature_type: Arc<FeatureTypeDef>) -> Self {
        Self::build(
            predicate,
            feature_type,
            RowChrome::new(BranchPath::root(), JoinOperator::default()),
        )
    }

    pub fn shape(&self) -> ClauseShape {
        match self {
            ClauseView::Simple(_) => ClauseShape::Simple,
            ClauseView::Join(_) => ClauseShape::Join,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleClauseView> {
        match self {
            ClauseView::Simple(view) => Some(view),
            ClauseView::Join(_) => None,
        }
    }

    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleClauseView> {
        match self {
            ClauseView::Simple(view) => Some(view),
            ClauseView::Join(_) => None,
        }
    }

    pub fn as_join(&self) -> Option<&JoinClauseView> {
        match self {
            ClauseView::Join(view) => Some(view),
            ClauseView::Simple(_) => None,
        }
    }

    /// Row at `path`, relative to this row.
    pub fn find(&self, path: &BranchPath) -> Option<&ClauseView> {
        path.steps().iter().try_fold(self, |row, &index| match row {
            ClauseView::Join(join) => join.branch(index),
            ClauseView::Simple(_) => None,
        })
    }

    pub fn find_mut(&mut self, path: &BranchPath) -> Option<&mut ClauseView> {
        let mut row = self;
        for &index in path.steps() {
            row = match row {
                ClauseView::Join(join) => join.branch_mut(index)?,
                ClauseView::Simple(_) => return None,
            };
        }
        Some(row)
    }

    /// Pre-order listing of this row and all rows below it.
    pub fn describe(&self) -> Vec<RowDescription> {
        let mut rows = Vec::new();
        self.describe_into(&mut rows);
        rows
    }

    fn describe_into(&self, rows: &mut Vec<RowDescription>) {
        let chrome = self.chrome();
        let join_operator = chrome.show_join_operator.then_some(chrome.join_operator);
        match self {
            ClauseView::Simple(view) => rows.push(RowDescription {
                path: chrome.path.clone(),
                depth: chrome.path.depth(),
                shape: ClauseShape::Simple,
                join_operator,
                field: view.field().map(str::to_string),
                operator: view
                    .clause_operator()
                    .map(|op| op.label().to_string())
                    .unwrap_or_else(|| view.operator_token().to_string()),
                value: view.editor_value().and_then(|v| value_text(&v)),
                negated: view.is_negated(),
                read_only: view.is_opaque(),
                message: chrome.message.clone(),
            }),
            ClauseView::Join(view) => {
                rows.push(RowDescription {
                    path: chrome.path.clone(),
                    depth: chrome.path.depth(),
                    shape: ClauseShape::Join,
                    join_operator,
                    field: None,
                    operator: view.operator().to_string(),
                    value: None,
                    negated: false,
                    read_only: false,
                    message: chrome.message.clone(),
                });
                for branch in view.branches() {
                    branch.describe_into(rows);
                }
            }
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

impl QueryRow for ClauseView {
    fn chrome(&self) -> &RowChrome {
        match self {
            ClauseView::Simple(view) => view.chrome(),
            ClauseView::Join(view) => view.chrome(),
        }
    }

    fn chrome_mut(&mut self) -> &mut RowChrome {
        match self {
            ClauseView::Simple(view) => view.chrome_mut(),
            ClauseView::Join(view) => view.chrome_mut(),
        }
    }

    fn value(&self) -> Result<Predicate> {
        match self {
            ClauseView::Simple(view) => view.value(),
            ClauseView::Join(view) => view.value(),
        }
    }

    fn validate_value(&mut self) -> bool {
        match self {
            ClauseView::Simple(view) => view.validate_value(),
            ClauseView::Join(view) => view.validate_value(),
        }
    }
}

/// One rendered row, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDescription {
    pub path: BranchPath,
    pub depth: usize,
    pub shape: ClauseShape,
    /// Set only where the join dropdown is shown.
    pub join_operator: Option<JoinOperator>,
    pub field: Option<String>,
    /// Operator label, or the join symbol for join rows.
    pub operator: String,
    pub value: Option<String>,
    pub negated: bool,
    pub read_only: bool,
    pub message: Option<String>,
}
