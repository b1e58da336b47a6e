// SPDX-License-Identifier: PMPL-1.0-or-later
//! Boolean join editor: two branch rows combined with `and`/`or`.

use std::sync::Arc;

use geoclause_predicate::{JoinOperator, Predicate};

use crate::error::Result;
use crate::metadata::FeatureTypeDef;
use crate::row::{QueryRow, RowChrome};
use crate::view::ClauseView;

/// Editor for a join predicate.
///
/// The operator applied when reserializing comes from each later branch's
/// own join dropdown, not from the operator this row was built with. Editing
/// the dropdown on branch 1 therefore changes the join on the next rebuild.
#[derive(Debug)]
pub struct JoinClauseView {
    chrome: RowChrome,
    operator: JoinOperator,
    branches: Vec<ClauseView>,
}

impl JoinClauseView {
    /// Build branch rows for each predicate operand of `predicate`.
    pub fn new(predicate: &Predicate, feature_type: Arc<FeatureTypeDef>, chrome: RowChrome) -> Self {
        let operator = JoinOperator::from_operator(predicate.operator()).unwrap_or_default();
        let branches = predicate
            .sub_predicates()
            .enumerate()
            .map(|(index, branch)| {
                ClauseView::build(
                    branch,
                    Arc::clone(&feature_type),
                    RowChrome::new(chrome.path.child(index), operator),
                )
            })
            .collect();
        Self {
            chrome,
            operator,
            branches,
        }
    }

    /// Operator this row was built with.
    pub fn operator(&self) -> JoinOperator {
        self.operator
    }

    pub fn branches(&self) -> &[ClauseView] {
        &self.branches
    }

    pub fn branches_mut(&mut self) -> &mut [ClauseView] {
        &mut self.branches
    }

    pub fn branch(&self, index: usize) -> Option<&ClauseView> {
        self.branches.get(index)
    }

    pub fn branch_mut(&mut self, index: usize) -> Option<&mut ClauseView> {
        self.branches.get_mut(index)
    }
}

impl QueryRow for JoinClauseView {
    fn chrome(&self) -> &RowChrome {
        &self.chrome
    }

    fn chrome_mut(&mut self) -> &mut RowChrome {
        &mut self.chrome
    }

    /// Left fold of the branches, each joined by its own dropdown operator.
    fn value(&self) -> Result<Predicate> {
        let mut branches = self.branches.iter();
        let Some(first) = branches.next() else {
            return Ok(Predicate::TRUE);
        };
        let mut acc = first.value()?;
        for branch in branches {
            acc = acc.combine(branch.predicate_operator(), &branch.value()?);
        }
        Ok(acc)
    }

    /// True only if every branch is valid. All branches are checked so that
    /// each one gets its inline message.
    fn validate_value(&mut self) -> bool {
        self.branches
            .iter_mut()
            .fold(true, |valid, branch| branch.validate_value() && valid)
    }
}
