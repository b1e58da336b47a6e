// SPDX-License-Identifier: PMPL-1.0-or-later
//! Common row chrome and the `QueryRow` contract shared by clause rows.
//!
//! Rows never hold a reference to their owner. A structural edit (morph,
//! remove) is returned as a [`ClauseEvent`] addressed by [`BranchPath`]; the
//! owning tree applies it to its predicate and rebuilds every row.

use std::fmt;

use geoclause_predicate::{JoinOperator, Predicate};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Position of a row in the clause tree: branch indices from the root.
///
/// The root row has the empty path; branch `i` of the join at `p` is
/// `p.child(i)`. Paths index the operands of join predicates one-to-one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchPath(Vec<usize>);

impl BranchPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    /// Parent path and this row's branch index, `None` at the root.
    pub fn split_last(&self) -> Option<(BranchPath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), last))
    }

    pub fn parent(&self) -> Option<BranchPath> {
        self.split_last().map(|(parent, _)| parent)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    /// Steps left after `prefix`, `None` when this path is not under it.
    pub fn strip_prefix(&self, prefix: &BranchPath) -> Option<&[usize]> {
        self.0.strip_prefix(prefix.0.as_slice())
    }

    /// This path followed by `steps`.
    pub fn descend(&self, steps: &[usize]) -> Self {
        let mut path = self.0.clone();
        path.extend_from_slice(steps);
        Self(path)
    }
}

impl From<Vec<usize>> for BranchPath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

/// Structural edit requested by a row.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseEvent {
    /// Replace the subtree at `path` with `predicate`.
    Replace { path: BranchPath, predicate: Predicate },
    /// Drop the subtree at `path`.
    Remove { path: BranchPath },
}

impl ClauseEvent {
    pub fn path(&self) -> &BranchPath {
        match self {
            ClauseEvent::Replace { path, .. } | ClauseEvent::Remove { path } => path,
        }
    }
}

/// State every row carries besides its clause content.
#[derive(Debug, Clone, PartialEq)]
pub struct RowChrome {
    pub path: BranchPath,
    /// Operator joining this row to its previous sibling.
    pub join_operator: JoinOperator,
    /// The dropdown is shown on every branch except the first of a join
    /// and never on the root.
    pub show_join_operator: bool,
    /// Inline validation message from the last `validate_value`.
    pub message: Option<String>,
}

impl RowChrome {
    pub fn new(path: BranchPath, join_operator: JoinOperator) -> Self {
        let show_join_operator = matches!(path.split_last(), Some((_, index)) if index > 0);
        Self {
            path,
            join_operator,
            show_join_operator,
            message: None,
        }
    }
}

/// One row of the query builder.
pub trait QueryRow {
    fn chrome(&self) -> &RowChrome;

    fn chrome_mut(&mut self) -> &mut RowChrome;

    /// Predicate for the row's current on-screen state.
    fn value(&self) -> Result<Predicate>;

    /// Check current input, recording inline messages. Never fails.
    fn validate_value(&mut self) -> bool;

    fn path(&self) -> &BranchPath {
        &self.chrome().path
    }

    fn predicate_operator(&self) -> JoinOperator {
        self.chrome().join_operator
    }

    fn set_predicate_operator(&mut self, operator: JoinOperator) {
        self.chrome_mut().join_operator = operator;
    }

    fn message(&self) -> Option<&str> {
        self.chrome().message.as_deref()
    }

    /// Ask the owner to remove this row. Does not touch the tree itself.
    fn remove(&self) -> ClauseEvent {
        ClauseEvent::Remove {
            path: self.path().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_navigation() {
        let root = BranchPath::root();
        let leaf = root.child(1).child(0);
        assert!(root.is_root());
        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.split_last(), Some((root.child(1), 0)));
        assert_eq!(leaf.parent().and_then(|p| p.parent()), Some(root.clone()));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn test_path_prefixes() {
        let leaf = BranchPath::from(vec![1, 0, 1]);
        assert_eq!(leaf.strip_prefix(&BranchPath::from(vec![1])), Some(&[0, 1][..]));
        assert_eq!(leaf.strip_prefix(&BranchPath::from(vec![0])), None);
        assert_eq!(BranchPath::root().child(1).descend(&[0, 1]), leaf);
    }

    #[test]
    fn test_path_display() {
        assert_eq!(BranchPath::root().to_string(), "root");
        assert_eq!(BranchPath::from(vec![0, 1]).to_string(), "0.1");
    }

    #[test]
    fn test_join_dropdown_visibility() {
        assert!(!RowChrome::new(BranchPath::root(), JoinOperator::And).show_join_operator);
        assert!(!RowChrome::new(BranchPath::root().child(0), JoinOperator::Or).show_join_operator);
        assert!(RowChrome::new(BranchPath::root().child(1), JoinOperator::Or).show_join_operator);
    }
}
