// SPDX-License-Identifier: PMPL-1.0-or-later
//! The owner of a clause-row tree.
//!
//! Value edits (field, operator, value) change one row in place. Structural
//! edits (morph, remove, join operator) go through [`ClauseTree::dispatch`]:
//! serialize the current rows, apply the edit with the pure reducer, and
//! rebuild every row from the result. Rows and predicate therefore stay
//! isomorphic after every edit.

use std::sync::Arc;

use geoclause_predicate::{JoinOperator, Predicate};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{ClauseError, Result};
use crate::metadata::FeatureTypeDef;
use crate::reducer;
use crate::row::{BranchPath, ClauseEvent, QueryRow};
use crate::simple::SimpleClauseView;
use crate::view::{ClauseView, RowDescription};

#[derive(Debug)]
pub struct ClauseTree {
    feature_type: Arc<FeatureTypeDef>,
    root: ClauseView,
}

impl ClauseTree {
    /// Tree holding one blank clause.
    pub fn new(feature_type: Arc<FeatureTypeDef>) -> Self {
        Self::with_predicate(feature_type, &Predicate::TRUE)
    }

    pub fn with_predicate(feature_type: Arc<FeatureTypeDef>, predicate: &Predicate) -> Self {
        let root = ClauseView::root(predicate, Arc::clone(&feature_type));
        Self { feature_type, root }
    }

    /// Discard all rows and rebuild from `predicate` (`None` means blank).
    pub fn build_display_for(&mut self, predicate: Option<&Predicate>) {
        let blank = Predicate::TRUE;
        let predicate = predicate.unwrap_or(&blank);
        debug!(feature_type = %self.feature_type.name, %predicate, "rebuilding clause rows");
        self.root = ClauseView::root(predicate, Arc::clone(&self.feature_type));
    }

    pub fn feature_type(&self) -> &FeatureTypeDef {
        &self.feature_type
    }

    pub fn root(&self) -> &ClauseView {
        &self.root
    }

    pub fn row(&self, path: &BranchPath) -> Result<&ClauseView> {
        self.root
            .find(path)
            .ok_or_else(|| ClauseError::InvalidPath(path.clone()))
    }

    fn row_mut(&mut self, path: &BranchPath) -> Result<&mut ClauseView> {
        self.root
            .find_mut(path)
            .ok_or_else(|| ClauseError::InvalidPath(path.clone()))
    }

    fn simple_mut(&mut self, path: &BranchPath) -> Result<&mut SimpleClauseView> {
        self.row_mut(path)?
            .as_simple_mut()
            .ok_or_else(|| ClauseError::NotASimpleClause(path.clone()))
    }

    /// Apply a structural edit and rebuild all rows. Returns the new predicate.
    ///
    /// Rows that had an operator but no value come back with that operator
    /// and an empty editor, wherever the edit moved them.
    #[instrument(skip(self), level = "debug")]
    pub fn dispatch(&mut self, event: ClauseEvent) -> Result<Predicate> {
        if matches!(&event, ClauseEvent::Remove { path } if path.is_root()) {
            self.build_display_for(None);
            return Ok(Predicate::TRUE);
        }
        let current = self.root.value()?;
        let next = reducer::apply(&current, &event)?;
        let unfinished = self.unfinished_rows();
        self.build_display_for(Some(&next));
        for (path, token) in unfinished {
            if let Some(path) = reducer::relocate(&current, &event, &path) {
                self.restore_operator(&path, &token);
            }
        }
        Ok(next)
    }

    fn unfinished_rows(&self) -> Vec<(BranchPath, String)> {
        fn collect(row: &ClauseView, out: &mut Vec<(BranchPath, String)>) {
            match row {
                ClauseView::Simple(simple) if simple.is_unfinished() => {
                    out.push((simple.path().clone(), simple.operator_token().to_string()));
                }
                ClauseView::Simple(_) => {}
                ClauseView::Join(join) => join.branches().iter().for_each(|branch| collect(branch, out)),
            }
        }
        let mut rows = Vec::new();
        collect(&self.root, &mut rows);
        rows
    }

    fn restore_operator(&mut self, path: &BranchPath, token: &str) {
        if let Some(simple) = self.root.find_mut(path).and_then(ClauseView::as_simple_mut) {
            debug!(%path, token, "restoring operator of unfinished clause");
            simple.restore_operator(token);
        }
    }

    pub fn set_field(&mut self, path: &BranchPath, field: Option<&str>) -> Result<()> {
        self.simple_mut(path)?.set_field(field)
    }

    pub fn set_operator(&mut self, path: &BranchPath, token: &str) -> Result<()> {
        self.simple_mut(path)?.set_operator(token)
    }

    pub fn set_value(&mut self, path: &BranchPath, value: Value) -> Result<()> {
        self.simple_mut(path)?.set_value(value)
    }

    pub fn set_negated(&mut self, path: &BranchPath, negated: bool) -> Result<()> {
        self.simple_mut(path)?.set_negated(negated)
    }

    /// Change the join dropdown of a later branch and rebuild.
    pub fn set_join_operator(&mut self, path: &BranchPath, operator: JoinOperator) -> Result<Predicate> {
        let row = self.row_mut(path)?;
        if !row.chrome().show_join_operator {
            return Err(ClauseError::InvalidPath(path.clone()));
        }
        row.set_predicate_operator(operator);
        let next = self.root.value()?;
        let unfinished = self.unfinished_rows();
        self.build_display_for(Some(&next));
        for (path, token) in unfinished {
            self.restore_operator(&path, &token);
        }
        Ok(next)
    }

    /// Turn the simple row at `path` into `row AND <blank>`.
    pub fn morph(&mut self, path: &BranchPath) -> Result<Predicate> {
        let event = self
            .row(path)?
            .as_simple()
            .ok_or_else(|| ClauseError::NotASimpleClause(path.clone()))?
            .morph_to_join_clause()?;
        self.dispatch(event)
    }

    pub fn remove(&mut self, path: &BranchPath) -> Result<Predicate> {
        let event = self.row(path)?.remove();
        self.dispatch(event)
    }

    pub fn value(&self) -> Result<Predicate> {
        self.root.value()
    }

    pub fn validate(&mut self) -> bool {
        self.root.validate_value()
    }

    /// Inline messages left by the last validation, in row order.
    pub fn messages(&self) -> Vec<(BranchPath, String)> {
        self.describe()
            .into_iter()
            .filter_map(|row| row.message.map(|message| (row.path, message)))
            .collect()
    }

    pub fn describe(&self) -> Vec<RowDescription> {
        self.root.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{BaseType, FieldDef};
    use crate::view::ClauseShape;
    use serde_json::json;

    fn tree() -> ClauseTree {
        ClauseTree::new(Arc::new(FeatureTypeDef::new(
            "pole",
            vec![
                FieldDef::new("status", BaseType::String).with_enum(["ok", "faulty"]),
                FieldDef::new("height", BaseType::Double),
            ],
        )))
    }

    fn path(steps: &[usize]) -> BranchPath {
        BranchPath::from(steps.to_vec())
    }

    #[test]
    fn test_new_tree_is_blank() {
        let tree = tree();
        assert_eq!(tree.value().unwrap(), Predicate::TRUE);
        assert_eq!(tree.root().shape(), ClauseShape::Simple);
    }

    #[test]
    fn test_morph_then_edit_second_branch() {
        let mut tree = tree();
        tree.set_field(&BranchPath::root(), Some("status")).unwrap();
        tree.set_value(&BranchPath::root(), json!("faulty")).unwrap();

        let morphed = tree.morph(&BranchPath::root()).unwrap();
        assert_eq!(morphed, Predicate::eq("status", "faulty").and(&Predicate::TRUE));
        assert_eq!(tree.root().shape(), ClauseShape::Join);

        tree.set_field(&path(&[1]), Some("height")).unwrap();
        tree.set_operator(&path(&[1]), ">").unwrap();
        tree.set_value(&path(&[1]), json!(10)).unwrap();
        assert_eq!(
            tree.value().unwrap(),
            Predicate::eq("status", "faulty").and(&Predicate::gt("height", 10))
        );
    }

    #[test]
    fn test_join_operator_change_rebuilds() {
        let mut tree = tree();
        tree.build_display_for(Some(&Predicate::eq("status", "ok").and(&Predicate::gt("height", 1))));
        let next = tree.set_join_operator(&path(&[1]), JoinOperator::Or).unwrap();
        assert_eq!(next, Predicate::eq("status", "ok").or(&Predicate::gt("height", 1)));
        assert_eq!(tree.describe()[0].operator, "or");

        assert_eq!(
            tree.set_join_operator(&path(&[0]), JoinOperator::Or).unwrap_err(),
            ClauseError::InvalidPath(path(&[0]))
        );
    }

    #[test]
    fn test_remove_branch_and_root() {
        let mut tree = tree();
        tree.build_display_for(Some(&Predicate::eq("status", "ok").and(&Predicate::gt("height", 1))));
        assert_eq!(tree.remove(&path(&[0])).unwrap(), Predicate::gt("height", 1));
        assert_eq!(tree.root().shape(), ClauseShape::Simple);
        assert_eq!(tree.remove(&BranchPath::root()).unwrap(), Predicate::TRUE);
    }

    #[test]
    fn test_edit_errors() {
        let mut tree = tree();
        tree.build_display_for(Some(&Predicate::eq("status", "ok").and(&Predicate::gt("height", 1))));
        assert_eq!(
            tree.set_field(&BranchPath::root(), Some("height")).unwrap_err(),
            ClauseError::NotASimpleClause(BranchPath::root())
        );
        assert_eq!(tree.morph(&path(&[3])).unwrap_err(), ClauseError::InvalidPath(path(&[3])));
    }

    #[test]
    fn test_validation_messages() {
        let mut tree = tree();
        tree.build_display_for(Some(&Predicate::eq("status", "broken").and(&Predicate::gt("height", 1))));
        assert!(!tree.validate());
        let messages = tree.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, path(&[0]));
    }

    #[test]
    fn test_unfinished_row_survives_morph() {
        let mut tree = tree();
        tree.set_field(&BranchPath::root(), Some("height")).unwrap();
        assert!(!tree.validate());

        tree.morph(&BranchPath::root()).unwrap();
        let first = tree.row(&path(&[0])).unwrap().as_simple().unwrap();
        assert_eq!(first.operator_token(), "=");
        assert_eq!(first.editor_value(), Some(Value::Null));
        assert!(!tree.validate());
        assert_eq!(tree.messages()[0].0, path(&[0]));
    }

    #[test]
    fn test_unfinished_row_survives_sibling_removal_and_join_change() {
        let mut tree = tree();
        tree.build_display_for(Some(
            &Predicate::eq("status", "ok").and(&Predicate::gt("height", 1).or(&Predicate::TRUE)),
        ));
        tree.set_field(&path(&[1, 1]), Some("height")).unwrap();
        tree.set_operator(&path(&[1, 1]), "<>").unwrap();

        tree.set_join_operator(&path(&[1]), JoinOperator::Or).unwrap();
        assert_eq!(tree.row(&path(&[1, 1])).unwrap().as_simple().unwrap().operator_token(), "<>");

        tree.remove(&path(&[1, 0])).unwrap();
        let moved = tree.row(&path(&[1])).unwrap().as_simple().unwrap();
        assert_eq!(moved.operator_token(), "<>");
        assert!(!tree.validate());
    }

    #[test]
    fn test_build_display_for_none_is_blank() {
        let mut tree = tree();
        tree.build_display_for(Some(&Predicate::gt("height", 1)));
        tree.build_display_for(None);
        assert_eq!(tree.value().unwrap(), Predicate::TRUE);
    }
}
