// SPDX-License-Identifier: PMPL-1.0-or-later
//! Pure tree edits: (predicate, path, change) -> new predicate.
//!
//! Row paths index predicate operands directly, so these functions never look
//! at rows. The input tree is left untouched; unchanged subtrees are shared.

use geoclause_predicate::{JoinOperator, Operand, Predicate};

use crate::error::{ClauseError, Result};
use crate::row::{BranchPath, ClauseEvent};

/// Subtree at `path`, if every step lands on a predicate operand.
pub fn subtree_at<'a>(root: &'a Predicate, path: &BranchPath) -> Option<&'a Predicate> {
    path.steps()
        .iter()
        .try_fold(root, |node, &index| node.operands().get(index)?.as_predicate())
}

/// Copy of `root` with the subtree at `path` swapped for `replacement`.
pub fn replace_at(root: &Predicate, path: &BranchPath, replacement: Predicate) -> Result<Predicate> {
    replace_steps(root, path.steps(), replacement).ok_or_else(|| ClauseError::InvalidPath(path.clone()))?
}

fn replace_steps(node: &Predicate, steps: &[usize], replacement: Predicate) -> Option<Result<Predicate>> {
    let Some((&index, rest)) = steps.split_first() else {
        return Some(Ok(replacement));
    };
    let child = node.operands().get(index)?.as_predicate()?;
    let new_child = match replace_steps(child, rest, replacement)? {
        Ok(p) => p,
        Err(e) => return Some(Err(e)),
    };
    let mut operands = node.operands().to_vec();
    operands[index] = Operand::predicate(new_child);
    Some(Predicate::new(node.operator(), operands).map_err(ClauseError::from))
}

/// Copy of `root` without the subtree at `path`.
///
/// Removing the root leaves `true`. Removing a branch collapses its join into
/// the remaining branch.
pub fn remove_at(root: &Predicate, path: &BranchPath) -> Result<Predicate> {
    let Some((parent_path, index)) = path.split_last() else {
        return Ok(Predicate::TRUE);
    };
    let parent = subtree_at(root, &parent_path).ok_or_else(|| ClauseError::InvalidPath(path.clone()))?;
    if subtree_at(parent, &BranchPath::root().child(index)).is_none() {
        return Err(ClauseError::InvalidPath(path.clone()));
    }

    let mut remaining = parent
        .sub_predicates()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, p)| p.clone());
    let join = JoinOperator::from_operator(parent.operator()).unwrap_or_default();
    let collapsed = match remaining.next() {
        Some(first) => remaining.fold(first, |acc, next| acc.combine(join, &next)),
        None => Predicate::TRUE,
    };
    replace_at(root, &parent_path, collapsed)
}

/// Apply a row's structural edit.
pub fn apply(root: &Predicate, event: &ClauseEvent) -> Result<Predicate> {
    match event {
        ClauseEvent::Replace { path, predicate } => replace_at(root, path, predicate.clone()),
        ClauseEvent::Remove { path } => remove_at(root, path),
    }
}

/// Where the row at `path` ends up once `event` is applied to `root`, `None`
/// when the edit drops it.
///
/// A replacement keeps the rows below it only when the old subtree becomes
/// its first branch, which is what a morph produces.
pub fn relocate(root: &Predicate, event: &ClauseEvent, path: &BranchPath) -> Option<BranchPath> {
    match event {
        ClauseEvent::Replace { path: target, predicate } => {
            let Some(rest) = path.strip_prefix(target) else {
                return Some(path.clone());
            };
            let kept = predicate.sub_predicates().next() == subtree_at(root, target);
            kept.then(|| target.child(0).descend(rest))
        }
        ClauseEvent::Remove { path: target } => {
            if path.strip_prefix(target).is_some() {
                return None;
            }
            let (parent, index) = target.split_last()?;
            match path.strip_prefix(&parent) {
                // Joins are binary: the surviving branch takes the parent's place.
                Some(rest) => {
                    let (&branch, rest) = rest.split_first()?;
                    (branch != index).then(|| parent.descend(rest))
                }
                None => Some(path.clone()),
            }
        }
    }
}
