// SPDX-License-Identifier: PMPL-1.0-or-later
//! Clause builder error types.

use geoclause_predicate::PredicateError;
use thiserror::Error;

use crate::row::BranchPath;

/// Errors raised by clause views and the clause tree.
///
/// These are structural or programming errors. User-input problems are
/// reported through `validate_value` as inline row messages instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClauseError {
    /// A clause carries an operator token with no predicate factory.
    #[error("unhandled operator: {0}")]
    UnhandledOperator(String),

    #[error("unknown field '{field}' for feature type '{feature_type}'")]
    UnknownField { feature_type: String, field: String },

    #[error("no clause row at {0}")]
    InvalidPath(BranchPath),

    #[error("row {0} is not a simple clause")]
    NotASimpleClause(BranchPath),

    #[error("row {0} has no value editor")]
    NoValueEditor(BranchPath),

    #[error("row {0} is read-only")]
    ReadOnly(BranchPath),

    #[error(transparent)]
    Predicate(#[from] PredicateError),
}

pub type Result<T> = std::result::Result<T, ClauseError>;
