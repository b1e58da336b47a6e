// SPDX-License-Identifier: PMPL-1.0-or-later
//! Predicate error types.

use thiserror::Error;

/// Errors raised while constructing or decoding predicates.
///
/// All of these indicate a programming error in the caller (a hand-built or
/// corrupted predicate), never bad user input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredicateError {
    /// Operator token outside the recognized set.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    #[error("operator '{operator}' takes {expected} operand(s), got {found}")]
    Arity {
        operator: String,
        expected: usize,
        found: usize,
    },

    #[error("operator '{operator}' expects {expected} at operand {position}")]
    OperandShape {
        operator: String,
        position: usize,
        expected: &'static str,
    },

    /// The `type` element of a wire array disagrees with its operator.
    #[error("type tag '{tag}' does not match operator '{operator}' ({expected})")]
    TypeMismatch {
        tag: String,
        operator: String,
        expected: &'static str,
    },

    #[error("malformed predicate json: {0}")]
    MalformedJson(String),
}

pub type Result<T> = std::result::Result<T, PredicateError>;
