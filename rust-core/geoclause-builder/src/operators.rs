// SPDX-License-Identifier: PMPL-1.0-or-later
//! Operators offered by a simple clause, per field base type.

use std::fmt;

use geoclause_predicate::Operator;

use crate::metadata::{BaseType, FieldDef};

/// Operator chosen in a clause's operator dropdown.
///
/// `Null` and `NotNull` are presentation-only: they serialize to
/// `= null` and `<> null` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Null,
    NotNull,
}

/// Always appended after the type-specific operators.
const DEFAULT_OPERATORS: [ClauseOperator; 2] = [ClauseOperator::NotNull, ClauseOperator::Null];

impl ClauseOperator {
    /// Raw UI token, as stored by a clause row.
    pub fn token(self) -> &'static str {
        match self {
            ClauseOperator::Eq => "=",
            ClauseOperator::Ne => "<>",
            ClauseOperator::Gt => ">",
            ClauseOperator::Gte => ">=",
            ClauseOperator::Lt => "<",
            ClauseOperator::Lte => "<=",
            ClauseOperator::Like => "like",
            ClauseOperator::ILike => "ilike",
            ClauseOperator::In => "in",
            ClauseOperator::Null => "null",
            ClauseOperator::NotNull => "not_null",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(ClauseOperator::Eq),
            "<>" => Some(ClauseOperator::Ne),
            ">" => Some(ClauseOperator::Gt),
            ">=" => Some(ClauseOperator::Gte),
            "<" => Some(ClauseOperator::Lt),
            "<=" => Some(ClauseOperator::Lte),
            "like" => Some(ClauseOperator::Like),
            "ilike" => Some(ClauseOperator::ILike),
            "in" => Some(ClauseOperator::In),
            "null" => Some(ClauseOperator::Null),
            "not_null" => Some(ClauseOperator::NotNull),
            _ => None,
        }
    }

    /// Clause operator for a predicate operator; `None` for non-leaf operators.
    pub fn from_predicate(operator: Operator) -> Option<Self> {
        match operator {
            Operator::Eq => Some(ClauseOperator::Eq),
            Operator::Ne => Some(ClauseOperator::Ne),
            Operator::Gt => Some(ClauseOperator::Gt),
            Operator::Gte => Some(ClauseOperator::Gte),
            Operator::Lt => Some(ClauseOperator::Lt),
            Operator::Lte => Some(ClauseOperator::Lte),
            Operator::Like => Some(ClauseOperator::Like),
            Operator::ILike => Some(ClauseOperator::ILike),
            Operator::In => Some(ClauseOperator::In),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClauseOperator::Like => "like",
            ClauseOperator::ILike => "like (ignore case)",
            ClauseOperator::In => "in",
            ClauseOperator::Null => "is not populated",
            ClauseOperator::NotNull => "is populated",
            other => other.token(),
        }
    }

    /// Whether the operator takes no value editor.
    pub fn is_pseudo(self) -> bool {
        matches!(self, ClauseOperator::Null | ClauseOperator::NotNull)
    }

    pub fn is_pattern(self) -> bool {
        matches!(self, ClauseOperator::Like | ClauseOperator::ILike)
    }
}

impl fmt::Display for ClauseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Operators legal for a field, type-specific first, defaults last.
///
/// A field missing from the data dictionary only gets the defaults.
pub fn operators_for(field: Option<&FieldDef>) -> Vec<ClauseOperator> {
    use ClauseOperator::*;

    let specific: &[ClauseOperator] = match field {
        Some(f) if f.is_enum() => &[Eq, Ne, In],
        Some(f) => match f.base_type {
            BaseType::String => &[Eq, Ne, Like, ILike, In],
            BaseType::Date | BaseType::Timestamp => &[Eq, Ne, Gt, Gte, Lt, Lte],
            BaseType::Integer | BaseType::Double | BaseType::Numeric => {
                &[Eq, Ne, Gt, Gte, Lt, Lte, In]
            }
            BaseType::Boolean => &[Eq, Ne],
            BaseType::Other => &[],
        },
        None => &[],
    };
    specific.iter().chain(DEFAULT_OPERATORS.iter()).copied().collect()
}

/// Operator selected when a field is picked.
pub fn default_operator_for(field: Option<&FieldDef>) -> ClauseOperator {
    operators_for(field)
        .first()
        .copied()
        .unwrap_or(ClauseOperator::NotNull)
}
