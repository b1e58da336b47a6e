// SPDX-License-Identifier: PMPL-1.0-or-later
//! Operator tokens and their classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PredicateError;

/// Classification of an operator, the first element of every wire array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    CompOp,
    FuncOp,
    GeomOp,
    UnaryOp,
    JoinOp,
    BoolConst,
}

impl OperatorType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorType::CompOp => "comp_op",
            OperatorType::FuncOp => "func_op",
            OperatorType::GeomOp => "geom_op",
            OperatorType::UnaryOp => "unary_op",
            OperatorType::JoinOp => "join_op",
            OperatorType::BoolConst => "bool_const",
        }
    }

    /// Number of operands every predicate of this type carries.
    pub fn arity(self) -> usize {
        match self {
            OperatorType::CompOp
            | OperatorType::FuncOp
            | OperatorType::GeomOp
            | OperatorType::JoinOp => 2,
            OperatorType::UnaryOp => 1,
            OperatorType::BoolConst => 0,
        }
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorType {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comp_op" => Ok(OperatorType::CompOp),
            "func_op" => Ok(OperatorType::FuncOp),
            "geom_op" => Ok(OperatorType::GeomOp),
            "unary_op" => Ok(OperatorType::UnaryOp),
            "join_op" => Ok(OperatorType::JoinOp),
            "bool_const" => Ok(OperatorType::BoolConst),
            _ => Err(PredicateError::MalformedJson(format!(
                "unknown operator type '{}'",
                s
            ))),
        }
    }
}

/// The fixed set of predicate operators.
///
/// Boolean constants carry their literal; on the wire they appear as a JSON
/// boolean in operator position (`["bool_const", true]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
    Intersects,
    Not,
    And,
    Or,
    Bool(bool),
}

impl Operator {
    /// Every operator, in wire-table order.
    pub const ALL: [Operator; 15] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Like,
        Operator::ILike,
        Operator::In,
        Operator::Intersects,
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Bool(true),
        Operator::Bool(false),
    ];

    pub fn kind(self) -> OperatorType {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte
            | Operator::Like
            | Operator::ILike => OperatorType::CompOp,
            Operator::In => OperatorType::FuncOp,
            Operator::Intersects => OperatorType::GeomOp,
            Operator::Not => OperatorType::UnaryOp,
            Operator::And | Operator::Or => OperatorType::JoinOp,
            Operator::Bool(_) => OperatorType::BoolConst,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::In => "in",
            Operator::Intersects => "intersects",
            Operator::Not => "not",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Bool(true) => "true",
            Operator::Bool(false) => "false",
        }
    }

    /// Operator as it appears in the wire array.
    pub fn token(self) -> Value {
        match self {
            Operator::Bool(b) => Value::Bool(b),
            other => Value::String(other.symbol().to_string()),
        }
    }

    /// Parse the operator element of a wire array.
    pub fn from_token(token: &Value) -> Result<Self, PredicateError> {
        match token {
            Value::Bool(b) => Ok(Operator::Bool(*b)),
            Value::String(s) => s.parse(),
            other => Err(PredicateError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parses string tokens only. The strings `"true"` and `"false"` are not
/// operators; boolean constants are written as JSON booleans.
impl FromStr for Operator {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            "like" => Ok(Operator::Like),
            "ilike" => Ok(Operator::ILike),
            "in" => Ok(Operator::In),
            "intersects" => Ok(Operator::Intersects),
            "not" => Ok(Operator::Not),
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            _ => Err(PredicateError::InvalidOperator(s.to_string())),
        }
    }
}

/// Operator combining the two branches of a join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn operator(self) -> Operator {
        match self {
            JoinOperator::And => Operator::And,
            JoinOperator::Or => Operator::Or,
        }
    }

    pub fn from_operator(operator: Operator) -> Option<Self> {
        match operator {
            Operator::And => Some(JoinOperator::And),
            Operator::Or => Some(JoinOperator::Or),
            _ => None,
        }
    }
}

impl fmt::Display for JoinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator().symbol())
    }
}
