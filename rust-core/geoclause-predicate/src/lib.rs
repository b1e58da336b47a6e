// SPDX-License-Identifier: PMPL-1.0-or-later
//! Geoclause Predicate
//!
//! Query predicates for feature datasources: a small expression tree of
//! comparison, function, geometry, unary and boolean-join operators, and its
//! JSON wire format `[type, operator, ...operands]`.
//!
//! ```
//! use geoclause_predicate::Predicate;
//!
//! let p = Predicate::eq("status", "faulty").and(&Predicate::gt("height", 10));
//! assert_eq!(p.as_json()[1], "and");
//! ```

pub mod codec;
pub mod error;
pub mod operand;
pub mod operator;
pub mod predicate;

pub use error::PredicateError;
pub use operand::{GeometryArg, Operand};
pub use operator::{JoinOperator, Operator, OperatorType};
pub use predicate::Predicate;
