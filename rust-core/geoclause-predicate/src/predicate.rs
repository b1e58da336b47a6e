// SPDX-License-Identifier: PMPL-1.0-or-later
//! The predicate expression tree.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{PredicateError, Result};
use crate::operand::{GeometryArg, Operand};
use crate::operator::{JoinOperator, Operator, OperatorType};

/// One clause or boolean combination of clauses.
///
/// Predicates are values: combinators (`and`, `or`, `negate`) always build a
/// new tree and never touch `self`. Nested predicates are shared through
/// `Arc`, so combining is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    operator: Operator,
    operands: Vec<Operand>,
}

impl Predicate {
    /// The always-true predicate, used as the neutral blank clause.
    pub const TRUE: Predicate = Predicate {
        operator: Operator::Bool(true),
        operands: Vec::new(),
    };

    /// The always-false predicate.
    pub const FALSE: Predicate = Predicate {
        operator: Operator::Bool(false),
        operands: Vec::new(),
    };

    /// Build a predicate, checking arity and operand kinds for the operator.
    pub fn new(operator: Operator, operands: Vec<Operand>) -> Result<Self> {
        check_operands(operator, &operands)?;
        Ok(Self { operator, operands })
    }

    /// Build a predicate from a raw operator token such as `"="` or `"and"`.
    ///
    /// Fails with [`PredicateError::InvalidOperator`] for unknown tokens.
    pub fn parse(operator: &str, operands: Vec<Operand>) -> Result<Self> {
        Self::new(operator.parse()?, operands)
    }

    fn leaf(operator: Operator, field_name: impl Into<String>, value: Operand) -> Self {
        Self {
            operator,
            operands: vec![Operand::field(field_name), value],
        }
    }

    fn join(operator: Operator, left: &Predicate, right: &Predicate) -> Self {
        Self {
            operator,
            operands: vec![
                Operand::Predicate(Arc::new(left.clone())),
                Operand::Predicate(Arc::new(right.clone())),
            ],
        }
    }

    // -- Comparison factories ----------------------------------------------

    pub fn eq(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Eq, field_name, Operand::literal(value))
    }

    pub fn ne(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Ne, field_name, Operand::literal(value))
    }

    pub fn gt(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Gt, field_name, Operand::literal(value))
    }

    pub fn gte(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Gte, field_name, Operand::literal(value))
    }

    pub fn lt(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Lt, field_name, Operand::literal(value))
    }

    pub fn lte(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(Operator::Lte, field_name, Operand::literal(value))
    }

    pub fn like(field_name: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::leaf(Operator::Like, field_name, Operand::literal(pattern))
    }

    pub fn ilike(field_name: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::leaf(Operator::ILike, field_name, Operand::literal(pattern))
    }

    /// `field in (values...)`, a `func_op` with a list operand.
    pub fn in_list<I, V>(field_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::leaf(Operator::In, field_name, Operand::list(values))
    }

    /// Spatial intersection with a polygon source or raw GeoJSON geometry.
    pub fn intersects<'a>(field_name: impl Into<String>, geometry: impl Into<GeometryArg<'a>>) -> Self {
        Self::leaf(Operator::Intersects, field_name, Operand::geom(geometry))
    }

    // -- Combinators -------------------------------------------------------

    /// `self AND other`. Never flattens: chained calls build a left-leaning
    /// binary tree.
    pub fn and(&self, other: &Predicate) -> Predicate {
        Self::join(Operator::And, self, other)
    }

    /// `self OR other`.
    pub fn or(&self, other: &Predicate) -> Predicate {
        Self::join(Operator::Or, self, other)
    }

    pub fn combine(&self, join: JoinOperator, other: &Predicate) -> Predicate {
        Self::join(join.operator(), self, other)
    }

    pub fn negate(&self) -> Predicate {
        Self {
            operator: Operator::Not,
            operands: vec![Operand::Predicate(Arc::new(self.clone()))],
        }
    }

    /// Left-fold `first AND rest[0] AND rest[1] ...`.
    ///
    /// With no further predicates, `first` is returned unchanged.
    pub fn and_all(first: Predicate, rest: impl IntoIterator<Item = Predicate>) -> Predicate {
        rest.into_iter().fold(first, |acc, next| acc.and(&next))
    }

    /// Left-fold `first OR rest[0] OR rest[1] ...`.
    pub fn or_all(first: Predicate, rest: impl IntoIterator<Item = Predicate>) -> Predicate {
        rest.into_iter().fold(first, |acc, next| acc.or(&next))
    }

    // -- Accessors ---------------------------------------------------------

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn kind(&self) -> OperatorType {
        self.operator.kind()
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn is_true(&self) -> bool {
        self.operator == Operator::Bool(true)
    }

    pub fn is_false(&self) -> bool {
        self.operator == Operator::Bool(false)
    }

    /// Name of the first field-tagged operand, if any.
    pub fn field_name(&self) -> Option<&str> {
        self.operands.iter().find_map(|operand| match operand {
            Operand::Field { field_name } => Some(field_name.as_str()),
            _ => None,
        })
    }

    /// Value of the first literal-tagged operand, if any.
    pub fn literal_value(&self) -> Option<&Value> {
        self.operands.iter().find_map(|operand| match operand {
            Operand::Literal { value } => Some(value),
            _ => None,
        })
    }

    /// Values of the first list-tagged operand, if any.
    pub fn list_values(&self) -> Option<&[Value]> {
        self.operands.iter().find_map(|operand| match operand {
            Operand::List { values } => Some(values.as_slice()),
            _ => None,
        })
    }

    pub fn geometry(&self) -> Option<&Value> {
        self.operands.iter().find_map(|operand| match operand {
            Operand::Geom { value } => Some(value),
            _ => None,
        })
    }

    /// Nested predicate operands, in order.
    pub fn sub_predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.operands.iter().filter_map(Operand::as_predicate)
    }

    /// Distinct field names referenced anywhere in the tree, depth-first.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut Vec<&'a str>) {
        for operand in &self.operands {
            match operand {
                Operand::Field { field_name } => {
                    if !fields.contains(&field_name.as_str()) {
                        fields.push(field_name.as_str());
                    }
                }
                Operand::Predicate(p) => p.collect_fields(fields),
                _ => {}
            }
        }
    }

    // -- Serialization -----------------------------------------------------

    /// Wire form: `[type, operator, ...operands]`.
    pub fn as_json(&self) -> Value {
        let mut array = Vec::with_capacity(self.operands.len() + 2);
        array.push(Value::String(self.kind().as_str().to_string()));
        array.push(self.operator.token());
        array.extend(self.operands.iter().map(Operand::as_json));
        Value::Array(array)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::TRUE
    }
}

/// Compact JSON of the wire form, usable as a cache key.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_json())
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

impl std::ops::Not for &Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

fn check_operands(operator: Operator, operands: &[Operand]) -> Result<()> {
    let kind = operator.kind();
    if operands.len() != kind.arity() {
        return Err(PredicateError::Arity {
            operator: operator.to_string(),
            expected: kind.arity(),
            found: operands.len(),
        });
    }

    let expected: &[&'static str] = match kind {
        OperatorType::CompOp => &["field", "literal"],
        OperatorType::FuncOp => &["field", "list"],
        OperatorType::GeomOp => &["field", "geom"],
        OperatorType::UnaryOp => &["predicate"],
        OperatorType::JoinOp => &["predicate", "predicate"],
        OperatorType::BoolConst => &[],
    };
    for (position, (operand, want)) in operands.iter().zip(expected).enumerate() {
        if operand.kind_name() != *want {
            return Err(PredicateError::OperandShape {
                operator: operator.to_string(),
                position,
                expected: *want,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_factories_wire_form() {
        let cases = [
            (Predicate::eq("a", 1), "="),
            (Predicate::ne("a", 1), "<>"),
            (Predicate::gt("a", 1), ">"),
            (Predicate::gte("a", 1), ">="),
            (Predicate::lt("a", 1), "<"),
            (Predicate::lte("a", 1), "<="),
            (Predicate::like("a", 1), "like"),
            (Predicate::ilike("a", 1), "ilike"),
        ];
        for (predicate, symbol) in cases {
            assert_eq!(
                predicate.as_json(),
                json!(["comp_op", symbol, {"type": "field", "fieldName": "a"}, {"type": "literal", "value": 1}])
            );
        }
    }

    #[test]
    fn test_in_list_wire_form() {
        let p = Predicate::in_list("status", ["ok", "faulty"]);
        assert_eq!(
            p.as_json(),
            json!(["func_op", "in", {"type": "field", "fieldName": "status"}, {"type": "list", "values": ["ok", "faulty"]}])
        );
    }

    #[test]
    fn test_boolean_constants() {
        assert_eq!(Predicate::TRUE.as_json(), json!(["bool_const", true]));
        assert_eq!(Predicate::FALSE.as_json(), json!(["bool_const", false]));
        assert!(Predicate::TRUE.is_true());
        assert!(Predicate::FALSE.is_false());
        assert!(Predicate::TRUE.operands().is_empty());
        assert_eq!(Predicate::default(), Predicate::TRUE);
    }

    #[test]
    fn test_chained_and_is_left_leaning() {
        let (a, b, c) = (Predicate::eq("a", 1), Predicate::eq("b", 2), Predicate::eq("c", 3));
        let tree = Predicate::and_all(a.clone(), [b.clone(), c.clone()]);
        let json = tree.as_json();

        assert_eq!(json[0], "join_op");
        assert_eq!(json[1], "and");
        assert_eq!(json[2], a.and(&b).as_json(), "first operand is itself a join");
        assert_eq!(json[3], c.as_json());
        assert_eq!(json.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_single_argument_fold_is_identity() {
        let a = Predicate::gt("height", 10);
        assert_eq!(Predicate::and_all(a.clone(), []), a);
        assert_eq!(Predicate::or_all(a.clone(), Vec::new()), a);
    }

    #[test]
    fn test_combinators_do_not_mutate() {
        let a = Predicate::eq("a", 1);
        let before = a.as_json();
        let _ = a.and(&Predicate::TRUE);
        let _ = a.or(&Predicate::FALSE);
        let _ = a.negate();
        assert_eq!(a.as_json(), before);
        assert_eq!(a.operator(), Operator::Eq);
    }

    #[test]
    fn test_negate_and_not_operator() {
        let a = Predicate::eq("a", 1);
        let negated = !&a;
        assert_eq!(negated, a.negate());
        assert_eq!(negated.kind(), OperatorType::UnaryOp);
        assert_eq!(negated.sub_predicates().next(), Some(&a));
        assert_eq!(negated.as_json(), json!(["unary_op", "not", a.as_json()]));
    }

    #[test]
    fn test_combine_with_join_operator() {
        let (a, b) = (Predicate::eq("a", 1), Predicate::eq("b", 2));
        assert_eq!(a.combine(JoinOperator::Or, &b), a.or(&b));
        assert_eq!(a.combine(JoinOperator::And, &b), a.and(&b));
    }

    #[test]
    fn test_new_rejects_bad_arity() {
        let err = Predicate::new(Operator::Eq, vec![Operand::field("a")]).unwrap_err();
        assert_eq!(
            err,
            PredicateError::Arity { operator: "=".into(), expected: 2, found: 1 }
        );
        assert!(Predicate::new(Operator::Bool(true), vec![Operand::literal(true)]).is_err());
        assert!(Predicate::new(Operator::Not, vec![]).is_err());
    }

    #[test]
    fn test_new_rejects_bad_operand_kinds() {
        let err = Predicate::new(
            Operator::In,
            vec![Operand::field("a"), Operand::literal(1)],
        )
        .unwrap_err();
        assert!(matches!(err, PredicateError::OperandShape { position: 1, expected: "list", .. }));

        let err = Predicate::new(
            Operator::And,
            vec![Operand::predicate(Predicate::TRUE), Operand::field("a")],
        )
        .unwrap_err();
        assert!(matches!(err, PredicateError::OperandShape { position: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_operator() {
        let err = Predicate::parse("between", vec![]).unwrap_err();
        assert_eq!(err, PredicateError::InvalidOperator("between".into()));

        let ok = Predicate::parse("=", vec![Operand::field("a"), Operand::literal(1)]).unwrap();
        assert_eq!(ok, Predicate::eq("a", 1));
    }

    #[test]
    fn test_accessors() {
        let p = Predicate::eq("status", "faulty");
        assert_eq!(p.field_name(), Some("status"));
        assert_eq!(p.literal_value(), Some(&json!("faulty")));
        assert_eq!(p.list_values(), None);

        let list = Predicate::in_list("height", [1, 2]);
        assert_eq!(list.list_values(), Some(&[json!(1), json!(2)][..]));
        assert!(Predicate::TRUE.field_name().is_none());
    }

    #[test]
    fn test_referenced_fields_are_distinct() {
        let tree = Predicate::and_all(
            Predicate::eq("a", 1),
            [Predicate::gt("b", 2), Predicate::lt("a", 9).negate()],
        );
        assert_eq!(tree.referenced_fields(), vec!["a", "b"]);
    }

    #[test]
    fn test_display_is_compact_json() {
        let p = Predicate::eq("a", Value::Null);
        assert_eq!(
            p.to_string(),
            r#"["comp_op","=",{"fieldName":"a","type":"field"},{"type":"literal","value":null}]"#
        );
    }
}
