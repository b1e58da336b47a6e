// SPDX-License-Identifier: PMPL-1.0-or-later
//! Operand descriptors and geometry normalization.

use std::sync::Arc;

use geoclause_spatial::{polygon_geojson, PolygonSource};
use serde_json::{json, Map, Value};

use crate::error::PredicateError;
use crate::predicate::Predicate;

/// One operand of a predicate.
///
/// Leaf operands serialize as tagged objects (`{"type": "field", ...}`);
/// nested predicates serialize as their own wire array.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Predicate(Arc<Predicate>),
    Field { field_name: String },
    Literal { value: Value },
    List { values: Vec<Value> },
    /// GeoJSON geometry, normalized to `{"type": "Polygon", ...}` when built
    /// from a [`PolygonSource`].
    Geom { value: Value },
}

impl Operand {
    pub fn field(field_name: impl Into<String>) -> Self {
        Operand::Field {
            field_name: field_name.into(),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal {
            value: value.into(),
        }
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Operand::List {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn geom<'a>(geometry: impl Into<GeometryArg<'a>>) -> Self {
        let value = match geometry.into() {
            GeometryArg::Shape(shape) => polygon_geojson(shape.as_geometry()),
            GeometryArg::Raw(value) => value,
        };
        Operand::Geom { value }
    }

    pub fn predicate(predicate: Predicate) -> Self {
        Operand::Predicate(Arc::new(predicate))
    }

    pub fn as_predicate(&self) -> Option<&Predicate> {
        match self {
            Operand::Predicate(p) => Some(p.as_ref()),
            _ => None,
        }
    }

    /// Short name of the operand kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Predicate(_) => "predicate",
            Operand::Field { .. } => "field",
            Operand::Literal { .. } => "literal",
            Operand::List { .. } => "list",
            Operand::Geom { .. } => "geom",
        }
    }

    pub fn as_json(&self) -> Value {
        match self {
            Operand::Predicate(p) => p.as_json(),
            Operand::Field { field_name } => json!({ "type": "field", "fieldName": field_name }),
            Operand::Literal { value } => json!({ "type": "literal", "value": value }),
            Operand::List { values } => json!({ "type": "list", "values": values }),
            Operand::Geom { value } => json!({ "type": "geom", "value": value }),
        }
    }

    /// Decode one wire operand: a nested array or a tagged object.
    pub fn from_json(value: &Value) -> Result<Self, PredicateError> {
        match value {
            Value::Array(_) => Ok(Operand::predicate(Predicate::from_json(value)?)),
            Value::Object(object) => {
                let tag = object
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("operand object without a string 'type'"))?;
                match tag {
                    "field" => {
                        let field_name = object
                            .get("fieldName")
                            .and_then(Value::as_str)
                            .ok_or_else(|| malformed("field operand without 'fieldName'"))?;
                        Ok(Operand::field(field_name))
                    }
                    "literal" => Ok(Operand::Literal {
                        value: required(object, "value")?.clone(),
                    }),
                    "list" => {
                        let values = required(object, "values")?
                            .as_array()
                            .ok_or_else(|| malformed("list operand 'values' is not an array"))?;
                        Ok(Operand::List {
                            values: values.clone(),
                        })
                    }
                    "geom" => Ok(Operand::Geom {
                        value: required(object, "value")?.clone(),
                    }),
                    other => Err(malformed(&format!("unknown operand type '{}'", other))),
                }
            }
            other => Err(malformed(&format!("operand must be array or object, got {}", other))),
        }
    }
}

/// Geometry accepted by [`Predicate::intersects`](crate::Predicate::intersects).
///
/// A shape exposing a polygon conversion is normalized eagerly; any other
/// value is kept as-is and must already be GeoJSON-compatible.
pub enum GeometryArg<'a> {
    Shape(&'a dyn PolygonSource),
    Raw(Value),
}

impl<'a, T: PolygonSource> From<&'a T> for GeometryArg<'a> {
    fn from(shape: &'a T) -> Self {
        GeometryArg::Shape(shape)
    }
}

impl From<Value> for GeometryArg<'_> {
    fn from(value: Value) -> Self {
        GeometryArg::Raw(value)
    }
}

fn required<'v>(object: &'v Map<String, Value>, key: &str) -> Result<&'v Value, PredicateError> {
    object
        .get(key)
        .ok_or_else(|| malformed(&format!("operand without '{}'", key)))
}

fn malformed(message: &str) -> PredicateError {
    PredicateError::MalformedJson(message.to_string())
}
