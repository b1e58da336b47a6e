// SPDX-License-Identifier: PMPL-1.0-or-later
//! Wire-format decoding and serde integration.
//!
//! Encoding lives on [`Predicate::as_json`]; this module adds the inverse so
//! a saved query can be loaded back into the clause builder.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{PredicateError, Result};
use crate::operand::Operand;
use crate::operator::{Operator, OperatorType};
use crate::predicate::Predicate;

impl Predicate {
    /// Decode `[type, operator, ...operands]`.
    ///
    /// The `type` tag must agree with the operator's classification and the
    /// operands must satisfy the same checks as [`Predicate::new`].
    pub fn from_json(value: &Value) -> Result<Predicate> {
        let items = value
            .as_array()
            .ok_or_else(|| PredicateError::MalformedJson(format!("expected array, got {}", value)))?;
        if items.len() < 2 {
            return Err(PredicateError::MalformedJson(format!(
                "predicate array needs [type, operator], got {} element(s)",
                items.len()
            )));
        }

        let tag = items[0]
            .as_str()
            .ok_or_else(|| PredicateError::MalformedJson("type tag is not a string".to_string()))?;
        let declared: OperatorType = tag.parse()?;
        let operator = Operator::from_token(&items[1])?;
        if operator.kind() != declared {
            return Err(PredicateError::TypeMismatch {
                tag: tag.to_string(),
                operator: operator.to_string(),
                expected: operator.kind().as_str(),
            });
        }

        let operands = items[2..]
            .iter()
            .map(Operand::from_json)
            .collect::<Result<Vec<_>>>()?;
        Predicate::new(operator, operands)
    }

    /// Decode from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Predicate> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PredicateError::MalformedJson(e.to_string()))?;
        Predicate::from_json(&value)
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Predicate::from_json(&value).map_err(D::Error::custom)
    }
}
