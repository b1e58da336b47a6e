// SPDX-License-Identifier: PMPL-1.0-or-later
//! Pluggable value editors.
//!
//! A simple clause owns at most one editor, chosen from the field's base type
//! through [`EditorKind::for_field`]. Editors hold whatever the user entered
//! and coerce it on read (`"10"` becomes `10` in a number editor). Blank
//! input is read back unchanged and only rejected by `validate`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::metadata::{BaseType, FieldDef};
use crate::operators::ClauseOperator;

const REQUIRED: &str = "A value is required";

/// Capability set every value editor provides.
pub trait ValueEditor: fmt::Debug + Send + Sync {
    /// Current value, coerced to the editor's type where possible.
    fn value(&self) -> Value;

    fn set_value(&mut self, value: Value);

    /// `Ok(())` when `value` is acceptable, otherwise a user-facing message.
    fn validate(&self, value: &Value) -> Result<(), String>;

    fn kind(&self) -> EditorKind;
}

/// Concrete editor types, keyed from field metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorKind {
    Text,
    Enum(Vec<String>),
    Number { integer: bool },
    Date,
    Timestamp,
    Boolean,
    Array(Box<EditorKind>),
}

impl EditorKind {
    /// Scalar editor for a field, `None` for types that cannot be edited.
    pub fn for_field(field: &FieldDef) -> Option<EditorKind> {
        if let (BaseType::String, Some(values)) = (field.base_type, &field.enum_values) {
            return Some(EditorKind::Enum(values.clone()));
        }
        match field.base_type {
            BaseType::String => Some(EditorKind::Text),
            BaseType::Integer => Some(EditorKind::Number { integer: true }),
            BaseType::Double | BaseType::Numeric => Some(EditorKind::Number { integer: false }),
            BaseType::Date => Some(EditorKind::Date),
            BaseType::Timestamp => Some(EditorKind::Timestamp),
            BaseType::Boolean => Some(EditorKind::Boolean),
            BaseType::Other => None,
        }
    }

    /// Editor for a clause's field and operator.
    ///
    /// Pseudo-operators take no editor; `in` wraps the scalar editor in an
    /// array editor; fields missing from the dictionary fall back to text.
    pub fn for_clause(field: Option<&FieldDef>, operator: ClauseOperator) -> Option<EditorKind> {
        if operator.is_pseudo() {
            return None;
        }
        let scalar = match field {
            Some(f) => EditorKind::for_field(f)?,
            None => EditorKind::Text,
        };
        Some(if operator == ClauseOperator::In {
            EditorKind::Array(Box::new(scalar))
        } else {
            scalar
        })
    }

    pub fn build(&self) -> Box<dyn ValueEditor> {
        match self {
            EditorKind::Text => Box::new(TextEditor::default()),
            EditorKind::Enum(values) => Box::new(EnumEditor::new(values.clone())),
            EditorKind::Number { integer } => Box::new(NumberEditor::new(*integer)),
            EditorKind::Date => Box::new(DateEditor::default()),
            EditorKind::Timestamp => Box::new(TimestampEditor::default()),
            EditorKind::Boolean => Box::new(BooleanSelect::default()),
            EditorKind::Array(item) => Box::new(ArrayFieldEditor::new((**item).clone())),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, EditorKind::Array(_))
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Scalar editors
// ---------------------------------------------------------------------------

/// Free text input.
#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    value: Value,
}

impl ValueEditor for TextEditor {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        match value {
            Value::String(_) | Value::Number(_) => Ok(()),
            other => Err(format!("{} is not text", other)),
        }
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Text
    }
}

/// Dropdown over a string enumeration.
#[derive(Debug, Clone)]
pub struct EnumEditor {
    allowed: Vec<String>,
    value: Value,
}

impl EnumEditor {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed,
            value: Value::Null,
        }
    }
}

impl ValueEditor for EnumEditor {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        match value.as_str() {
            Some(s) if self.allowed.iter().any(|a| a == s) => Ok(()),
            _ => Err(format!("{} is not one of: {}", value, self.allowed.join(", "))),
        }
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Enum(self.allowed.clone())
    }
}

/// Integer or decimal input. Numeric strings are coerced to numbers.
#[derive(Debug, Clone)]
pub struct NumberEditor {
    integer: bool,
    value: Value,
}

impl NumberEditor {
    pub fn new(integer: bool) -> Self {
        Self {
            integer,
            value: Value::Null,
        }
    }
}

impl ValueEditor for NumberEditor {
    fn value(&self) -> Value {
        let Value::String(text) = &self.value else {
            return self.value.clone();
        };
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Value::from(i);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::from(f),
            _ => self.value.clone(),
        }
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        let Value::Number(n) = value else {
            return Err(format!("{} is not a number", value));
        };
        if self.integer && !(n.is_i64() || n.is_u64()) {
            return Err(format!("{} is not a whole number", n));
        }
        Ok(())
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Number {
            integer: self.integer,
        }
    }
}

/// Calendar date, `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct DateEditor {
    value: Value,
}

impl ValueEditor for DateEditor {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .map(|_| ())
            .ok_or_else(|| format!("{} is not a date (YYYY-MM-DD)", value))
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Date
    }
}

/// Date and time, RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Default)]
pub struct TimestampEditor {
    value: Value,
}

fn parse_timestamp(text: &str) -> bool {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
}

impl ValueEditor for TimestampEditor {
    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        match value.as_str() {
            Some(s) if parse_timestamp(s) => Ok(()),
            _ => Err(format!("{} is not a timestamp", value)),
        }
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Timestamp
    }
}

/// Yes/no dropdown. Accepts `"true"`/`"false"` strings from the UI.
#[derive(Debug, Clone, Default)]
pub struct BooleanSelect {
    value: Value,
}

impl ValueEditor for BooleanSelect {
    fn value(&self) -> Value {
        match self.value.as_str() {
            Some("true") => Value::Bool(true),
            Some("false") => Value::Bool(false),
            _ => self.value.clone(),
        }
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if is_blank(value) {
            return Err(REQUIRED.to_string());
        }
        match value {
            Value::Bool(_) => Ok(()),
            other => Err(format!("{} is not true or false", other)),
        }
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Boolean
    }
}

// ---------------------------------------------------------------------------
// Array editor
// ---------------------------------------------------------------------------

/// List of values for `in` clauses, one scalar editor per item.
#[derive(Debug)]
pub struct ArrayFieldEditor {
    item_kind: EditorKind,
    items: Vec<Box<dyn ValueEditor>>,
}

impl ArrayFieldEditor {
    pub fn new(item_kind: EditorKind) -> Self {
        Self {
            item_kind,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        let mut editor = self.item_kind.build();
        editor.set_value(value);
        self.items.push(editor);
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index).value())
    }
}

impl ValueEditor for ArrayFieldEditor {
    fn value(&self) -> Value {
        Value::Array(self.items.iter().map(|editor| editor.value()).collect())
    }

    /// Arrays replace the item list; a scalar becomes a one-item list.
    fn set_value(&mut self, value: Value) {
        self.items.clear();
        match value {
            Value::Array(values) => values.into_iter().for_each(|v| self.push(v)),
            Value::Null => {}
            scalar => self.push(scalar),
        }
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(values) = value.as_array() else {
            return Err(format!("{} is not a list", value));
        };
        if values.is_empty() {
            return Err("At least one value is required".to_string());
        }
        let checker = self.item_kind.build();
        for (index, item) in values.iter().enumerate() {
            checker
                .validate(item)
                .map_err(|message| format!("Item {}: {}", index + 1, message))?;
        }
        Ok(())
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Array(Box::new(self.item_kind.clone()))
    }
}
