// SPDX-License-Identifier: PMPL-1.0-or-later
//! Leaf clause editor: one `(field, operator, value)` comparison.

use std::sync::Arc;

use geoclause_predicate::{JoinOperator, Operator, Predicate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::editor::{EditorKind, ValueEditor};
use crate::error::{ClauseError, Result};
use crate::metadata::{FeatureTypeDef, FieldDef};
use crate::operators::{default_operator_for, operators_for, ClauseOperator};
use crate::row::{BranchPath, ClauseEvent, QueryRow, RowChrome};

const WILDCARD: char = '%';

/// Editor for a single comparison clause.
///
/// Holds the raw operator token as selected in the UI; it is only mapped to a
/// predicate operator when [`value`](QueryRow::value) is called. A predicate
/// the row cannot decompose (`false`, `not(and ..)`, `intersects`) is kept as
/// an opaque read-only row that reserializes unchanged.
#[derive(Debug)]
pub struct SimpleClauseView {
    chrome: RowChrome,
    feature_type: Arc<FeatureTypeDef>,
    field: Option<String>,
    operator: String,
    editor: Option<Box<dyn ValueEditor>>,
    negated: bool,
    opaque: Option<Predicate>,
}

/// Field, operator and value pulled out of a leaf predicate.
struct Decomposed {
    field: String,
    operator: ClauseOperator,
    value: Value,
}

fn decompose(predicate: &Predicate) -> Option<Decomposed> {
    let field = predicate.field_name()?.to_string();
    let operator = ClauseOperator::from_predicate(predicate.operator())?;
    let value = match operator {
        ClauseOperator::In => Value::Array(predicate.list_values()?.to_vec()),
        _ => predicate.literal_value()?.clone(),
    };
    let operator = match (operator, &value) {
        (ClauseOperator::Eq, Value::Null) => ClauseOperator::Null,
        (ClauseOperator::Ne, Value::Null) => ClauseOperator::NotNull,
        (op, _) => op,
    };
    Some(Decomposed {
        field,
        operator,
        value,
    })
}

impl SimpleClauseView {
    /// Build a row from a predicate. `Predicate::TRUE` gives a blank row.
    pub fn new(predicate: &Predicate, feature_type: Arc<FeatureTypeDef>, chrome: RowChrome) -> Self {
        let mut view = Self {
            chrome,
            feature_type,
            field: None,
            operator: String::new(),
            editor: None,
            negated: false,
            opaque: None,
        };
        if predicate.is_true() {
            return view;
        }

        let (inner, negated) = match (predicate.operator(), predicate.sub_predicates().next()) {
            (Operator::Not, Some(inner)) => (inner, true),
            _ => (predicate, false),
        };
        let loaded = decompose(inner).and_then(|parts| {
            let kind = EditorKind::for_clause(view.feature_type.field(&parts.field), parts.operator);
            if kind.is_none() && !parts.operator.is_pseudo() {
                return None;
            }
            Some((parts, kind))
        });

        match loaded {
            Some((parts, kind)) => {
                view.editor = kind.map(|kind| {
                    let mut editor = kind.build();
                    editor.set_value(parts.value);
                    editor
                });
                view.field = Some(parts.field);
                view.operator = parts.operator.token().to_string();
                view.negated = negated;
            }
            None => {
                warn!(predicate = %predicate, "clause cannot be edited, keeping it read-only");
                view.opaque = Some(predicate.clone());
            }
        }
        view
    }

    /// Blank row at `path`.
    pub fn blank(feature_type: Arc<FeatureTypeDef>, path: BranchPath) -> Self {
        Self::new(&Predicate::TRUE, feature_type, RowChrome::new(path, JoinOperator::default()))
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn field_def(&self) -> Option<&FieldDef> {
        self.field.as_deref().and_then(|name| self.feature_type.field(name))
    }

    /// Raw operator token as last selected.
    pub fn operator_token(&self) -> &str {
        &self.operator
    }

    pub fn clause_operator(&self) -> Option<ClauseOperator> {
        ClauseOperator::from_token(&self.operator)
    }

    /// Operators to offer for the selected field.
    pub fn available_operators(&self) -> Vec<ClauseOperator> {
        operators_for(self.field_def())
    }

    /// Raw editor content, `None` when the row has no editor.
    pub fn editor_value(&self) -> Option<Value> {
        self.editor.as_ref().map(|editor| editor.value())
    }

    pub fn editor_kind(&self) -> Option<EditorKind> {
        self.editor.as_ref().map(|editor| editor.kind())
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque.is_some()
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.opaque.is_some() {
            return Err(ClauseError::ReadOnly(self.chrome.path.clone()));
        }
        Ok(())
    }

    fn rebuild_editor(&mut self) {
        let kind = self
            .clause_operator()
            .and_then(|op| EditorKind::for_clause(self.field_def(), op));
        self.editor = kind.map(|kind| kind.build());
    }

    /// Select a field, or clear it with `None`.
    ///
    /// Resets the operator to the field type's default and clears the value.
    pub fn set_field(&mut self, field: Option<&str>) -> Result<()> {
        self.ensure_editable()?;
        match field {
            Some(name) => {
                let def = self.feature_type.field(name).ok_or_else(|| ClauseError::UnknownField {
                    feature_type: self.feature_type.name.clone(),
                    field: name.to_string(),
                })?;
                self.operator = default_operator_for(Some(def)).token().to_string();
                self.field = Some(name.to_string());
            }
            None => {
                self.field = None;
                self.operator.clear();
            }
        }
        self.rebuild_editor();
        self.chrome.message = None;
        Ok(())
    }

    /// Select an operator by its UI token.
    ///
    /// The entered value survives the switch: a scalar becomes a one-item list
    /// for `in`, and a list keeps its first item when leaving `in`. Unknown
    /// tokens are stored as-is and surface as
    /// [`ClauseError::UnhandledOperator`] from `value`.
    pub fn set_operator(&mut self, token: &str) -> Result<()> {
        self.ensure_editable()?;
        let previous = self.editor_value();
        self.operator = token.to_string();
        self.rebuild_editor();

        if let (Some(editor), Some(previous)) = (self.editor.as_mut(), previous) {
            let carried = match previous {
                Value::Array(items) if !editor.kind().is_array() => {
                    items.into_iter().next().unwrap_or(Value::Null)
                }
                other => other,
            };
            editor.set_value(carried);
        }
        self.chrome.message = None;
        Ok(())
    }

    pub fn set_value(&mut self, value: Value) -> Result<()> {
        self.ensure_editable()?;
        let editor = self
            .editor
            .as_mut()
            .ok_or_else(|| ClauseError::NoValueEditor(self.chrome.path.clone()))?;
        editor.set_value(value);
        self.chrome.message = None;
        Ok(())
    }

    pub fn set_negated(&mut self, negated: bool) -> Result<()> {
        self.ensure_editable()?;
        self.negated = negated;
        Ok(())
    }

    /// A real operator picked but no value entered yet.
    ///
    /// Such a row serializes as `field = null`, which reloads as the
    /// "is not populated" pseudo-operator, so the tree carries the token
    /// across rebuilds.
    pub(crate) fn is_unfinished(&self) -> bool {
        self.opaque.is_none()
            && self.field.is_some()
            && self.clause_operator().is_some_and(|op| !op.is_pseudo())
            && self.editor_value().unwrap_or(Value::Null).is_null()
    }

    /// Put back an operator token lost in a rebuild, keeping an empty editor.
    pub(crate) fn restore_operator(&mut self, token: &str) {
        if self.opaque.is_some() || self.operator == token {
            return;
        }
        self.operator = token.to_string();
        self.rebuild_editor();
    }

    /// Turn this leaf into `self AND true`, addressed to this row's path.
    pub fn morph_to_join_clause(&self) -> Result<ClauseEvent> {
        let predicate = self.value()?.and(&Predicate::TRUE);
        debug!(path = %self.chrome.path, "morphing clause into join");
        Ok(ClauseEvent::Replace {
            path: self.chrome.path.clone(),
            predicate,
        })
    }
}

fn wrap_pattern(value: Value) -> Value {
    match value {
        Value::String(s) if !s.is_empty() && !s.contains(WILDCARD) => {
            Value::String(format!("{WILDCARD}{s}{WILDCARD}"))
        }
        other => other,
    }
}

impl QueryRow for SimpleClauseView {
    fn chrome(&self) -> &RowChrome {
        &self.chrome
    }

    fn chrome_mut(&mut self) -> &mut RowChrome {
        &mut self.chrome
    }

    fn value(&self) -> Result<Predicate> {
        if let Some(predicate) = &self.opaque {
            return Ok(predicate.clone());
        }
        let Some(field) = self.field.as_deref() else {
            return Ok(Predicate::TRUE);
        };
        let operator = self
            .clause_operator()
            .ok_or_else(|| ClauseError::UnhandledOperator(self.operator.clone()))?;
        let value = self.editor_value().unwrap_or(Value::Null);

        let leaf = match operator {
            ClauseOperator::Eq => Predicate::eq(field, value),
            ClauseOperator::Ne => Predicate::ne(field, value),
            ClauseOperator::Gt => Predicate::gt(field, value),
            ClauseOperator::Gte => Predicate::gte(field, value),
            ClauseOperator::Lt => Predicate::lt(field, value),
            ClauseOperator::Lte => Predicate::lte(field, value),
            ClauseOperator::Like => Predicate::like(field, wrap_pattern(value)),
            ClauseOperator::ILike => Predicate::ilike(field, wrap_pattern(value)),
            ClauseOperator::In => match value {
                Value::Array(values) => Predicate::in_list(field, values),
                Value::Null => Predicate::in_list(field, Vec::<Value>::new()),
                scalar => Predicate::in_list(field, [scalar]),
            },
            ClauseOperator::Null => Predicate::eq(field, Value::Null),
            ClauseOperator::NotNull => Predicate::ne(field, Value::Null),
        };
        Ok(if self.negated { leaf.negate() } else { leaf })
    }

    fn validate_value(&mut self) -> bool {
        let outcome = match (&self.opaque, &self.field, &self.editor) {
            (None, Some(_), Some(editor)) => editor.validate(&editor.value()),
            _ => Ok(()),
        };
        match outcome {
            Ok(()) => {
                self.chrome.message = None;
                true
            }
            Err(message) => {
                debug!(path = %self.chrome.path, %message, "clause value rejected");
                self.chrome.message = Some(message);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::BaseType;
    use serde_json::json;

    fn pole() -> Arc<FeatureTypeDef> {
        Arc::new(FeatureTypeDef::new(
            "pole",
            vec![
                FieldDef::new("status", BaseType::String).with_enum(["ok", "faulty"]),
                FieldDef::new("height", BaseType::Double),
                FieldDef::new("name", BaseType::String),
                FieldDef::new("location", BaseType::Other),
            ],
        ))
    }

    fn row(predicate: &Predicate) -> SimpleClauseView {
        SimpleClauseView::new(predicate, pole(), RowChrome::new(BranchPath::root(), JoinOperator::And))
    }

    #[test]
    fn test_blank_clause_is_true() {
        let view = SimpleClauseView::blank(pole(), BranchPath::root());
        assert_eq!(view.field(), None);
        assert_eq!(view.value().unwrap(), Predicate::TRUE);
        assert_eq!(view.value().unwrap().as_json(), json!(["bool_const", true]));
    }

    #[test]
    fn test_leaf_decomposition() {
        let view = row(&Predicate::gt("height", 10));
        assert_eq!(view.field(), Some("height"));
        assert_eq!(view.clause_operator(), Some(ClauseOperator::Gt));
        assert_eq!(view.editor_value(), Some(json!(10)));
        assert_eq!(view.value().unwrap(), Predicate::gt("height", 10));
    }

    #[test]
    fn test_null_operator_round_trip() {
        let view = row(&Predicate::eq("status", Value::Null));
        assert_eq!(view.operator_token(), "null");
        assert!(view.editor_kind().is_none());
        assert_eq!(view.value().unwrap(), Predicate::eq("status", Value::Null));

        let view = row(&Predicate::ne("status", Value::Null));
        assert_eq!(view.operator_token(), "not_null");
        assert_eq!(view.value().unwrap(), Predicate::ne("status", Value::Null));
    }

    #[test]
    fn test_wildcard_auto_wrap() {
        let mut view = SimpleClauseView::blank(pole(), BranchPath::root());
        view.set_field(Some("name")).unwrap();
        view.set_operator("like").unwrap();
        view.set_value(json!("foo")).unwrap();
        assert_eq!(view.value().unwrap(), Predicate::like("name", "%foo%"));

        view.set_value(json!("fo%o")).unwrap();
        assert_eq!(view.value().unwrap(), Predicate::like("name", "fo%o"));

        view.set_operator("ilike").unwrap();
        assert_eq!(view.value().unwrap(), Predicate::ilike("name", "fo%o"));
    }

    #[test]
    fn test_field_change_resets_operator_and_value() {
        let mut view = row(&Predicate::eq("name", "main"));
        view.set_field(Some("height")).unwrap();
        assert_eq!(view.clause_operator(), Some(ClauseOperator::Eq));
        assert_eq!(view.editor_value(), Some(Value::Null));
        assert_eq!(view.editor_kind(), Some(EditorKind::Number { integer: false }));

        view.set_field(Some("location")).unwrap();
        assert_eq!(view.clause_operator(), Some(ClauseOperator::NotNull));
        assert!(view.editor_kind().is_none());

        let err = view.set_field(Some("colour")).unwrap_err();
        assert!(matches!(err, ClauseError::UnknownField { .. }));
    }

    #[test]
    fn test_operator_switch_keeps_value() {
        let mut view = row(&Predicate::eq("height", 10));
        view.set_operator("in").unwrap();
        assert_eq!(view.value().unwrap(), Predicate::in_list("height", [10]));

        view.set_value(json!([10, 12])).unwrap();
        view.set_operator(">").unwrap();
        assert_eq!(view.value().unwrap(), Predicate::gt("height", 10));
    }

    #[test]
    fn test_unhandled_operator() {
        let mut view = row(&Predicate::eq("height", 10));
        view.set_operator("between").unwrap();
        assert_eq!(
            view.value().unwrap_err(),
            ClauseError::UnhandledOperator("between".into())
        );
    }

    #[test]
    fn test_validation_sets_inline_message() {
        let mut view = row(&Predicate::eq("height", "ten"));
        assert!(!view.validate_value());
        assert!(view.message().unwrap().contains("not a number"));

        view.set_value(json!("10")).unwrap();
        assert!(view.message().is_none());
        assert!(view.validate_value());
        assert_eq!(view.value().unwrap(), Predicate::eq("height", 10));
    }

    #[test]
    fn test_pseudo_operator_is_always_valid() {
        let mut view = row(&Predicate::eq("height", Value::Null));
        assert!(view.validate_value());
        assert_eq!(
            view.set_value(json!(1)).unwrap_err(),
            ClauseError::NoValueEditor(BranchPath::root())
        );
    }

    #[test]
    fn test_unfinished_row() {
        let mut view = SimpleClauseView::blank(pole(), BranchPath::root());
        assert!(!view.is_unfinished());
        view.set_field(Some("height")).unwrap();
        assert!(view.is_unfinished());

        let mut reloaded = row(&view.value().unwrap());
        assert_eq!(reloaded.operator_token(), "null");
        reloaded.restore_operator(view.operator_token());
        assert_eq!(reloaded.clause_operator(), Some(ClauseOperator::Eq));
        assert!(!reloaded.validate_value());

        view.set_value(json!(3)).unwrap();
        assert!(!view.is_unfinished());
    }

    #[test]
    fn test_empty_string_literal_round_trips() {
        let original = Predicate::eq("name", "");
        let mut view = row(&original);
        assert_eq!(view.clause_operator(), Some(ClauseOperator::Eq));
        assert_eq!(view.value().unwrap(), original);
        assert!(!view.validate_value());
    }

    #[test]
    fn test_negated_leaf() {
        let original = Predicate::eq("status", "ok").negate();
        let mut view = row(&original);
        assert!(view.is_negated());
        assert!(!view.is_opaque());
        assert_eq!(view.value().unwrap(), original);

        view.set_negated(false).unwrap();
        assert_eq!(view.value().unwrap(), Predicate::eq("status", "ok"));
    }

    #[test]
    fn test_undecomposable_predicates_are_opaque() {
        let nested = Predicate::eq("a", 1).and(&Predicate::eq("b", 2)).negate();
        let area = serde_json::json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 1], [0, 0]]]});
        for original in [Predicate::FALSE, nested, Predicate::intersects("location", area)] {
            let mut view = row(&original);
            assert!(view.is_opaque(), "{}", original);
            assert!(view.validate_value());
            assert_eq!(view.value().unwrap(), original);
            assert_eq!(view.set_field(Some("height")).unwrap_err(), ClauseError::ReadOnly(BranchPath::root()));
        }
    }

    #[test]
    fn test_morph_requests_join_with_true() {
        let view = SimpleClauseView::new(
            &Predicate::eq("status", "ok"),
            pole(),
            RowChrome::new(BranchPath::root().child(1), JoinOperator::Or),
        );
        assert_eq!(
            view.morph_to_join_clause().unwrap(),
            ClauseEvent::Replace {
                path: BranchPath::root().child(1),
                predicate: Predicate::eq("status", "ok").and(&Predicate::TRUE),
            }
        );
        assert_eq!(view.remove(), ClauseEvent::Remove { path: BranchPath::root().child(1) });
    }
}
