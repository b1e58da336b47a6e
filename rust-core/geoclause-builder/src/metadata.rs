// SPDX-License-Identifier: PMPL-1.0-or-later
//! Feature-type field metadata (the data dictionary).
//!
//! Supplied by the datasource; drives which operators and value editors a
//! clause offers for each field.

use serde::{Deserialize, Serialize};

/// Base type of a field as reported by the data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    String,
    Date,
    Timestamp,
    Integer,
    Double,
    Numeric,
    Boolean,
    /// Geometry, image, link and other types the query builder cannot filter on.
    #[serde(other)]
    Other,
}

impl BaseType {
    pub fn is_numeric(self) -> bool {
        matches!(self, BaseType::Integer | BaseType::Double | BaseType::Numeric)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, BaseType::Date | BaseType::Timestamp)
    }
}

/// One field of a feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub internal_name: String,
    pub external_name: String,
    #[serde(rename = "baseType")]
    pub base_type: BaseType,
    /// Allowed values for string enumerations.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl FieldDef {
    pub fn new(internal_name: impl Into<String>, base_type: BaseType) -> Self {
        let internal_name = internal_name.into();
        Self {
            external_name: internal_name.clone(),
            internal_name,
            base_type,
            enum_values: None,
        }
    }

    pub fn with_external_name(mut self, external_name: impl Into<String>) -> Self {
        self.external_name = external_name.into();
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_enum(&self) -> bool {
        self.base_type == BaseType::String && self.enum_values.is_some()
    }
}

/// Metadata for one feature type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTypeDef {
    pub name: String,
    #[serde(default)]
    pub external_name: String,
    /// Fields in display order.
    pub fields: Vec<FieldDef>,
    /// Geometry field used for viewport and selection filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_geom_name: Option<String>,
}

impl FeatureTypeDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let name = name.into();
        Self {
            external_name: name.clone(),
            name,
            fields,
            primary_geom_name: None,
        }
    }

    pub fn with_primary_geom(mut self, field: impl Into<String>) -> Self {
        self.primary_geom_name = Some(field.into());
        self
    }

    pub fn field(&self, internal_name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.internal_name == internal_name)
    }

    /// Fields offered in the clause field dropdown.
    pub fn queryable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.base_type != BaseType::Other)
    }
}
