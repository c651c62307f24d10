//! # Form Fields
//!
//! A [`FormField`] pairs a schema [`FieldDefinition`] with whatever the user
//! has typed so far. Forms are rebuilt from the schema whenever the geometry
//! changes.

use serde::{Deserialize, Serialize};

use crate::schema::FieldDefinition;

/// Raw user input for one field: a number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnteredValue {
    Number(f64),
    Text(String),
}

impl EnteredValue {
    /// The value as a finite number, if it reads as one.
    ///
    /// Text is trimmed before parsing; empty text is `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            EnteredValue::Number(n) => *n,
            EnteredValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// True for empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        matches!(self, EnteredValue::Text(text) if text.trim().is_empty())
    }
}

impl From<f64> for EnteredValue {
    fn from(value: f64) -> Self {
        EnteredValue::Number(value)
    }
}

impl From<&str> for EnteredValue {
    fn from(value: &str) -> Self {
        EnteredValue::Text(value.to_string())
    }
}

/// One editable field of the current form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(flatten)]
    pub definition: FieldDefinition,
    #[serde(rename = "enteredValue")]
    pub entered: Option<EnteredValue>,
}

impl FormField {
    /// Fresh field with nothing entered.
    pub fn new(definition: FieldDefinition) -> Self {
        Self {
            definition,
            entered: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    /// Nothing entered, or only blank text
    pub fn is_empty(&self) -> bool {
        self.entered.as_ref().map_or(true, EnteredValue::is_blank)
    }
}

/// Build an empty form from schema fields.
pub fn fields_from_schema(schema: &[FieldDefinition]) -> Vec<FormField> {
    schema.iter().cloned().map(FormField::new).collect()
}
