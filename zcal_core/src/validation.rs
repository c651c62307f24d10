//! # Validation Engine
//!
//! Checks entered values against their field definitions.
//!
//! ## Rules
//!
//! - A value that reads as a finite number must lie in `[min, max]`.
//! - A blank, absent or non-numeric value is valid only when the field has
//!   a default to fall back on.
//! - [`validate_form`] checks every field and collects every error; it never
//!   stops at the first one.
//! - A form without any required field is invalid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::form::{EnteredValue, FormField};
use crate::schema::FieldDefinition;

/// Error key used for problems that belong to the form as a whole
pub const FORM_ERROR_KEY: &str = "form";

/// One failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Aggregated outcome of [`validate_form`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValidation {
    pub is_valid: bool,
    /// Field key → message
    pub errors: BTreeMap<String, String>,
}

impl FormValidation {
    /// `Ok(())` when valid, otherwise `CalcError::ValidationFailed`.
    pub fn into_result(self) -> CalcResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(CalcError::validation_failed(self.errors))
        }
    }
}

/// Check one value against its definition; `None` means valid.
pub fn validate_field(def: &FieldDefinition, value: Option<&EnteredValue>) -> Option<FieldError> {
    let error = |message: String| {
        Some(FieldError {
            field: def.key.clone(),
            message,
        })
    };

    match value.and_then(EnteredValue::as_number) {
        Some(number) if !def.in_range(number) => {
            let unit = if def.unit.is_empty() {
                String::new()
            } else {
                format!(" {}", def.unit)
            };
            error(format!(
                "{} must be between {} and {}{}",
                def.label, def.min, def.max, unit
            ))
        }
        Some(_) => None,
        None if def.default_value.is_some() => None,
        None => match value {
            Some(entered) if !entered.is_blank() => {
                error(format!("{} must be a number", def.label))
            }
            _ => error(format!("{} is required", def.label)),
        },
    }
}

/// Check every field of a form.
pub fn validate_form(fields: &[FormField]) -> FormValidation {
    let mut errors = BTreeMap::new();

    if !fields.iter().any(|f| f.definition.required) {
        errors.insert(
            FORM_ERROR_KEY.to_string(),
            "No required fields are defined for this form".to_string(),
        );
    }

    for field in fields {
        if let Some(err) = validate_field(&field.definition, field.entered.as_ref()) {
            errors.insert(err.field, err.message);
        }
    }

    FormValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields_from_schema;
    use crate::geometry::GeometryType;
    use crate::schema::get_schema;

    fn def(geometry: GeometryType, key: &str) -> FieldDefinition {
        get_schema(geometry).into_iter().find(|f| f.key == key).unwrap()
    }

    #[test]
    fn test_in_range_number() {
        let width = def(GeometryType::Microstrip, "width");
        assert_eq!(validate_field(&width, Some(&EnteredValue::Number(10.0))), None);
        assert_eq!(validate_field(&width, Some(&EnteredValue::from("0.1"))), None);
        assert_eq!(validate_field(&width, Some(&EnteredValue::Number(1000.0))), None);
    }

    #[test]
    fn test_out_of_range() {
        let width = def(GeometryType::Microstrip, "width");
        let err = validate_field(&width, Some(&EnteredValue::Number(0.05))).unwrap();
        assert_eq!(err.field, "width");
        assert_eq!(err.message, "Trace Width must be between 0.1 and 1000 mil");
    }

    #[test]
    fn test_out_of_range_with_default_still_fails() {
        let thickness = def(GeometryType::Microstrip, "thickness");
        assert!(validate_field(&thickness, Some(&EnteredValue::Number(20.0))).is_some());
    }

    #[test]
    fn test_absent_with_default_is_valid() {
        let dielectric = def(GeometryType::Coaxial, "dielectric");
        assert_eq!(validate_field(&dielectric, None), None);
        assert_eq!(validate_field(&dielectric, Some(&EnteredValue::from(""))), None);
        assert_eq!(validate_field(&dielectric, Some(&EnteredValue::from("n/a"))), None);
    }

    #[test]
    fn test_absent_without_default() {
        let inner = def(GeometryType::Coaxial, "innerDia");
        let err = validate_field(&inner, None).unwrap();
        assert_eq!(err.message, "Inner Conductor Diameter is required");
        let err = validate_field(&inner, Some(&EnteredValue::from("abc"))).unwrap();
        assert_eq!(err.message, "Inner Conductor Diameter must be a number");
    }

    #[test]
    fn test_form_collects_every_error() {
        let mut fields = fields_from_schema(&get_schema(GeometryType::Stripline));
        fields[3].entered = Some(EnteredValue::Number(50.0)); // thickness out of range
        let validation = validate_form(&fields);
        assert!(!validation.is_valid);
        let keys: Vec<_> = validation.errors.keys().map(String::as_str).collect();
        assert_eq!(keys, ["height", "spacing", "thickness", "width"]);
    }

    #[test]
    fn test_valid_form() {
        let mut fields = fields_from_schema(&get_schema(GeometryType::Coaxial));
        fields[0].entered = Some(EnteredValue::Number(20.0));
        fields[1].entered = Some(EnteredValue::Number(46.0));
        let validation = validate_form(&fields);
        assert!(validation.is_valid);
        assert!(validation.into_result().is_ok());
    }

    #[test]
    fn test_form_without_required_fields_is_invalid() {
        let validation = validate_form(&[]);
        assert!(!validation.is_valid);
        assert!(validation.errors.contains_key(FORM_ERROR_KEY));

        let mut fields = fields_from_schema(&get_schema(GeometryType::Coaxial));
        for field in &mut fields {
            field.definition.required = false;
            field.entered = Some(EnteredValue::Number(30.0));
        }
        let err = validate_form(&fields).into_result().unwrap_err();
        assert!(err.field_errors().unwrap().contains_key(FORM_ERROR_KEY));
    }
}
