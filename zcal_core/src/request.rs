//! # Request Builder
//!
//! Resolves a filled-in form into a flat, immutable [`CalculationRequest`].
//!
//! ## Resolution Order
//!
//! For every field, first match wins:
//!
//! 1. The entered value, when it reads as a finite number
//! 2. The schema default
//! 3. `CalcError::MissingParameter` if the field is required; otherwise
//!    the field is left out
//!
//! Empty or non-numeric text counts as "not entered". Nothing is ever
//! filled with zero.
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::form::{FormField, EnteredValue};
//! use zcal_core::request::build_request;
//! use zcal_core::schema::get_schema;
//! use zcal_core::GeometryType;
//!
//! let mut fields: Vec<FormField> = get_schema(GeometryType::Microstrip)
//!     .into_iter()
//!     .map(FormField::new)
//!     .collect();
//! fields[0].entered = Some(EnteredValue::Number(10.0)); // width
//! fields[1].entered = Some(EnteredValue::Text("62".into())); // height
//!
//! let request = build_request(&fields).unwrap();
//! assert_eq!(request.get("thickness"), Some(1.37));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::form::FormField;

/// Flat mapping from field key to resolved numeric value.
///
/// Built once per submission and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationRequest {
    params: BTreeMap<String, f64>,
}

impl CalculationRequest {
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            params: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn from_params(params: BTreeMap<String, f64>) -> Self {
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.params.get(key).copied()
    }

    /// Value for `key`, or `MissingParameter` naming it.
    pub fn require(&self, key: &str) -> CalcResult<f64> {
        self.get(key).ok_or_else(|| CalcError::missing_parameter(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.params.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Stable string form used as a memoization key.
    ///
    /// Keys are sorted, so equal requests always serialize identically.
    pub fn cache_key(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Resolve one field: entered number, then default.
pub fn resolve_field(field: &FormField) -> Option<f64> {
    field
        .entered
        .as_ref()
        .and_then(|value| value.as_number())
        .or(field.definition.default_value)
}

/// Build the request for a form.
///
/// Fails with `MissingParameter` for the first required field that has
/// neither a usable entered value nor a default.
pub fn build_request(fields: &[FormField]) -> CalcResult<CalculationRequest> {
    let mut params = BTreeMap::new();
    for field in fields {
        let key = &field.definition.key;
        match resolve_field(field) {
            Some(value) => {
                params.insert(key.clone(), value);
            }
            None if field.definition.required => {
                return Err(CalcError::missing_parameter(key.as_str()));
            }
            None => debug!(field = %key, "optional field left out of request"),
        }
    }
    Ok(CalculationRequest::from_params(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::EnteredValue;
    use crate::geometry::GeometryType;
    use crate::schema::get_schema;

    fn microstrip_form() -> Vec<FormField> {
        get_schema(GeometryType::Microstrip)
            .into_iter()
            .map(FormField::new)
            .collect()
    }

    fn set(fields: &mut [FormField], key: &str, value: EnteredValue) {
        let field = fields.iter_mut().find(|f| f.definition.key == key).unwrap();
        field.entered = Some(value);
    }

    #[test]
    fn test_entered_value_wins() {
        let mut fields = microstrip_form();
        set(&mut fields, "width", EnteredValue::Number(10.0));
        set(&mut fields, "height", EnteredValue::Number(62.0));
        set(&mut fields, "thickness", EnteredValue::Number(2.0));
        let request = build_request(&fields).unwrap();
        assert_eq!(request.get("thickness"), Some(2.0));
        assert_eq!(request.len(), 4);
    }

    #[test]
    fn test_default_fallback() {
        let mut fields = microstrip_form();
        set(&mut fields, "width", EnteredValue::Number(10.0));
        set(&mut fields, "height", EnteredValue::Number(62.0));
        set(&mut fields, "dielectric", EnteredValue::Text("  ".into()));
        let request = build_request(&fields).unwrap();
        assert_eq!(request.get("thickness"), Some(1.37));
        assert_eq!(request.get("dielectric"), Some(4.5));
    }

    #[test]
    fn test_missing_without_default() {
        let mut fields = microstrip_form();
        set(&mut fields, "width", EnteredValue::Text("abc".into()));
        set(&mut fields, "height", EnteredValue::Number(62.0));
        let err = build_request(&fields).unwrap_err();
        assert_eq!(err, CalcError::missing_parameter("width"));
    }

    #[test]
    fn test_no_zero_fill() {
        let fields = microstrip_form();
        let err = build_request(&fields).unwrap_err();
        assert!(matches!(err, CalcError::MissingParameter { .. }));
    }

    #[test]
    fn test_optional_field_skipped() {
        let mut fields = microstrip_form();
        set(&mut fields, "height", EnteredValue::Number(62.0));
        fields[0].definition.required = false;
        let request = build_request(&fields).unwrap();
        assert_eq!(request.get("width"), None);
        assert_eq!(request.len(), 3);
    }

    #[test]
    fn test_require_and_cache_key() {
        let request = CalculationRequest::from_pairs([("b", 2.0), ("a", 1.5)]);
        assert_eq!(request.require("a").unwrap(), 1.5);
        assert_eq!(request.require("c").unwrap_err(), CalcError::missing_parameter("c"));
        assert_eq!(request.cache_key(), "a=1.5&b=2");
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let request = CalculationRequest::from_pairs([("width", 10.0)]);
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"width":10.0}"#);
    }
}
