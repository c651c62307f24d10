//! # Field Schema Registry
//!
//! Static per-geometry field lists: labels, units, defaults and valid
//! ranges. All lengths are in mil; permittivity is unitless.
//!
//! The tables are compile-time constants. [`get_schema`] builds an owned
//! copy each call, so repeated calls return structurally equal data.
//! Process-wide memoization lives in [`crate::cache::ResultCache`].
//!
//! | Geometry     | Fields                                              |
//! |--------------|-----------------------------------------------------|
//! | microstrip   | width, height, thickness, dielectric                |
//! | stripline    | width, height, spacing, thickness, dielectric       |
//! | coaxial      | innerDia, outerDia, dielectric                      |
//! | differential | width, height, spacing, thickness, dielectric       |

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::geometry::GeometryType;

/// Metadata for one input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Unique within its schema
    pub key: String,
    pub label: String,
    pub unit: String,
    pub default_value: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub required: bool,
}

impl FieldDefinition {
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A geometry's schema plus display metadata, as served by `/form/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(rename = "type")]
    pub geometry: GeometryType,
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldDefinition>,
}

// =============================================================================
// STATIC TABLES
// =============================================================================

struct FieldSpec {
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    default: Option<f64>,
    min: f64,
    max: f64,
}

const MIL: &str = "mil";
const UNITLESS: &str = "";

const fn length(key: &'static str, label: &'static str, max: f64) -> FieldSpec {
    FieldSpec { key, label, unit: MIL, default: None, min: 0.1, max }
}

const THICKNESS: FieldSpec = FieldSpec {
    key: "thickness",
    label: "Copper Thickness",
    unit: MIL,
    default: Some(1.37),
    min: 0.01,
    max: 10.0,
};

const fn dielectric(default: f64) -> FieldSpec {
    FieldSpec {
        key: "dielectric",
        label: "Relative Permittivity",
        unit: UNITLESS,
        default: Some(default),
        min: 1.0,
        max: 100.0,
    }
}

const MICROSTRIP: &[FieldSpec] = &[
    length("width", "Trace Width", 1000.0),
    length("height", "Dielectric Height", 1000.0),
    THICKNESS,
    dielectric(4.5),
];

const STRIPLINE: &[FieldSpec] = &[
    length("width", "Trace Width", 1000.0),
    length("height", "Layer Height", 1000.0),
    length("spacing", "Plane Spacing", 2000.0),
    THICKNESS,
    dielectric(4.5),
];

const COAXIAL: &[FieldSpec] = &[
    length("innerDia", "Inner Conductor Diameter", 10000.0),
    length("outerDia", "Outer Conductor Diameter", 10000.0),
    dielectric(2.25),
];

const DIFFERENTIAL: &[FieldSpec] = &[
    length("width", "Trace Width", 1000.0),
    length("height", "Dielectric Height", 1000.0),
    length("spacing", "Trace Spacing", 1000.0),
    THICKNESS,
    dielectric(4.5),
];

fn table(geometry: GeometryType) -> &'static [FieldSpec] {
    match geometry {
        GeometryType::Microstrip => MICROSTRIP,
        GeometryType::Stripline => STRIPLINE,
        GeometryType::Coaxial => COAXIAL,
        GeometryType::Differential => DIFFERENTIAL,
    }
}

impl From<&FieldSpec> for FieldDefinition {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            key: spec.key.to_string(),
            label: spec.label.to_string(),
            unit: spec.unit.to_string(),
            default_value: spec.default,
            min: spec.min,
            max: spec.max,
            required: true,
        }
    }
}

// =============================================================================
// LOOKUP
// =============================================================================

/// Field list for a geometry.
pub fn get_schema(geometry: GeometryType) -> Vec<FieldDefinition> {
    table(geometry).iter().map(FieldDefinition::from).collect()
}

/// Field list for a geometry key; unknown keys are `NotFound`.
pub fn get_schema_by_key(key: &str) -> CalcResult<Vec<FieldDefinition>> {
    Ok(get_schema(key.parse()?))
}

/// Every geometry with a registered schema
pub fn list_schemas() -> Vec<GeometryType> {
    GeometryType::ALL.to_vec()
}

pub fn form_definition(geometry: GeometryType) -> FormDefinition {
    FormDefinition {
        geometry,
        name: geometry.display_name().to_string(),
        description: geometry.description().to_string(),
        fields: get_schema(geometry),
    }
}

/// Form definitions for all geometries, in listing order
pub fn all_forms() -> Vec<FormDefinition> {
    list_schemas().into_iter().map(form_definition).collect()
}
