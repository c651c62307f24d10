//! # Substrate Materials
//!
//! Read-only catalogue of common PCB dielectrics. Selecting a material in a
//! form copies its relative permittivity into the `dielectric` field.
//!
//! ## Catalogue
//!
//! | Key          | εr   | tan δ  |
//! |--------------|------|--------|
//! | FR4          | 4.5  | 0.015  |
//! | FR4_HF       | 4.2  | 0.008  |
//! | Rogers_4003C | 3.55 | 0.0027 |
//! | Rogers_4350B | 3.48 | 0.004  |
//! | Isola_370HR  | 3.66 | 0.009  |
//! | Teflon_PTFE  | 2.1  | 0.0005 |
//! | Polyimide    | 3.5  | 0.01   |
//! | Ceramic      | 9.8  | 0.002  |
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::materials::get_material;
//!
//! let rogers = get_material("Rogers_4350B").unwrap();
//! assert_eq!(rogers.dielectric, 3.48);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Dielectric substrate properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Relative permittivity εr
    pub dielectric: f64,
    /// Loss tangent tan δ
    #[serde(rename = "tanD")]
    pub tan_d: f64,
    /// Frequency the values are specified at
    pub frequency: String,
    pub frequency_range: String,
    pub description: String,
}

/// Material key → properties
pub type MaterialCatalogue = BTreeMap<String, Material>;

fn entry(
    key: &str,
    name: &str,
    dielectric: f64,
    tan_d: f64,
    frequency: &str,
    frequency_range: &str,
    description: &str,
) -> (String, Material) {
    (
        key.to_string(),
        Material {
            name: name.to_string(),
            dielectric,
            tan_d,
            frequency: frequency.to_string(),
            frequency_range: frequency_range.to_string(),
            description: description.to_string(),
        },
    )
}

static CATALOGUE: Lazy<MaterialCatalogue> = Lazy::new(|| {
    [
        entry("FR4", "FR4", 4.5, 0.015, "1 MHz", "1MHz - 5GHz",
            "Standard glass-reinforced epoxy laminate"),
        entry("FR4_HF", "FR4 (High Frequency)", 4.2, 0.008, "1 GHz", "1GHz - 20GHz",
            "High-frequency FR4 with lower loss"),
        entry("Rogers_4003C", "Rogers 4003C", 3.55, 0.0027, "10 GHz", "1GHz - 50GHz",
            "Ceramic-filled hydrocarbon laminate for microwave work"),
        entry("Rogers_4350B", "Rogers 4350B", 3.48, 0.004, "10 GHz", "1GHz - 40GHz",
            "High-performance microwave PCB laminate"),
        entry("Isola_370HR", "Isola 370HR", 3.66, 0.009, "10 GHz", "1GHz - 30GHz",
            "Low-loss, high-reliability PCB laminate"),
        entry("Teflon_PTFE", "Teflon / PTFE", 2.1, 0.0005, "10 GHz", "1GHz - 100GHz",
            "PTFE with extremely low loss"),
        entry("Polyimide", "Polyimide", 3.5, 0.01, "1 GHz", "1MHz - 10GHz",
            "Polyimide film, stable at high temperature"),
        entry("Ceramic", "Ceramic", 9.8, 0.002, "10 GHz", "1GHz - 50GHz",
            "Ceramic-based composite substrate"),
    ]
    .into_iter()
    .collect()
});

/// The full catalogue, keyed by material key.
pub fn list_materials() -> &'static MaterialCatalogue {
    &CATALOGUE
}

/// Look up one material by its exact key.
pub fn get_material(key: &str) -> CalcResult<&'static Material> {
    CATALOGUE
        .get(key)
        .ok_or_else(|| CalcError::not_found("Material", key))
}
