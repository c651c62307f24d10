//! # Equation Registry
//!
//! Central registry of every closed-form expression used by the impedance
//! calculations. Each equation carries its formula, variable definitions,
//! source reference and known limitations so results can be audited.
//!
//! ## Usage
//!
//! ```rust
//! use zcal_core::equations::registry::Equation;
//! use zcal_core::geometry::GeometryType;
//!
//! let meta = Equation::MicrostripImpedance.metadata();
//! println!("Formula: {}", meta.formula_plain);
//!
//! let used = Equation::for_geometry(GeometryType::Differential);
//! assert!(used.contains(&Equation::DifferentialImpedance));
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryType;

// ============================================================================
// References
// ============================================================================

/// Source a formula is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FormulaReference {
    /// IPC-2141 controlled impedance design guide
    Ipc2141 { section: &'static str },
    /// Wadell, Transmission Line Design Handbook
    Wadell { section: &'static str },
    /// Rule-of-thumb relation with no published derivation
    Empirical,
}

impl FormulaReference {
    /// Format the reference for display
    pub fn citation(&self) -> String {
        match self {
            FormulaReference::Ipc2141 { section } => format!("IPC-2141A Section {}", section),
            FormulaReference::Wadell { section } => format!("Wadell, Section {}", section),
            FormulaReference::Empirical => "Empirical approximation".to_string(),
        }
    }
}

// ============================================================================
// Equation Categories
// ============================================================================

/// Categories for grouping equations in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Effective permittivity and effective geometry
    Effective,
    /// Single-ended characteristic impedance
    SingleEnded,
    /// Coupled-line (differential) estimates
    Coupled,
}

impl EquationCategory {
    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::Effective => "Effective Parameters",
            EquationCategory::SingleEnded => "Single-Ended Impedance",
            EquationCategory::Coupled => "Coupled Lines",
        }
    }

    /// Sort order for listings (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            EquationCategory::Effective => 1,
            EquationCategory::SingleEnded => 2,
            EquationCategory::Coupled => 3,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in an equation.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol (e.g., "w", "h", "εr")
    pub symbol: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "mil", "Ω")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

// ============================================================================
// Equation Metadata
// ============================================================================

/// Complete metadata for one formula.
#[derive(Debug, Clone)]
pub struct EquationMetadata {
    /// Human-readable name
    pub name: &'static str,
    /// Brief description of what this equation calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    /// Source reference
    pub reference: FormulaReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Validity range and known limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping
    pub category: EquationCategory,
    /// Function implementing the equation in `equations/impedance.rs`
    pub source_function: &'static str,
}

// ============================================================================
// Equation Enum
// ============================================================================

/// All formulas used in zcal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Equation {
    /// εeff = (εr + 1)/2
    MicrostripEffectivePermittivity,
    /// Z0 = (120/π) ln(8h/(w+2t)) / sqrt(εeff)
    MicrostripImpedance,
    /// he = s/2 − h/2
    StriplineEffectiveHeight,
    /// Z0 = (120/π) acosh((2he+t)/(w+2t)) / sqrt(εr)
    StriplineImpedance,
    /// Z0 = (276/sqrt(εr)) log10(do/di)
    CoaxialImpedance,
    /// k = 1 − s/(3w)
    DifferentialCouplingFactor,
    /// Zdiff = 1.5 Z0 k
    DifferentialImpedance,
}

impl Equation {
    /// Get the full metadata for this equation
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::MicrostripEffectivePermittivity => EquationMetadata {
                name: "Microstrip Effective Permittivity",
                description: "Average of substrate and air permittivity seen by a microstrip field",
                formula_plain: "eeff = (er + 1) / 2",
                reference: FormulaReference::Wadell { section: "3.5" },
                variables: vec![
                    Variable::new("eeff", "Effective relative permittivity", "-"),
                    Variable::new("er", "Substrate relative permittivity", "-"),
                ],
                assumptions: vec!["Half of the field energy in air, half in the substrate"],
                category: EquationCategory::Effective,
                source_function: "microstrip_effective_permittivity",
            },

            Equation::MicrostripImpedance => EquationMetadata {
                name: "Microstrip Impedance",
                description: "Characteristic impedance of a surface trace over one ground plane",
                formula_plain: "Z0 = (120/pi) * ln(8h / (w + 2t)) / sqrt(eeff)",
                reference: FormulaReference::Ipc2141 { section: "4.2.1" },
                variables: vec![
                    Variable::new("w", "Trace width", "mil"),
                    Variable::new("h", "Dielectric height", "mil"),
                    Variable::new("t", "Copper thickness", "mil"),
                    Variable::new("eeff", "Effective relative permittivity", "-"),
                    Variable::new("Z0", "Characteristic impedance", "ohm"),
                ],
                assumptions: vec!["Requires 0 < w + 2t < 8h"],
                category: EquationCategory::SingleEnded,
                source_function: "microstrip_z0",
            },

            Equation::StriplineEffectiveHeight => EquationMetadata {
                name: "Stripline Effective Height",
                description: "Distance from the trace to the nearer plane used by the stripline formula",
                formula_plain: "he = s/2 - h/2",
                reference: FormulaReference::Ipc2141 { section: "4.2.3" },
                variables: vec![
                    Variable::new("he", "Effective height", "mil"),
                    Variable::new("s", "Plane-to-plane spacing", "mil"),
                    Variable::new("h", "Layer height", "mil"),
                ],
                assumptions: vec!["Trace centered between planes when h = 0"],
                category: EquationCategory::Effective,
                source_function: "stripline_effective_height",
            },

            Equation::StriplineImpedance => EquationMetadata {
                name: "Stripline Impedance",
                description: "Characteristic impedance of a trace between two ground planes",
                formula_plain: "Z0 = (120/pi) * acosh((2he + t) / (w + 2t)) / sqrt(er)",
                reference: FormulaReference::Ipc2141 { section: "4.2.3" },
                variables: vec![
                    Variable::new("w", "Trace width", "mil"),
                    Variable::new("t", "Copper thickness", "mil"),
                    Variable::new("he", "Effective height", "mil"),
                    Variable::new("er", "Relative permittivity", "-"),
                    Variable::new("Z0", "Characteristic impedance", "ohm"),
                ],
                assumptions: vec!["Homogeneous dielectric", "Requires (2he + t)/(w + 2t) >= 1"],
                category: EquationCategory::SingleEnded,
                source_function: "stripline_z0",
            },

            Equation::CoaxialImpedance => EquationMetadata {
                name: "Coaxial Impedance",
                description: "Characteristic impedance of a round coaxial line",
                formula_plain: "Z0 = (276 / sqrt(er)) * log10(do / di)",
                reference: FormulaReference::Wadell { section: "2.4" },
                variables: vec![
                    Variable::new("di", "Inner conductor diameter", "mil"),
                    Variable::new("do", "Outer conductor inner diameter", "mil"),
                    Variable::new("er", "Relative permittivity", "-"),
                    Variable::new("Z0", "Characteristic impedance", "ohm"),
                ],
                assumptions: vec!["Requires do > di > 0", "Concentric conductors"],
                category: EquationCategory::SingleEnded,
                source_function: "coaxial_z0",
            },

            Equation::DifferentialCouplingFactor => EquationMetadata {
                name: "Differential Coupling Factor",
                description: "Spacing correction applied to the differential estimate",
                formula_plain: "k = 1 - s / (3w)",
                reference: FormulaReference::Empirical,
                variables: vec![
                    Variable::new("s", "Edge-to-edge trace spacing", "mil"),
                    Variable::new("w", "Trace width", "mil"),
                ],
                assumptions: vec![
                    "No physical derivation",
                    "Negative for s > 3w, kept as-is for compatibility",
                ],
                category: EquationCategory::Coupled,
                source_function: "differential_coupling_factor",
            },

            Equation::DifferentialImpedance => EquationMetadata {
                name: "Differential Impedance (approximate)",
                description: "Differential impedance estimated from the single-ended microstrip value",
                formula_plain: "Zdiff = 1.5 * Z0 * k",
                reference: FormulaReference::Empirical,
                variables: vec![
                    Variable::new("Z0", "Single-ended microstrip impedance (rounded)", "ohm"),
                    Variable::new("k", "Coupling factor", "-"),
                    Variable::new("Zdiff", "Differential impedance", "ohm"),
                ],
                assumptions: vec![
                    "Simplified approximation, not a coupled-line field solution",
                    "Computed from the single-ended value after rounding",
                ],
                category: EquationCategory::Coupled,
                source_function: "differential_z0",
            },
        }
    }

    /// Equations evaluated when calculating the given geometry
    pub fn for_geometry(geometry: GeometryType) -> Vec<Equation> {
        match geometry {
            GeometryType::Microstrip => vec![
                Equation::MicrostripEffectivePermittivity,
                Equation::MicrostripImpedance,
            ],
            GeometryType::Stripline => vec![
                Equation::StriplineEffectiveHeight,
                Equation::StriplineImpedance,
            ],
            GeometryType::Coaxial => vec![Equation::CoaxialImpedance],
            GeometryType::Differential => vec![
                Equation::MicrostripEffectivePermittivity,
                Equation::MicrostripImpedance,
                Equation::DifferentialCouplingFactor,
                Equation::DifferentialImpedance,
            ],
        }
    }

    /// Get all equations in a given category
    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }

    /// Get all categories in listing order
    pub fn all_categories() -> Vec<EquationCategory> {
        let mut cats = vec![
            EquationCategory::SingleEnded,
            EquationCategory::Coupled,
            EquationCategory::Effective,
        ];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All equations in the registry (for iteration)
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::MicrostripEffectivePermittivity,
    Equation::MicrostripImpedance,
    Equation::StriplineEffectiveHeight,
    Equation::StriplineImpedance,
    Equation::CoaxialImpedance,
    Equation::DifferentialCouplingFactor,
    Equation::DifferentialImpedance,
];

/// Render the registry as a markdown reference, grouped by category.
pub fn generate_equations_markdown() -> String {
    let mut output = String::with_capacity(4_096);
    output.push_str("# zcal Equations Reference\n\n");

    for category in Equation::all_categories() {
        let equations = Equation::in_category(category);
        if equations.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for equation in equations {
            let meta = equation.metadata();
            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));
            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            for assumption in &meta.assumptions {
                output.push_str(&format!("- {}\n", assumption));
            }
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equations_have_metadata() {
        assert_eq!(ALL_EQUATIONS.len(), 7);

        for eq in ALL_EQUATIONS {
            let meta = eq.metadata();
            assert!(!meta.name.is_empty(), "Equation {:?} has no name", eq);
            assert!(!meta.formula_plain.is_empty(), "Equation {:?} has no formula", eq);
            assert!(!meta.variables.is_empty(), "Equation {:?} has no variables", eq);
        }

        let coax = Equation::CoaxialImpedance.metadata();
        assert!(coax.formula_plain.contains("log10(do / di)"));
    }

    #[test]
    fn test_differential_flagged_as_approximation() {
        let meta = Equation::DifferentialImpedance.metadata();
        assert_eq!(meta.reference, FormulaReference::Empirical);
        assert!(meta.assumptions.iter().any(|a| a.contains("approximation")));
    }

    #[test]
    fn test_every_geometry_has_equations() {
        for geometry in GeometryType::ALL {
            assert!(!Equation::for_geometry(geometry).is_empty());
        }
    }

    #[test]
    fn test_categories_sorted() {
        let cats = Equation::all_categories();
        assert_eq!(cats.first(), Some(&EquationCategory::Effective));
        assert_eq!(cats.last(), Some(&EquationCategory::Coupled));
    }

    #[test]
    fn test_markdown_lists_every_equation() {
        let md = generate_equations_markdown();
        for eq in ALL_EQUATIONS {
            assert!(md.contains(eq.metadata().name));
        }
    }
}
