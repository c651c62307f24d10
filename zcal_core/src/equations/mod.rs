//! # Transmission-Line Equations
//!
//! All closed-form impedance expressions live here so they can be checked
//! against their references in one place.
//!
//! ## Modules
//!
//! - [`impedance`] - Raw formulas (microstrip, stripline, coaxial, differential)
//! - [`registry`] - Equation metadata for listings and audit
//!
//! ## Conventions
//!
//! - Lengths in one consistent unit (mil throughout the field schemas)
//! - Impedance in ohms
//! - No validation or rounding here; see `calculations`
//!
//! ## References
//!
//! - IPC-2141A, Controlled Impedance Circuit Boards and High Speed Logic Design
//! - Wadell, Transmission Line Design Handbook

pub mod impedance;
pub mod registry;

// Re-export commonly used items
pub use impedance::{
    coaxial_z0,
    differential_coupling_factor,
    differential_z0,
    microstrip_effective_permittivity,
    microstrip_log_argument,
    microstrip_z0,
    round_to,
    stripline_acosh_argument,
    stripline_effective_height,
    stripline_z0,
};

pub use registry::{
    Equation,
    EquationCategory,
    EquationMetadata,
    FormulaReference,
    Variable,
    ALL_EQUATIONS,
    generate_equations_markdown,
};
