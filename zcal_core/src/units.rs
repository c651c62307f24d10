//! # Unit Types
//!
//! Type-safe wrappers for the handful of units the impedance formulas touch.
//! These are plain f64 newtypes so JSON stays clean (just numbers).
//!
//! ## Conventions
//!
//! - Length: mils (thousandths of an inch) are the working unit of every
//!   field schema. Millimeters are accepted at the edges and converted.
//! - Impedance: ohms.
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::units::{Mils, Millimeters, Ohms};
//!
//! let trace: Mils = Millimeters(0.254).into();
//! assert!((trace.0 - 10.0).abs() < 1e-9);
//!
//! assert_eq!(Ohms(50.0).to_string(), "50.00 Ω");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Millimeters per mil
pub const MM_PER_MIL: f64 = 0.0254;

// ============================================================================
// Length Units
// ============================================================================

/// Length in mils (0.001 in)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mils(pub f64);

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl From<Mils> for Millimeters {
    fn from(mils: Mils) -> Self {
        Millimeters(mils.0 * MM_PER_MIL)
    }
}

impl From<Millimeters> for Mils {
    fn from(mm: Millimeters) -> Self {
        Mils(mm.0 / MM_PER_MIL)
    }
}

impl fmt::Display for Millimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} mm", self.0)
    }
}

// ============================================================================
// Impedance
// ============================================================================

/// Impedance in ohms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ohms(pub f64);

impl fmt::Display for Ohms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Ω", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mils_to_millimeters() {
        let mm: Millimeters = Mils(100.0).into();
        assert!((mm.0 - 2.54).abs() < 1e-12);
    }

    #[test]
    fn test_millimeters_to_mils() {
        let mils: Mils = Millimeters(1.6).into();
        assert!((mils.0 - 62.992_125_984).abs() < 1e-6);
    }

    #[test]
    fn test_millimeters_display() {
        let mm: Millimeters = Mils(62.0).into();
        assert_eq!(mm.to_string(), "1.575 mm");
    }

    #[test]
    fn test_ohms_display() {
        assert_eq!(Ohms(84.346).to_string(), "84.35 Ω");
        assert_eq!(Ohms(50.0).to_string(), "50.00 Ω");
    }

    #[test]
    fn test_serialization() {
        let z = Ohms(66.56);
        let json = serde_json::to_string(&z).unwrap();
        assert_eq!(json, "66.56");
    }
}
