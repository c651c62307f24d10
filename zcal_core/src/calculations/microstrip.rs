//! # Microstrip Calculation
//!
//! Characteristic impedance of a single surface trace over a ground plane.
//!
//! ## Domain
//!
//! The logarithm in the formula must have an argument greater than 1,
//! which means `0 < w + 2t < 8h`. At `w + 2t == 8h` the impedance would be
//! exactly zero; that boundary is rejected as a domain error too.
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::calculations::microstrip::{calculate, MicrostripInput};
//!
//! let input = MicrostripInput {
//!     width: 10.0,
//!     height: 62.0,
//!     thickness: 1.37,
//!     dielectric: 4.5,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.impedance, 84.35);
//! ```

use serde::{Deserialize, Serialize};

use super::{ensure_finite, CalculationResult};
use crate::equations::{microstrip_effective_permittivity, microstrip_z0, round_to};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::request::CalculationRequest;

/// Input parameters for a microstrip line (lengths in mil).
///
/// ## JSON Example
///
/// ```json
/// { "width": 10.0, "height": 62.0, "thickness": 1.37, "dielectric": 4.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MicrostripInput {
    /// Trace width w
    pub width: f64,
    /// Substrate height h
    pub height: f64,
    /// Copper thickness t
    pub thickness: f64,
    /// Relative permittivity εr
    pub dielectric: f64,
}

impl MicrostripInput {
    /// Read the four microstrip parameters out of a resolved request.
    pub fn from_request(request: &CalculationRequest) -> CalcResult<Self> {
        Ok(Self {
            width: request.require("width")?,
            height: request.require("height")?,
            thickness: request.require("thickness")?,
            dielectric: request.require("dielectric")?,
        })
    }

    /// Check that the inputs lie inside the formula's domain.
    pub fn validate(&self) -> CalcResult<()> {
        let conductor = self.width + 2.0 * self.thickness;
        if conductor <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Microstrip.key(),
                format!("w + 2t must be positive (got {})", conductor),
            ));
        }
        if conductor >= 8.0 * self.height {
            return Err(CalcError::domain(
                GeometryType::Microstrip.key(),
                format!(
                    "w + 2t ({}) must be less than 8h ({})",
                    conductor,
                    8.0 * self.height
                ),
            ));
        }
        if self.dielectric <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Microstrip.key(),
                format!("relative permittivity must be positive (got {})", self.dielectric),
            ));
        }
        Ok(())
    }

    /// Effective permittivity (εr + 1)/2
    pub fn effective_dielectric(&self) -> f64 {
        microstrip_effective_permittivity(self.dielectric)
    }

    pub(crate) fn describe(&self) -> String {
        format!(
            "w={}, h={}, t={}, er={}",
            self.width, self.height, self.thickness, self.dielectric
        )
    }
}

/// Unrounded microstrip impedance after domain checks.
pub(crate) fn raw_impedance(input: &MicrostripInput) -> CalcResult<f64> {
    input.validate()?;
    let z0 = microstrip_z0(input.width, input.height, input.thickness, input.dielectric);
    ensure_finite(GeometryType::Microstrip, z0, || input.describe())
}

/// Calculate microstrip impedance, rounded to 2 decimals.
///
/// # Returns
///
/// * `Ok(CalculationResult)` - impedance plus effective permittivity
/// * `Err(CalcError::Domain)` - if `w + 2t` is outside `(0, 8h)`
pub fn calculate(input: &MicrostripInput) -> CalcResult<CalculationResult> {
    let z0 = raw_impedance(input)?;

    let mut result = CalculationResult::new(GeometryType::Microstrip, round_to(z0, 2));
    result.effective_dielectric = Some(round_to(input.effective_dielectric(), 3));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_microstrip() -> MicrostripInput {
        MicrostripInput {
            width: 10.0,
            height: 62.0,
            thickness: 1.37,
            dielectric: 4.5,
        }
    }

    #[test]
    fn test_reference_impedance() {
        let result = calculate(&test_microstrip()).unwrap();
        // (120/π)·ln(496/12.74)/sqrt(2.75) = 84.3457...
        assert_eq!(result.impedance, 84.35);
        assert_eq!(result.effective_dielectric, Some(2.75));
        assert_eq!(result.geometry, GeometryType::Microstrip);
    }

    #[test]
    fn test_deterministic() {
        let a = calculate(&test_microstrip()).unwrap();
        let b = calculate(&test_microstrip()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wider_trace_lowers_impedance() {
        let narrow = calculate(&test_microstrip()).unwrap();
        let mut wide_input = test_microstrip();
        wide_input.width = 20.0;
        let wide = calculate(&wide_input).unwrap();
        assert!(wide.impedance < narrow.impedance);
        assert_eq!(wide.impedance, 71.0);
    }

    #[test]
    fn test_boundary_is_domain_error() {
        // w + 2t == 8h
        let input = MicrostripInput {
            width: 6.0,
            height: 1.0,
            thickness: 1.0,
            dielectric: 4.5,
        };
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_non_positive_conductor_is_domain_error() {
        let mut input = test_microstrip();
        input.width = -10.0;
        input.thickness = 1.0;
        assert!(matches!(calculate(&input), Err(CalcError::Domain { .. })));
    }

    #[test]
    fn test_from_request_missing_key() {
        let request = CalculationRequest::from_pairs([("width", 10.0), ("height", 62.0)]);
        let err = MicrostripInput::from_request(&request).unwrap_err();
        assert_eq!(err, CalcError::missing_parameter("thickness"));
    }
}
