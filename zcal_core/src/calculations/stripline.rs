//! # Stripline Calculation
//!
//! Characteristic impedance of a trace buried between two reference planes.
//!
//! ## Domain
//!
//! `acosh` is only defined for arguments ≥ 1, so
//! `(2he + t) / (w + 2t)` must be at least 1 where `he = s/2 − h/2`.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, CalculationResult};
use crate::equations::{round_to, stripline_acosh_argument, stripline_z0};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::request::CalculationRequest;

/// Input parameters for a stripline (lengths in mil).
///
/// ## JSON Example
///
/// ```json
/// { "width": 5.0, "height": 10.0, "spacing": 60.0, "thickness": 1.37, "dielectric": 4.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StriplineInput {
    /// Trace width w
    pub width: f64,
    /// Layer height h
    pub height: f64,
    /// Plane-to-plane spacing s
    pub spacing: f64,
    /// Copper thickness t
    pub thickness: f64,
    /// Relative permittivity εr
    pub dielectric: f64,
}

impl StriplineInput {
    /// Read the stripline parameters out of a resolved request.
    pub fn from_request(request: &CalculationRequest) -> CalcResult<Self> {
        Ok(Self {
            width: request.require("width")?,
            height: request.require("height")?,
            spacing: request.require("spacing")?,
            thickness: request.require("thickness")?,
            dielectric: request.require("dielectric")?,
        })
    }

    /// Check that the inputs lie inside the formula's domain.
    pub fn validate(&self) -> CalcResult<()> {
        let conductor = self.width + 2.0 * self.thickness;
        if conductor <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Stripline.key(),
                format!("w + 2t must be positive (got {})", conductor),
            ));
        }
        let argument = stripline_acosh_argument(self.width, self.height, self.spacing, self.thickness);
        if argument.is_nan() || argument < 1.0 {
            return Err(CalcError::domain(
                GeometryType::Stripline.key(),
                format!(
                    "(2he + t)/(w + 2t) must be at least 1 (got {:.4}); increase plane spacing or reduce trace width",
                    argument
                ),
            ));
        }
        if self.dielectric <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Stripline.key(),
                format!("relative permittivity must be positive (got {})", self.dielectric),
            ));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "w={}, h={}, s={}, t={}, er={}",
            self.width, self.height, self.spacing, self.thickness, self.dielectric
        )
    }
}

/// Calculate stripline impedance, rounded to 2 decimals.
pub fn calculate(input: &StriplineInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    let z0 = stripline_z0(input.width, input.height, input.spacing, input.thickness, input.dielectric);
    let z0 = ensure_finite(GeometryType::Stripline, z0, || input.describe())?;

    Ok(CalculationResult::new(GeometryType::Stripline, round_to(z0, 2)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stripline() -> StriplineInput {
        StriplineInput {
            width: 5.0,
            height: 10.0,
            spacing: 60.0,
            thickness: 1.37,
            dielectric: 4.5,
        }
    }

    #[test]
    fn test_reference_impedance() {
        let result = calculate(&test_stripline()).unwrap();
        // he = 25, acosh(51.37/7.74) = 2.5938..., ·38.197/2.1213 = 46.4577
        assert_eq!(result.impedance, 46.46);
        assert!(result.effective_dielectric.is_none());
    }

    #[test]
    fn test_acosh_below_one_is_domain_error() {
        let mut input = test_stripline();
        // he = 0 → argument 1.37/41.37 < 1
        input.spacing = 10.0;
        input.width = 38.63;
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, CalcError::Domain { .. }));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_acosh_exactly_one_is_zero_impedance() {
        // 2he + t == w + 2t → acosh(1) = 0
        let input = StriplineInput {
            width: 10.0,
            height: 0.0,
            spacing: 12.0,
            thickness: 2.0,
            dielectric: 4.0,
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.impedance, 0.0);
    }
}
