//! # Coaxial Calculation
//!
//! Characteristic impedance of a concentric round line.
//! Requires `do > di > 0`.

use serde::{Deserialize, Serialize};

use super::{ensure_finite, CalculationResult};
use crate::equations::{coaxial_z0, round_to};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::request::CalculationRequest;

/// Input parameters for a coaxial line (diameters in mil).
///
/// ## JSON Example
///
/// ```json
/// { "innerDia": 20.0, "outerDia": 46.0, "dielectric": 2.25 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoaxialInput {
    /// Inner conductor diameter di
    #[serde(rename = "innerDia")]
    pub inner_dia: f64,
    /// Outer conductor (shield) diameter do
    #[serde(rename = "outerDia")]
    pub outer_dia: f64,
    /// Relative permittivity εr
    pub dielectric: f64,
}

impl CoaxialInput {
    /// Read the coaxial parameters out of a resolved request.
    pub fn from_request(request: &CalculationRequest) -> CalcResult<Self> {
        Ok(Self {
            inner_dia: request.require("innerDia")?,
            outer_dia: request.require("outerDia")?,
            dielectric: request.require("dielectric")?,
        })
    }

    /// Check that the inputs lie inside the formula's domain.
    pub fn validate(&self) -> CalcResult<()> {
        if self.inner_dia <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Coaxial.key(),
                format!("inner diameter must be positive (got {})", self.inner_dia),
            ));
        }
        if self.outer_dia <= self.inner_dia {
            return Err(CalcError::domain(
                GeometryType::Coaxial.key(),
                format!(
                    "outer diameter ({}) must be greater than inner diameter ({})",
                    self.outer_dia, self.inner_dia
                ),
            ));
        }
        if self.dielectric <= 0.0 {
            return Err(CalcError::domain(
                GeometryType::Coaxial.key(),
                format!("relative permittivity must be positive (got {})", self.dielectric),
            ));
        }
        Ok(())
    }

    /// Diameter ratio do/di
    pub fn diameter_ratio(&self) -> f64 {
        self.outer_dia / self.inner_dia
    }
}

/// Calculate coaxial impedance, rounded to 2 decimals.
pub fn calculate(input: &CoaxialInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    let z0 = coaxial_z0(input.inner_dia, input.outer_dia, input.dielectric);
    let z0 = ensure_finite(GeometryType::Coaxial, z0, || {
        format!("di={}, do={}, er={}", input.inner_dia, input.outer_dia, input.dielectric)
    })?;

    let mut result = CalculationResult::new(GeometryType::Coaxial, round_to(z0, 2));
    result.diameter_ratio = Some(round_to(input.diameter_ratio(), 3));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_coax() -> CoaxialInput {
        CoaxialInput {
            inner_dia: 20.0,
            outer_dia: 46.0,
            dielectric: 2.25,
        }
    }

    #[test]
    fn test_reference_impedance() {
        let result = calculate(&test_coax()).unwrap();
        // (276/1.5)·log10(2.3) = 66.5579...
        assert_eq!(result.impedance, 66.56);
        assert_eq!(result.diameter_ratio, Some(2.3));
    }

    #[test]
    fn test_inverted_diameters() {
        let mut input = test_coax();
        input.outer_dia = 20.0;
        input.inner_dia = 46.0;
        assert!(matches!(calculate(&input), Err(CalcError::Domain { .. })));
    }

    #[test]
    fn test_equal_diameters() {
        let mut input = test_coax();
        input.outer_dia = input.inner_dia;
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_zero_inner_diameter() {
        let mut input = test_coax();
        input.inner_dia = 0.0;
        let err = calculate(&input).unwrap_err();
        assert!(err.to_string().contains("inner diameter"));
    }

    #[test]
    fn test_serialization_uses_schema_keys() {
        let json = serde_json::to_string(&test_coax()).unwrap();
        assert!(json.contains("\"innerDia\""));
        assert!(json.contains("\"outerDia\""));
    }
}
