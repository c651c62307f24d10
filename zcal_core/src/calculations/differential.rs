//! # Differential Pair Calculation
//!
//! Edge-coupled surface pair estimated from the single-ended microstrip
//! impedance of one trace:
//!
//! ```text
//! Zdiff = 1.5 · Z0 · (1 − s/(3w))
//! ```
//!
//! ## Known Approximation
//!
//! This is a simplified estimate, not a coupled-line field solution. The
//! coupling term `1 − s/(3w)` has no published derivation: it grows toward 1
//! as the traces touch and goes negative once `s > 3w`. The literal output is
//! kept so results stay comparable with existing calculators; a negative or
//! zero coupling factor is logged at `warn` level but still returned.
//!
//! `Z0` is rounded to 2 decimals before it is scaled, and the differential
//! value is rounded again afterwards. Ties round toward positive infinity,
//! so a negative estimate ending in 5 moves up (`-236.285` → `-236.28`).

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::microstrip::{self, MicrostripInput};
use super::{ensure_finite, CalculationResult};
use crate::equations::{differential_coupling_factor, differential_z0, round_to};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::request::CalculationRequest;

/// Input parameters for an edge-coupled differential pair (lengths in mil).
///
/// ## JSON Example
///
/// ```json
/// { "width": 10.0, "height": 62.0, "spacing": 6.0, "thickness": 1.37, "dielectric": 4.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialInput {
    /// Width of each trace
    pub width: f64,
    /// Dielectric height to the reference plane
    pub height: f64,
    /// Edge-to-edge trace spacing
    pub spacing: f64,
    /// Copper thickness
    pub thickness: f64,
    /// Relative permittivity
    pub dielectric: f64,
}

impl DifferentialInput {
    pub fn from_request(request: &CalculationRequest) -> CalcResult<Self> {
        Ok(Self {
            width: request.require("width")?,
            height: request.require("height")?,
            spacing: request.require("spacing")?,
            thickness: request.require("thickness")?,
            dielectric: request.require("dielectric")?,
        })
    }

    /// The single trace this pair is estimated from.
    pub fn single_trace(&self) -> MicrostripInput {
        MicrostripInput {
            width: self.width,
            height: self.height,
            thickness: self.thickness,
            dielectric: self.dielectric,
        }
    }

    /// Only the single-trace domain and `w ≠ 0` are checked; any spacing
    /// gives a finite coupling term.
    pub fn validate(&self) -> CalcResult<()> {
        if self.width == 0.0 {
            return Err(CalcError::domain(
                GeometryType::Differential.key(),
                "trace width must be non-zero",
            ));
        }
        self.single_trace().validate()
    }

    /// Coupling term `1 − s/(3w)`
    pub fn coupling_factor(&self) -> f64 {
        differential_coupling_factor(self.width, self.spacing)
    }
}

/// Calculate single-ended and differential impedance for a pair.
///
/// `impedance` and `differential` carry the same value.
pub fn calculate(input: &DifferentialInput) -> CalcResult<CalculationResult> {
    input.validate()?;

    let trace = input.single_trace();
    let single = round_to(microstrip::raw_impedance(&trace)?, 2);

    let coupling = input.coupling_factor();
    if coupling <= 0.0 {
        warn!(
            width = input.width,
            spacing = input.spacing,
            coupling,
            "differential coupling factor is not positive; estimate is outside its useful range"
        );
    }

    let zdiff = differential_z0(single, input.width, input.spacing);
    let zdiff = round_to(
        ensure_finite(GeometryType::Differential, zdiff, || {
            format!("{}, s={}", trace.describe(), input.spacing)
        })?,
        2,
    );

    let mut result = CalculationResult::new(GeometryType::Differential, zdiff);
    result.single = Some(single);
    result.differential = Some(zdiff);
    result.coupling_factor = Some(round_to(coupling, 3));
    result.effective_dielectric = Some(round_to(trace.effective_dielectric(), 3));
    Ok(result)
}
