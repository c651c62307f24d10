//! # Impedance Calculations
//!
//! One submodule per geometry family. Each follows the same pattern:
//!
//! - `*Input` - typed parameters (JSON-serializable), built from a
//!   [`CalculationRequest`] with `from_request`
//! - `validate()` - formula domain checks, failing with `CalcError::Domain`
//! - `calculate(&input) -> CalcResult<CalculationResult>` - pure evaluation,
//!   rounded to 2 decimals
//!
//! [`GeometryParams`] is the tagged union over the four input shapes and
//! [`calculate`] dispatches on it.
//!
//! ## Example
//!
//! ```rust
//! use zcal_core::calculations::{calculate, GeometryParams};
//! use zcal_core::calculations::coaxial::CoaxialInput;
//!
//! let params = GeometryParams::Coaxial(CoaxialInput {
//!     inner_dia: 20.0,
//!     outer_dia: 46.0,
//!     dielectric: 2.25,
//! });
//! assert_eq!(calculate(&params).unwrap().impedance, 66.56);
//! ```

pub mod coaxial;
pub mod differential;
pub mod microstrip;
pub mod stripline;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::request::CalculationRequest;
use crate::units::Ohms;

pub use coaxial::CoaxialInput;
pub use differential::DifferentialInput;
pub use microstrip::MicrostripInput;
pub use stripline::StriplineInput;

// =============================================================================
// RESULT
// =============================================================================

/// Outcome of one impedance calculation.
///
/// Serializes in the wire shape `{ "type": ..., "impedance": ..., ... }`;
/// auxiliary values are omitted when a geometry does not produce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(rename = "type")]
    pub geometry: GeometryType,
    /// Characteristic impedance in ohms (differential value for pairs)
    pub impedance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_dielectric: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupling_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_ratio: Option<f64>,
}

impl CalculationResult {
    pub fn new(geometry: GeometryType, impedance: f64) -> Self {
        Self {
            geometry,
            impedance,
            single: None,
            differential: None,
            effective_dielectric: None,
            coupling_factor: None,
            diameter_ratio: None,
        }
    }

    /// Impedance as a typed quantity
    pub fn ohms(&self) -> Ohms {
        Ohms(self.impedance)
    }

    /// Human-readable labelled lines for terminal output
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} impedance: {}",
            self.geometry.display_name(),
            self.ohms()
        )];
        if let Some(single) = self.single {
            lines.push(format!("Single-ended Z0: {}", Ohms(single)));
        }
        if let Some(diff) = self.differential {
            lines.push(format!("Differential Zdiff: {}", Ohms(diff)));
        }
        if let Some(coupling) = self.coupling_factor {
            lines.push(format!("Coupling factor: {:.1}%", coupling * 100.0));
        }
        if let Some(eeff) = self.effective_dielectric {
            lines.push(format!("Effective permittivity (ε_eff): {:.3}", eeff));
        }
        if let Some(ratio) = self.diameter_ratio {
            lines.push(format!("Diameter ratio (do/di): {:.3}", ratio));
        }
        lines
    }
}

/// Turn a NaN or infinite intermediate into a domain error naming the inputs.
pub(crate) fn ensure_finite(
    geometry: GeometryType,
    value: f64,
    describe: impl FnOnce() -> String,
) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::domain(
            geometry.key(),
            format!("formula produced {} for {}", value, describe()),
        ))
    }
}

// =============================================================================
// TYPED PARAMETERS
// =============================================================================

/// Statically-shaped parameters for one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "lowercase")]
pub enum GeometryParams {
    Microstrip(MicrostripInput),
    Stripline(StriplineInput),
    Coaxial(CoaxialInput),
    Differential(DifferentialInput),
}

impl GeometryParams {
    /// Convert a flat request into the input shape `geometry` expects.
    ///
    /// Keys the geometry does not use are ignored; a missing key is a
    /// `MissingParameter` error.
    pub fn from_request(geometry: GeometryType, request: &CalculationRequest) -> CalcResult<Self> {
        Ok(match geometry {
            GeometryType::Microstrip => Self::Microstrip(MicrostripInput::from_request(request)?),
            GeometryType::Stripline => Self::Stripline(StriplineInput::from_request(request)?),
            GeometryType::Coaxial => Self::Coaxial(CoaxialInput::from_request(request)?),
            GeometryType::Differential => {
                Self::Differential(DifferentialInput::from_request(request)?)
            }
        })
    }

    pub fn geometry(&self) -> GeometryType {
        match self {
            Self::Microstrip(_) => GeometryType::Microstrip,
            Self::Stripline(_) => GeometryType::Stripline,
            Self::Coaxial(_) => GeometryType::Coaxial,
            Self::Differential(_) => GeometryType::Differential,
        }
    }
}

/// Evaluate the formula for whichever geometry `params` holds.
pub fn calculate(params: &GeometryParams) -> CalcResult<CalculationResult> {
    match params {
        GeometryParams::Microstrip(input) => microstrip::calculate(input),
        GeometryParams::Stripline(input) => stripline::calculate(input),
        GeometryParams::Coaxial(input) => coaxial::calculate(input),
        GeometryParams::Differential(input) => differential::calculate(input),
    }
}

/// Build typed parameters from `request` and evaluate them.
pub fn calculate_request(
    geometry: GeometryType,
    request: &CalculationRequest,
) -> CalcResult<CalculationResult> {
    calculate(&GeometryParams::from_request(geometry, request)?)
}
