//! # Characteristic Impedance Formulas
//!
//! Closed-form expressions for the supported transmission-line families.
//! These are the raw expressions only: no domain checks and no rounding.
//! The `calculations` module wraps them with input validation, NaN guards
//! and 2-decimal rounding.
//!
//! ## Notation
//!
//! - `w` = Trace width
//! - `h` = Dielectric height (microstrip) or layer height (stripline)
//! - `t` = Copper thickness
//! - `s` = Plane-to-plane spacing (stripline) or trace spacing (pair)
//! - `εr` = Relative permittivity of the substrate
//! - `di`, `do` = Inner and outer conductor diameters
//!
//! All lengths share one unit (mil in the field schemas); the expressions
//! only ever use length ratios.
//!
//! ## References
//!
//! - IPC-2141A, Controlled Impedance Circuit Boards and High Speed Logic Design
//! - Wadell, Transmission Line Design Handbook

use std::f64::consts::PI;

/// Free-space impedance factor 120/π used by the planar formulas
#[inline]
fn planar_factor() -> f64 {
    120.0 / PI
}

// =============================================================================
// MICROSTRIP
// =============================================================================

/// Argument of the microstrip logarithm, `8h / (w + 2t)`
#[inline]
pub fn microstrip_log_argument(w: f64, h: f64, t: f64) -> f64 {
    (8.0 * h) / (w + 2.0 * t)
}

/// Simplified effective permittivity for microstrip, `(εr + 1) / 2`
#[inline]
pub fn microstrip_effective_permittivity(er: f64) -> f64 {
    (er + 1.0) / 2.0
}

/// Microstrip characteristic impedance
///
/// ```text
///        ┌──w──┐
///        ███████  ← t
///   ─────────────────────
///         εr          h
///   ═════════════════════  ground
/// ```
///
/// # Formula
/// - Z0 = (120/π) · ln(8h / (w + 2t)) / sqrt((εr + 1)/2)
#[inline]
pub fn microstrip_z0(w: f64, h: f64, t: f64, er: f64) -> f64 {
    let z_air = planar_factor() * microstrip_log_argument(w, h, t).ln();
    z_air / microstrip_effective_permittivity(er).sqrt()
}

// =============================================================================
// STRIPLINE
// =============================================================================

/// Effective height of a stripline trace, `s/2 − h/2`
#[inline]
pub fn stripline_effective_height(h: f64, s: f64) -> f64 {
    s / 2.0 - h / 2.0
}

/// Argument of the stripline inverse hyperbolic cosine, `(2he + t) / (w + 2t)`
#[inline]
pub fn stripline_acosh_argument(w: f64, h: f64, s: f64, t: f64) -> f64 {
    (2.0 * stripline_effective_height(h, s) + t) / (w + 2.0 * t)
}

/// Stripline characteristic impedance
///
/// # Formula
/// - he = s/2 − h/2
/// - Z0 = (120/π) · acosh((2he + t) / (w + 2t)) / sqrt(εr)
#[inline]
pub fn stripline_z0(w: f64, h: f64, s: f64, t: f64, er: f64) -> f64 {
    planar_factor() * stripline_acosh_argument(w, h, s, t).acosh() / er.sqrt()
}

// =============================================================================
// COAXIAL
// =============================================================================

/// Coaxial characteristic impedance
///
/// # Formula
/// - Z0 = (276 / sqrt(εr)) · log10(do / di)
#[inline]
pub fn coaxial_z0(di: f64, d_o: f64, er: f64) -> f64 {
    (276.0 / er.sqrt()) * (d_o / di).log10()
}

// =============================================================================
// DIFFERENTIAL PAIR
// =============================================================================

/// Coupling correction applied to the differential estimate, `1 − s/(3w)`
///
/// This factor has no published derivation. It goes negative once the
/// spacing exceeds three trace widths.
#[inline]
pub fn differential_coupling_factor(w: f64, s: f64) -> f64 {
    1.0 - s / (3.0 * w)
}

/// Differential impedance estimate from a single-ended impedance
///
/// # Formula
/// - Zdiff = 1.5 · Z0 · (1 − s/(3w))
///
/// A simplified approximation, not a coupled-line solution.
#[inline]
pub fn differential_z0(single_ended: f64, w: f64, s: f64) -> f64 {
    single_ended * 1.5 * differential_coupling_factor(w, s)
}

// =============================================================================
// ROUNDING
// =============================================================================

/// Round to `places` decimals, ties toward positive infinity
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale + 0.5).floor() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microstrip_reference_value() {
        let z = microstrip_z0(10.0, 62.0, 1.37, 4.5);
        assert!((z - 84.345_733).abs() < 1e-4);
    }

    #[test]
    fn test_microstrip_log_argument_at_boundary() {
        // w + 2t == 8h
        assert_eq!(microstrip_log_argument(6.0, 1.0, 1.0), 1.0);
        assert_eq!(microstrip_z0(6.0, 1.0, 1.0, 4.5), 0.0);
    }

    #[test]
    fn test_stripline_reference_value() {
        let z = stripline_z0(5.0, 10.0, 60.0, 1.37, 4.5);
        assert!((z - 46.457_68).abs() < 1e-4);
    }

    #[test]
    fn test_coaxial_reference_value() {
        let z = coaxial_z0(20.0, 46.0, 2.25);
        assert!((z - 66.557_92).abs() < 1e-4);
    }

    #[test]
    fn test_differential_coupling() {
        assert!((differential_coupling_factor(10.0, 6.0) - 0.8).abs() < 1e-12);
        assert!(differential_coupling_factor(10.0, 40.0) < 0.0);
        assert!((differential_z0(84.35, 10.0, 6.0) - 101.22).abs() < 1e-9);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(84.345_733, 2), 84.35);
        assert_eq!(round_to(66.557_92, 2), 66.56);
        assert_eq!(round_to(2.75, 3), 2.75);
        assert_eq!(round_to(-1.006, 2), -1.01);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.12);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }
}
