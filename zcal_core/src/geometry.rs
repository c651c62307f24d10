//! # Geometry Types
//!
//! The closed set of transmission-line families zcal knows how to size.
//! A [`GeometryType`] selects both the formula and the field schema.
//!
//! Geometry keys arrive as strings from forms, the CLI and the endpoint
//! layer; [`GeometryType::from_str`] is the single place they are parsed,
//! and an unknown key is a [`CalcError::NotFound`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Transmission-line geometry family.
///
/// Serializes as its lowercase key (`"microstrip"`, `"stripline"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    /// Trace on an outer layer over a single reference plane
    Microstrip,
    /// Trace buried between two reference planes
    Stripline,
    /// Round inner conductor inside a round shield
    Coaxial,
    /// Edge-coupled pair of microstrip traces
    Differential,
}

impl GeometryType {
    /// All geometry types, in schema listing order
    pub const ALL: [GeometryType; 4] = [
        GeometryType::Microstrip,
        GeometryType::Stripline,
        GeometryType::Coaxial,
        GeometryType::Differential,
    ];

    /// Wire key used in requests and schema paths
    pub fn key(&self) -> &'static str {
        match self {
            GeometryType::Microstrip => "microstrip",
            GeometryType::Stripline => "stripline",
            GeometryType::Coaxial => "coaxial",
            GeometryType::Differential => "differential",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GeometryType::Microstrip => "Microstrip",
            GeometryType::Stripline => "Stripline",
            GeometryType::Coaxial => "Coaxial",
            GeometryType::Differential => "Differential Pair",
        }
    }

    /// One-line description for form headers
    pub fn description(&self) -> &'static str {
        match self {
            GeometryType::Microstrip => "Single trace on an outer PCB layer above a ground plane",
            GeometryType::Stripline => "Trace sandwiched between two ground planes",
            GeometryType::Coaxial => "Coaxial cable or coaxial via structure",
            GeometryType::Differential => "Pair of coupled traces carrying a differential signal",
        }
    }

    /// Stable index into per-geometry tables
    pub(crate) fn index(&self) -> usize {
        match self {
            GeometryType::Microstrip => 0,
            GeometryType::Stripline => 1,
            GeometryType::Coaxial => 2,
            GeometryType::Differential => 3,
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GeometryType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        GeometryType::ALL
            .iter()
            .copied()
            .find(|g| g.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| CalcError::not_found("Geometry type", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        for geometry in GeometryType::ALL {
            assert_eq!(geometry.key().parse::<GeometryType>().unwrap(), geometry);
        }
        assert_eq!(" Coaxial ".parse::<GeometryType>().unwrap(), GeometryType::Coaxial);
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = "slotline".parse::<GeometryType>().unwrap_err();
        assert_eq!(err, CalcError::not_found("Geometry type", "slotline"));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&GeometryType::Differential).unwrap();
        assert_eq!(json, "\"differential\"");
        let roundtrip: GeometryType = serde_json::from_str("\"stripline\"").unwrap();
        assert_eq!(roundtrip, GeometryType::Stripline);
    }

    #[test]
    fn test_indices_are_unique() {
        let mut seen = [false; 4];
        for geometry in GeometryType::ALL {
            assert!(!seen[geometry.index()]);
            seen[geometry.index()] = true;
        }
    }
}
