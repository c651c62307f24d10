//! # zcal_core - PCB Impedance Calculation Engine
//!
//! `zcal_core` computes characteristic impedance for PCB transmission-line
//! geometries and drives the parameter-entry form around those calculations.
//! All inputs and outputs are JSON-serializable, so the same types serve the
//! CLI, the endpoint layer and remote callers.
//!
//! ## Design Philosophy
//!
//! - **Pure formulas**: the calculation functions take typed input and return
//!   rounded results, nothing else
//! - **Schema-driven forms**: field labels, units, defaults and ranges come
//!   from one static registry
//! - **One resolution order**: entered value, then default, then error
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use zcal_core::calculations::{calculate, GeometryParams, MicrostripInput};
//!
//! let params = GeometryParams::Microstrip(MicrostripInput {
//!     width: 10.0,
//!     height: 62.0,
//!     thickness: 1.37,
//!     dielectric: 4.5,
//! });
//!
//! let result = calculate(&params).unwrap();
//! assert_eq!(result.impedance, 84.35);
//!
//! // Serialize for transmission
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("\"type\":\"microstrip\""));
//! ```
//!
//! ## Modules
//!
//! - [`equations`] - Raw closed-form formulas and their metadata registry
//! - [`calculations`] - Per-geometry inputs, domain checks and results
//! - [`schema`] - Field schema registry
//! - [`form`], [`validation`], [`request`] - Form fields, checks, request building
//! - [`orchestrator`] - Form state machine
//! - [`cache`] - Shared schema/material/result cache
//! - [`backend`] - Local and remote calculation backends
//! - [`api`] - Transport-agnostic endpoint layer
//! - [`materials`] - Substrate catalogue
//! - [`config`] - Application configuration
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod api;
pub mod backend;
pub mod cache;
pub mod calculations;
pub mod config;
pub mod equations;
pub mod errors;
pub mod form;
pub mod geometry;
pub mod materials;
pub mod orchestrator;
pub mod request;
pub mod schema;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use api::{ApiResponse, ApiService};
pub use backend::{CalculationBackend, LocalBackend};
#[cfg(feature = "remote")]
pub use backend::HttpBackend;
pub use cache::ResultCache;
pub use calculations::{CalculationResult, GeometryParams};
pub use config::{AppConfig, BackendMode};
pub use errors::{CalcError, CalcResult};
pub use form::{EnteredValue, FormField};
pub use geometry::GeometryType;
pub use materials::Material;
pub use orchestrator::{ErrorInfo, OrchestrationState, Orchestrator, Phase};
pub use request::{build_request, CalculationRequest};
pub use schema::{get_schema, list_schemas, FieldDefinition, FormDefinition};
pub use validation::{validate_field, validate_form, FormValidation};
