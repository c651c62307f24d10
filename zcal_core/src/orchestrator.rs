//! # Calculation Orchestrator
//!
//! Drives one parameter-entry form: geometry selection, field entry,
//! validation, submission and the resulting success/error state.
//!
//! ## State Machine
//!
//! ```text
//!            submit()                  completion
//!   Idle ───────────────► Loading ───────────────► Success | Failed
//!    ▲                       ▲                          │
//!    │ reset()               └──────── submit() ────────┘
//!    └──────────────────────────────────────────────────┘
//! ```
//!
//! A submit that fails its guard (no schema, invalid form) goes straight to
//! `Failed` without touching the backend. A submit while `Loading` is
//! rejected with `SubmissionInFlight`.
//!
//! ## Submission Tokens
//!
//! Every submission, geometry change and reset bumps a monotonically
//! increasing token. [`Orchestrator::complete_submission`] only applies an
//! outcome whose token still matches, so a result that arrives after the
//! user moved on is dropped instead of overwriting newer state.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use zcal_core::{GeometryType, LocalBackend, Orchestrator, Phase, ResultCache};
//!
//! let cache = Arc::new(ResultCache::new(true));
//! let mut form = Orchestrator::new(LocalBackend, cache);
//!
//! form.select_geometry(GeometryType::Coaxial).unwrap();
//! form.set_field("innerDia", 20.0).unwrap();
//! form.set_field("outerDia", 46.0).unwrap();
//!
//! let result = form.submit().unwrap();
//! assert_eq!(result.impedance, 66.56);
//! assert_eq!(form.phase(), Phase::Success);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Span};
use uuid::Uuid;

use crate::backend::{CalculationBackend, LocalBackend};
use crate::cache::ResultCache;
use crate::calculations::CalculationResult;
use crate::errors::{CalcError, CalcResult};
use crate::form::{fields_from_schema, EnteredValue, FormField};
use crate::geometry::GeometryType;
use crate::materials::{Material, MaterialCatalogue};
use crate::request::{build_request, CalculationRequest};
use crate::validation::{validate_form, FormValidation, FORM_ERROR_KEY};

/// Field that material selection writes into
const DIELECTRIC_KEY: &str = "dielectric";

// =============================================================================
// STATE
// =============================================================================

/// Coarse lifecycle phase, derived from [`OrchestrationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Success => "success",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Error as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Machine-readable code, e.g. `DOMAIN_ERROR`
    pub code: String,
    /// Short classification
    pub message: String,
    /// Full error text
    pub detail: String,
    /// Per-field messages for validation failures
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: BTreeMap<String, String>,
}

impl From<&CalcError> for ErrorInfo {
    fn from(err: &CalcError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.user_message().to_string(),
            detail: err.to_string(),
            field_errors: err.field_errors().cloned().unwrap_or_default(),
        }
    }
}

/// Everything an observer can see about the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationState {
    pub selected: Option<GeometryType>,
    pub fields: Vec<FormField>,
    pub result: Option<CalculationResult>,
    pub error: Option<ErrorInfo>,
    pub is_loading: bool,
}

impl OrchestrationState {
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.result.is_some() {
            Phase::Success
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key() == key)
    }
}

/// A submission that has entered `Loading` and awaits its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub token: u64,
    pub geometry: GeometryType,
    pub request: CalculationRequest,
}

/// Callback run after every state change
pub type Observer = Box<dyn FnMut(&OrchestrationState)>;

// =============================================================================
// ORCHESTRATOR
// =============================================================================

pub struct Orchestrator<B = LocalBackend> {
    backend: B,
    cache: Arc<ResultCache>,
    state: OrchestrationState,
    token: u64,
    session_id: Uuid,
    span: Span,
    observers: Vec<Observer>,
}

impl<B: CalculationBackend> Orchestrator<B> {
    pub fn new(backend: B, cache: Arc<ResultCache>) -> Self {
        let session_id = Uuid::new_v4();
        let span = info_span!("form", session = %session_id, backend = backend.name());
        Self {
            backend,
            cache,
            state: OrchestrationState::default(),
            token: 0,
            session_id,
            span,
            observers: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Current submission token
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&OrchestrationState) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        let state = &self.state;
        for observer in self.observers.iter_mut() {
            observer(state);
        }
    }

    fn next_token(&mut self) -> u64 {
        self.token += 1;
        self.token
    }

    /// Record `err` as the outcome and leave `Loading`.
    fn fail(&mut self, err: &CalcError) {
        self.state.result = None;
        self.state.error = Some(ErrorInfo::from(err));
        self.state.is_loading = false;
        self.notify();
    }

    // =========================================================================
    // Geometry and fields
    // =========================================================================

    /// Switch the form to `geometry`.
    ///
    /// Re-selecting the current geometry does nothing. Otherwise any in-flight
    /// submission is invalidated, result and error are cleared, and the
    /// schema (through the shared cache) replaces the field list.
    pub fn select_geometry(&mut self, geometry: GeometryType) -> CalcResult<()> {
        let _enter = self.span.clone().entered();

        if self.state.selected == Some(geometry) && !self.state.fields.is_empty() {
            debug!(%geometry, "geometry unchanged");
            return Ok(());
        }

        self.next_token();
        self.state.result = None;
        self.state.error = None;
        self.state.is_loading = false;
        self.state.selected = Some(geometry);

        let backend = &self.backend;
        let loaded = self
            .cache
            .schema_or_load(geometry, || backend.fetch_schema(geometry))
            .map(fields_from_schema);

        match loaded {
            Ok(fields) => {
                debug!(%geometry, fields = fields.len(), "geometry selected");
                self.state.fields = fields;
                self.notify();
                Ok(())
            }
            Err(err) => {
                warn!(%geometry, error = %err, "schema load failed");
                self.state.fields.clear();
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Select a geometry by its string key.
    ///
    /// An unknown key records a `NotFound` error and leaves the selection,
    /// fields and schema cache as they were.
    pub fn select_geometry_by_key(&mut self, key: &str) -> CalcResult<()> {
        match key.parse::<GeometryType>() {
            Ok(geometry) => self.select_geometry(geometry),
            Err(err) => {
                let _enter = self.span.clone().entered();
                debug!(key, "unknown geometry requested");
                self.next_token();
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Store a user-entered value. Result and error are left alone.
    pub fn set_field(&mut self, key: &str, value: impl Into<EnteredValue>) -> CalcResult<()> {
        let field = self
            .state
            .fields
            .iter_mut()
            .find(|f| f.definition.key == key)
            .ok_or_else(|| CalcError::not_found("Field", key))?;
        field.entered = Some(value.into());
        self.notify();
        Ok(())
    }

    pub fn clear_field(&mut self, key: &str) -> CalcResult<()> {
        let field = self
            .state
            .fields
            .iter_mut()
            .find(|f| f.definition.key == key)
            .ok_or_else(|| CalcError::not_found("Field", key))?;
        field.entered = None;
        self.notify();
        Ok(())
    }

    /// Material catalogue, loaded once through the shared cache.
    pub fn materials(&self) -> CalcResult<&MaterialCatalogue> {
        let backend = &self.backend;
        self.cache.materials_or_load(|| backend.fetch_materials())
    }

    /// Copy a material's permittivity into the `dielectric` field.
    pub fn select_material(&mut self, key: &str) -> CalcResult<Material> {
        let material = self
            .materials()?
            .get(key)
            .cloned()
            .ok_or_else(|| CalcError::not_found("Material", key))?;
        self.set_field(DIELECTRIC_KEY, material.dielectric)?;
        debug!(material = key, dielectric = material.dielectric, "material applied");
        Ok(material)
    }

    /// Validate the current fields without submitting.
    pub fn validate(&self) -> FormValidation {
        validate_form(&self.state.fields)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Guard, build the request and enter `Loading`.
    ///
    /// Guard failures move straight to `Failed` and are returned as errors.
    pub fn begin_submission(&mut self) -> CalcResult<Submission> {
        let _enter = self.span.clone().entered();

        if self.state.is_loading {
            warn!(token = self.token, "submit rejected, calculation in flight");
            return Err(CalcError::SubmissionInFlight);
        }

        let selected = self.state.selected.filter(|_| !self.state.fields.is_empty());
        let geometry = match selected {
            Some(geometry) => geometry,
            _ => {
                let mut errors = BTreeMap::new();
                errors.insert(FORM_ERROR_KEY.to_string(), "No geometry selected".to_string());
                let err = CalcError::validation_failed(errors);
                self.fail(&err);
                return Err(err);
            }
        };

        let request = validate_form(&self.state.fields)
            .into_result()
            .and_then(|()| build_request(&self.state.fields));
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                debug!(%geometry, error = %err, "submission guard failed");
                self.fail(&err);
                return Err(err);
            }
        };

        let token = self.next_token();
        self.state.result = None;
        self.state.error = None;
        self.state.is_loading = true;
        debug!(%geometry, token, "submission started");
        self.notify();

        Ok(Submission {
            token,
            geometry,
            request,
        })
    }

    /// Evaluate a submission, using memoized results when available.
    pub fn compute(&self, submission: &Submission) -> CalcResult<CalculationResult> {
        if let Some(hit) = self.cache.result(submission.geometry, &submission.request) {
            return Ok(hit);
        }
        let result = self.backend.compute(submission.geometry, &submission.request)?;
        self.cache.store_result(&submission.request, &result);
        Ok(result)
    }

    /// Apply the outcome of `submission`.
    ///
    /// Returns `false` (and changes nothing) when the submission is stale.
    pub fn complete_submission(
        &mut self,
        submission: Submission,
        outcome: CalcResult<CalculationResult>,
    ) -> bool {
        let _enter = self.span.clone().entered();

        if submission.token != self.token || !self.state.is_loading {
            warn!(
                token = submission.token,
                current = self.token,
                geometry = %submission.geometry,
                "discarding stale calculation outcome"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                info!(
                    geometry = %submission.geometry,
                    impedance = result.impedance,
                    "calculation complete"
                );
                self.state.result = Some(result);
                self.state.error = None;
                self.state.is_loading = false;
                self.notify();
            }
            Err(err) => {
                match &err {
                    CalcError::Internal { .. } => error!(error = %err, "calculation failed"),
                    _ => debug!(error = %err, "calculation rejected"),
                }
                self.fail(&err);
            }
        }
        true
    }

    /// Guard, compute and complete in one step.
    pub fn submit(&mut self) -> CalcResult<CalculationResult> {
        let submission = self.begin_submission()?;
        let outcome = self.compute(&submission);
        self.complete_submission(submission, outcome.clone());
        outcome
    }

    /// Clear entered values, result and error; back to `Idle`.
    ///
    /// The selected geometry and its schema are kept.
    pub fn reset(&mut self) {
        let _enter = self.span.clone().entered();
        self.next_token();
        for field in &mut self.state.fields {
            field.entered = None;
        }
        self.state.result = None;
        self.state.error = None;
        self.state.is_loading = false;
        debug!("form reset");
        self.notify();
    }
}

impl<B> fmt::Debug for Orchestrator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("session_id", &self.session_id)
            .field("token", &self.token)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}
