//! # Calculation Backends
//!
//! The orchestrator talks to calculations, schemas and materials through the
//! [`CalculationBackend`] trait:
//!
//! - [`LocalBackend`] evaluates everything in-process.
//! - [`HttpBackend`] (feature `remote`) calls a compute endpoint that speaks
//!   the same JSON as [`crate::api::ApiService`].
//!
//! ## Remote Status Mapping
//!
//! | Response               | Error                          |
//! |------------------------|--------------------------------|
//! | 2xx                    | parsed body                    |
//! | 404                    | `NotFound`                     |
//! | other 4xx              | `Rejected` with `{error}` text |
//! | 5xx                    | `Internal`                     |
//! | connect/timeout/reset  | `Transport` (retried)          |

use serde::{Deserialize, Serialize};

use crate::calculations::{calculate_request, CalculationResult};
use crate::errors::{CalcError, CalcResult};
use crate::geometry::GeometryType;
use crate::materials::{list_materials, MaterialCatalogue};
use crate::request::CalculationRequest;
use crate::schema::{get_schema, FieldDefinition};

/// Body of a compute call: `{ "type": ..., "params": { ... } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    #[serde(rename = "type")]
    pub geometry: String,
    #[serde(default)]
    pub params: CalculationRequest,
}

impl ComputeRequest {
    pub fn new(geometry: GeometryType, params: CalculationRequest) -> Self {
        Self {
            geometry: geometry.key().to_string(),
            params,
        }
    }
}

/// Source of calculations and reference data.
pub trait CalculationBackend {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn compute(&self, geometry: GeometryType, request: &CalculationRequest) -> CalcResult<CalculationResult>;

    fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>>;

    fn fetch_materials(&self) -> CalcResult<MaterialCatalogue>;
}

impl<B: CalculationBackend + ?Sized> CalculationBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute(&self, geometry: GeometryType, request: &CalculationRequest) -> CalcResult<CalculationResult> {
        (**self).compute(geometry, request)
    }

    fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>> {
        (**self).fetch_schema(geometry)
    }

    fn fetch_materials(&self) -> CalcResult<MaterialCatalogue> {
        (**self).fetch_materials()
    }
}

// =============================================================================
// LOCAL
// =============================================================================

/// In-process backend over the formula library and static tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl CalculationBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn compute(&self, geometry: GeometryType, request: &CalculationRequest) -> CalcResult<CalculationResult> {
        calculate_request(geometry, request)
    }

    fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>> {
        Ok(get_schema(geometry))
    }

    fn fetch_materials(&self) -> CalcResult<MaterialCatalogue> {
        Ok(list_materials().clone())
    }
}

/// Backend selected by configuration.
pub fn from_config(config: &crate::config::BackendConfig) -> CalcResult<Box<dyn CalculationBackend>> {
    match config.mode {
        crate::config::BackendMode::Local => Ok(Box::new(LocalBackend)),
        #[cfg(feature = "remote")]
        crate::config::BackendMode::Remote => Ok(Box::new(HttpBackend::new(config)?)),
        #[cfg(not(feature = "remote"))]
        crate::config::BackendMode::Remote => Err(CalcError::config(
            "backend.mode",
            "remote backend support was not compiled in (enable the 'remote' feature)",
        )),
    }
}

/// Map a non-success HTTP status to an error.
///
/// `body` is the raw response text; a JSON `{ "error": ... }` message is
/// preferred when present.
pub fn classify_status(status: u16, body: &str, kind: &str, key: &str) -> CalcError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        404 => CalcError::not_found(kind, key),
        400..=499 => CalcError::Rejected { status, message },
        _ => CalcError::internal(format!("remote endpoint returned {}: {}", status, message)),
    }
}

// =============================================================================
// REMOTE
// =============================================================================

#[cfg(feature = "remote")]
pub use remote::HttpBackend;

#[cfg(feature = "remote")]
mod remote {
    use std::thread;
    use std::time::Duration;

    use reqwest::blocking::{Client, Response};
    use reqwest::Method;
    use serde::de::DeserializeOwned;
    use tracing::{debug, warn};

    use super::{classify_status, CalculationBackend, ComputeRequest};
    use crate::calculations::CalculationResult;
    use crate::config::BackendConfig;
    use crate::errors::{CalcError, CalcResult};
    use crate::geometry::GeometryType;
    use crate::materials::MaterialCatalogue;
    use crate::request::CalculationRequest;
    use crate::schema::{FieldDefinition, FormDefinition};

    /// Blocking HTTP client for a remote compute endpoint.
    pub struct HttpBackend {
        client: Client,
        base_url: String,
        retry_attempts: u32,
        retry_delay: Duration,
    }

    impl HttpBackend {
        pub fn new(config: &BackendConfig) -> CalcResult<Self> {
            let client = Client::builder()
                .timeout(config.timeout())
                .build()
                .map_err(|e| CalcError::config("backend", format!("cannot build HTTP client: {}", e)))?;

            Ok(Self {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                retry_attempts: config.retry_attempts.max(1),
                retry_delay: config.retry_delay(),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base_url, path)
        }

        /// Run `attempt` until it succeeds, fails with a non-retryable error,
        /// or runs out of attempts.
        fn with_retry<T>(&self, what: &str, mut attempt: impl FnMut() -> CalcResult<T>) -> CalcResult<T> {
            let mut tries = 0;
            loop {
                tries += 1;
                match attempt() {
                    Err(err) if err.is_retryable() && tries < self.retry_attempts => {
                        warn!(
                            request = what,
                            attempt = tries,
                            max_attempts = self.retry_attempts,
                            error = %err,
                            "remote call failed, retrying"
                        );
                        thread::sleep(self.retry_delay);
                    }
                    other => return other,
                }
            }
        }

        fn send(&self, method: Method, path: &str, body: Option<&ComputeRequest>) -> CalcResult<Response> {
            let mut request = self.client.request(method, self.url(path));
            if let Some(body) = body {
                request = request.json(body);
            }
            request
                .send()
                .map_err(|e| CalcError::transport(e.to_string()))
        }

        fn execute<T: DeserializeOwned>(
            &self,
            method: Method,
            path: &str,
            body: Option<&ComputeRequest>,
            kind: &str,
            key: &str,
        ) -> CalcResult<T> {
            self.with_retry(path, || {
                debug!(%method, url = %self.url(path), "remote request");
                let response = self.send(method.clone(), path, body)?;
                let status = response.status();
                if status.is_success() {
                    return response
                        .json::<T>()
                        .map_err(|e| CalcError::Serialization { reason: e.to_string() });
                }
                let text = response
                    .text()
                    .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
                Err(classify_status(status.as_u16(), &text, kind, key))
            })
        }
    }

    impl CalculationBackend for HttpBackend {
        fn name(&self) -> &'static str {
            "remote"
        }

        fn compute(&self, geometry: GeometryType, request: &CalculationRequest) -> CalcResult<CalculationResult> {
            let body = ComputeRequest::new(geometry, request.clone());
            self.execute(Method::POST, "/calculate", Some(&body), "Geometry type", geometry.key())
        }

        fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>> {
            let path = format!("/form/{}", geometry.key());
            let form: FormDefinition =
                self.execute(Method::GET, &path, None, "Geometry type", geometry.key())?;
            Ok(form.fields)
        }

        fn fetch_materials(&self) -> CalcResult<MaterialCatalogue> {
            self.execute(Method::GET, "/materials", None, "Materials", "catalogue")
        }
    }
}
