//! # Endpoint Layer
//!
//! Transport-agnostic request handling for the compute service. An HTTP
//! server (or the CLI `api` command) passes method, path and body to
//! [`ApiService::handle`] and writes back the returned status and JSON.
//!
//! ## Routes
//!
//! | Method | Path              | Response                                 |
//! |--------|-------------------|------------------------------------------|
//! | POST   | `/calculate`      | `CalculationResult`                      |
//! | GET    | `/form/{type}`    | `FormDefinition`, 404 for unknown types  |
//! | GET    | `/forms`          | `{ "forms": [FormDefinition, ...] }`     |
//! | GET    | `/materials`      | material key → material                  |
//! | GET    | `/material/{key}` | one material, 404 for unknown keys       |
//! | GET    | `/health`         | `{ "status": "ok", "timestamp": ... }`   |
//!
//! A leading `/api` prefix and any query string are ignored. Unknown paths
//! are 404 `{ "error": "Not Found" }`; a known path with the wrong method
//! is 405.
//!
//! Successful `/calculate` responses are kept for `response_ttl_secs`
//! (0 disables the cache). Expired entries are purged on every store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::backend::ComputeRequest;
use crate::calculations::calculate_request;
use crate::config::CacheConfig;
use crate::errors::CalcError;
use crate::geometry::GeometryType;
use crate::materials::{get_material, list_materials};
use crate::schema::{all_forms, form_definition};

/// Status and JSON body of one handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    fn from_error(err: &CalcError) -> Self {
        if matches!(err, CalcError::Internal { .. }) {
            error!(error = %err, "internal error while handling request");
        }
        Self::error(err.http_status(), err.to_string())
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::ok(body),
            Err(e) => Self::from_error(&CalcError::internal(e.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

struct CachedResponse {
    stored_at: DateTime<Utc>,
    body: Value,
}

/// Stateless apart from the `/calculate` response cache.
pub struct ApiService {
    ttl_secs: i64,
    responses: Mutex<HashMap<String, CachedResponse>>,
}

impl Default for ApiService {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl ApiService {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            responses: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.response_ttl_secs)
    }

    /// Handle one request at the current time.
    pub fn handle(&self, method: &str, path: &str, body: Option<&str>) -> ApiResponse {
        self.handle_at(method, path, body, Utc::now())
    }

    /// Handle one request as if it arrived at `now`.
    pub fn handle_at(&self, method: &str, path: &str, body: Option<&str>, now: DateTime<Utc>) -> ApiResponse {
        let method = method.trim().to_ascii_uppercase();
        let segments = route_segments(path);
        debug!(%method, path, "api request");

        let allowed = match segments.as_slice() {
            ["calculate"] => "POST",
            ["form", _] | ["forms"] | ["materials"] | ["material", _] | ["health"] => "GET",
            _ => return ApiResponse::error(404, "Not Found"),
        };
        if method != allowed {
            return ApiResponse::error(405, "Method Not Allowed");
        }

        match segments.as_slice() {
            ["calculate"] => self.calculate(body.unwrap_or(""), now),
            ["form", key] => match key.parse::<GeometryType>() {
                Ok(geometry) => ApiResponse::json(&form_definition(geometry)),
                Err(err) => ApiResponse::from_error(&err),
            },
            ["forms"] => ApiResponse::ok(json!({ "forms": all_forms() })),
            ["materials"] => ApiResponse::json(list_materials()),
            ["material", key] => match get_material(key) {
                Ok(material) => ApiResponse::json(material),
                Err(_) => ApiResponse::error(404, "Material not found"),
            },
            ["health"] => ApiResponse::ok(json!({
                "status": "ok",
                "timestamp": now.to_rfc3339(),
            })),
            _ => ApiResponse::error(404, "Not Found"),
        }
    }

    fn calculate(&self, body: &str, now: DateTime<Utc>) -> ApiResponse {
        let compute: ComputeRequest = match serde_json::from_str(body) {
            Ok(compute) => compute,
            Err(e) => return ApiResponse::from_error(&CalcError::from(e)),
        };
        let geometry = match compute.geometry.parse::<GeometryType>() {
            Ok(geometry) => geometry,
            Err(_) => return ApiResponse::error(400, format!("Invalid type: {}", compute.geometry)),
        };

        let key = format!("{}:{}", geometry, compute.params.cache_key());
        if let Some(body) = self.cached(&key, now) {
            debug!(%geometry, "response cache hit");
            return ApiResponse::ok(body);
        }

        match calculate_request(geometry, &compute.params) {
            Ok(result) => {
                let response = ApiResponse::json(&result);
                if response.is_success() {
                    self.store(key, &response.body, now);
                }
                response
            }
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    fn cached(&self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        if self.ttl_secs == 0 {
            return None;
        }
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.get(key) {
            Some(entry) if self.is_fresh(entry, now) => {
                Some(entry.body.clone())
            }
            Some(_) => {
                responses.remove(key);
                None
            }
            None => None,
        }
    }

    fn is_fresh(&self, entry: &CachedResponse, now: DateTime<Utc>) -> bool {
        (now - entry.stored_at).num_seconds() < self.ttl_secs
    }

    fn store(&self, key: String, body: &Value, now: DateTime<Utc>) {
        if self.ttl_secs == 0 {
            return;
        }
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        let before = responses.len();
        responses.retain(|_, entry| self.is_fresh(entry, now));
        if responses.len() < before {
            debug!(purged = before - responses.len(), "expired responses dropped");
        }
        responses.insert(
            key,
            CachedResponse {
                stored_at: now,
                body: body.clone(),
            },
        );
    }

    pub fn cached_response_count(&self) -> usize {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Path segments with query string, empty segments and `/api` prefix removed.
fn route_segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first() == Some(&"api") {
        segments.remove(0);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_segments() {
        assert_eq!(route_segments("/api/form/coaxial"), ["form", "coaxial"]);
        assert_eq!(route_segments("/health?x=1"), ["health"]);
        assert_eq!(route_segments("//forms/"), ["forms"]);
        assert!(route_segments("/api").is_empty());
    }

    #[test]
    fn test_health() {
        let api = ApiService::default();
        let response = api.handle("GET", "/api/health", None);
        assert_eq!(response.status, 200);
        assert_eq!(response.body["status"], "ok");
        assert!(response.body["timestamp"].is_string());
    }

    #[test]
    fn test_not_found_and_method() {
        let api = ApiService::default();
        let response = api.handle("GET", "/nowhere", None);
        assert_eq!(response.status, 404);
        assert_eq!(response.body, json!({ "error": "Not Found" }));
        assert_eq!(api.handle("GET", "/calculate", None).status, 405);
        assert_eq!(api.handle("DELETE", "/forms", None).status, 405);
    }

    #[test]
    fn test_ttl_disabled() {
        let api = ApiService::new(0);
        let body = r#"{"type":"coaxial","params":{"innerDia":20,"outerDia":46,"dielectric":2.25}}"#;
        assert_eq!(api.handle("POST", "/calculate", Some(body)).status, 200);
        assert_eq!(api.cached_response_count(), 0);
    }

    #[test]
    fn test_ttl_expiry() {
        let api = ApiService::new(3600);
        let body = r#"{"type":"coaxial","params":{"innerDia":20,"outerDia":46,"dielectric":2.25}}"#;
        let start = Utc::now();
        api.handle_at("POST", "/calculate", Some(body), start);
        assert_eq!(api.cached_response_count(), 1);
        assert!(api.cached("coaxial:dielectric=2.25&innerDia=20&outerDia=46", start).is_some());
        let later = start + chrono::Duration::seconds(3601);
        assert!(api.cached("coaxial:dielectric=2.25&innerDia=20&outerDia=46", later).is_none());
        assert_eq!(api.cached_response_count(), 0);
    }

    #[test]
    fn test_store_purges_expired_entries() {
        let api = ApiService::new(1);
        let start = Utc::now();
        for inner in 1..=50 {
            let body = format!(
                r#"{{"type":"coaxial","params":{{"innerDia":{},"outerDia":200,"dielectric":2.25}}}}"#,
                inner
            );
            assert_eq!(api.handle_at("POST", "/calculate", Some(&body), start).status, 200);
        }
        assert_eq!(api.cached_response_count(), 50);

        let later = start + chrono::Duration::seconds(3600);
        let body = r#"{"type":"coaxial","params":{"innerDia":20,"outerDia":46,"dielectric":2.25}}"#;
        api.handle_at("POST", "/calculate", Some(body), later);
        assert_eq!(api.cached_response_count(), 1);
    }
}
