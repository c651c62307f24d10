//! # Result Cache
//!
//! Process-wide memo for schemas, the material catalogue and (optionally)
//! computed results. Construct one, wrap it in an `Arc`, and hand it to every
//! orchestrator that should share it.
//!
//! Schema and material slots are write-once: the first successful load fills
//! them and later loads never run. A failed load leaves the slot empty.
//! Result entries are keyed by `(geometry, serialized parameters)` and never
//! expire.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::calculations::CalculationResult;
use crate::config::CacheConfig;
use crate::errors::CalcResult;
use crate::geometry::GeometryType;
use crate::materials::MaterialCatalogue;
use crate::request::CalculationRequest;
use crate::schema::FieldDefinition;

type ResultKey = (GeometryType, String);

#[derive(Debug, Default)]
pub struct ResultCache {
    schemas: [OnceCell<Vec<FieldDefinition>>; 4],
    materials: OnceCell<MaterialCatalogue>,
    /// `None` when result memoization is switched off
    results: Option<Mutex<HashMap<ResultKey, CalculationResult>>>,
}

impl ResultCache {
    pub fn new(memoize_results: bool) -> Self {
        Self {
            results: memoize_results.then(|| Mutex::new(HashMap::new())),
            ..Self::default()
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.memoize_results)
    }

    // =========================================================================
    // Schemas and materials
    // =========================================================================

    /// Cached schema for `geometry`, running `load` on first use only.
    pub fn schema_or_load<F>(&self, geometry: GeometryType, load: F) -> CalcResult<&[FieldDefinition]>
    where
        F: FnOnce() -> CalcResult<Vec<FieldDefinition>>,
    {
        let slot = &self.schemas[geometry.index()];
        if let Some(schema) = slot.get() {
            debug!(%geometry, "schema cache hit");
            return Ok(schema);
        }
        debug!(%geometry, "schema cache miss");
        slot.get_or_try_init(load).map(Vec::as_slice)
    }

    pub fn cached_schema(&self, geometry: GeometryType) -> Option<&[FieldDefinition]> {
        self.schemas[geometry.index()].get().map(Vec::as_slice)
    }

    /// Number of geometries whose schema has been loaded
    pub fn cached_schema_count(&self) -> usize {
        self.schemas.iter().filter(|slot| slot.get().is_some()).count()
    }

    pub fn materials_or_load<F>(&self, load: F) -> CalcResult<&MaterialCatalogue>
    where
        F: FnOnce() -> CalcResult<MaterialCatalogue>,
    {
        if let Some(materials) = self.materials.get() {
            debug!("material cache hit");
            return Ok(materials);
        }
        debug!("material cache miss");
        self.materials.get_or_try_init(load)
    }

    pub fn materials_loaded(&self) -> bool {
        self.materials.get().is_some()
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn memoizes_results(&self) -> bool {
        self.results.is_some()
    }

    pub fn result(&self, geometry: GeometryType, request: &CalculationRequest) -> Option<CalculationResult> {
        let results = self.results.as_ref()?;
        let map = results.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = map.get(&(geometry, request.cache_key())).cloned();
        if hit.is_some() {
            debug!(%geometry, "result cache hit");
        }
        hit
    }

    pub fn store_result(&self, request: &CalculationRequest, result: &CalculationResult) {
        if let Some(results) = &self.results {
            let mut map = results.lock().unwrap_or_else(PoisonError::into_inner);
            map.insert((result.geometry, request.cache_key()), result.clone());
        }
    }

    pub fn memoized_result_count(&self) -> usize {
        self.results.as_ref().map_or(0, |results| {
            results.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalcError;
    use crate::schema::get_schema;
    use std::cell::Cell;

    #[test]
    fn test_schema_loaded_once() {
        let cache = ResultCache::new(false);
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok(get_schema(GeometryType::Coaxial))
        };
        let first = cache.schema_or_load(GeometryType::Coaxial, load).unwrap().to_vec();
        let second = cache
            .schema_or_load(GeometryType::Coaxial, || {
                calls.set(calls.get() + 1);
                Ok(Vec::new())
            })
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.cached_schema_count(), 1);
    }

    #[test]
    fn test_failed_load_leaves_slot_empty() {
        let cache = ResultCache::default();
        let result = cache.schema_or_load(GeometryType::Stripline, || {
            Err(CalcError::transport("connection refused"))
        });
        assert!(result.is_err());
        assert!(cache.cached_schema(GeometryType::Stripline).is_none());
        assert_eq!(cache.cached_schema_count(), 0);
    }

    #[test]
    fn test_result_memo() {
        let cache = ResultCache::new(true);
        let request = CalculationRequest::from_pairs([("innerDia", 20.0), ("outerDia", 46.0)]);
        let result = CalculationResult::new(GeometryType::Coaxial, 66.56);
        assert!(cache.result(GeometryType::Coaxial, &request).is_none());
        cache.store_result(&request, &result);
        assert_eq!(cache.result(GeometryType::Coaxial, &request), Some(result));
        assert!(cache.result(GeometryType::Microstrip, &request).is_none());
        assert_eq!(cache.memoized_result_count(), 1);
    }

    #[test]
    fn test_memo_disabled() {
        let cache = ResultCache::new(false);
        let request = CalculationRequest::from_pairs([("width", 1.0)]);
        cache.store_result(&request, &CalculationResult::new(GeometryType::Microstrip, 1.0));
        assert!(cache.result(GeometryType::Microstrip, &request).is_none());
        assert_eq!(cache.memoized_result_count(), 0);
    }
}
