//! Orchestrator scenarios across the public API.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use zcal_core::materials::MaterialCatalogue;
use zcal_core::{
    CalcError, CalcResult, CalculationBackend, CalculationRequest, CalculationResult,
    FieldDefinition, GeometryType, LocalBackend, Orchestrator, Phase, ResultCache,
};

/// Local backend that counts every call it receives.
#[derive(Default)]
struct CountingBackend {
    computes: Cell<usize>,
    schema_loads: Cell<usize>,
    material_loads: Cell<usize>,
}

impl CalculationBackend for CountingBackend {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn compute(&self, geometry: GeometryType, request: &CalculationRequest) -> CalcResult<CalculationResult> {
        self.computes.set(self.computes.get() + 1);
        LocalBackend.compute(geometry, request)
    }

    fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>> {
        self.schema_loads.set(self.schema_loads.get() + 1);
        LocalBackend.fetch_schema(geometry)
    }

    fn fetch_materials(&self) -> CalcResult<MaterialCatalogue> {
        self.material_loads.set(self.material_loads.get() + 1);
        LocalBackend.fetch_materials()
    }
}

/// Backend whose compute endpoint is unreachable.
struct OfflineBackend;

impl CalculationBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn compute(&self, _: GeometryType, _: &CalculationRequest) -> CalcResult<CalculationResult> {
        Err(CalcError::transport("connection refused"))
    }

    fn fetch_schema(&self, geometry: GeometryType) -> CalcResult<Vec<FieldDefinition>> {
        LocalBackend.fetch_schema(geometry)
    }

    fn fetch_materials(&self) -> CalcResult<MaterialCatalogue> {
        Err(CalcError::transport("connection refused"))
    }
}

fn counting(memoize: bool) -> Orchestrator<CountingBackend> {
    Orchestrator::new(CountingBackend::default(), Arc::new(ResultCache::new(memoize)))
}

#[test]
fn test_missing_required_field_fails_without_computing() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Coaxial).unwrap();
    form.set_field("outerDia", 46.0).unwrap();

    let err = form.submit().unwrap_err();

    let errors = err.field_errors().expect("validation errors");
    assert!(errors.contains_key("innerDia"));
    assert!(!errors.contains_key("dielectric"));
    assert_eq!(form.phase(), Phase::Failed);
    assert_eq!(form.backend().computes.get(), 0);

    let info = form.state().error.as_ref().unwrap();
    assert_eq!(info.code, "VALIDATION_FAILED");
    assert!(info.field_errors.contains_key("innerDia"));
}

#[test]
fn test_unknown_geometry_leaves_cache_untouched() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Microstrip).unwrap();
    let cached_before = form.cache().cached_schema_count();

    let err = form.select_geometry_by_key("slotline").unwrap_err();

    assert!(matches!(err, CalcError::NotFound { .. }));
    assert_eq!(form.cache().cached_schema_count(), cached_before);
    assert_eq!(form.backend().schema_loads.get(), 1);
    assert_eq!(form.phase(), Phase::Failed);
    assert_eq!(form.state().selected, Some(GeometryType::Microstrip));
}

#[test]
fn test_schema_cache_shared_between_forms() {
    let cache = Arc::new(ResultCache::new(false));
    let mut first = Orchestrator::new(CountingBackend::default(), Arc::clone(&cache));
    let mut second = Orchestrator::new(CountingBackend::default(), Arc::clone(&cache));

    first.select_geometry(GeometryType::Stripline).unwrap();
    second.select_geometry(GeometryType::Stripline).unwrap();

    assert_eq!(first.backend().schema_loads.get(), 1);
    assert_eq!(second.backend().schema_loads.get(), 0);
    assert_eq!(first.state().fields, second.state().fields);
    assert_ne!(first.session_id(), second.session_id());
}

#[test]
fn test_result_memoization() {
    let mut form = counting(true);
    form.select_geometry(GeometryType::Coaxial).unwrap();
    form.set_field("innerDia", 20.0).unwrap();
    form.set_field("outerDia", 46.0).unwrap();

    let first = form.submit().unwrap();
    let second = form.submit().unwrap();

    assert_eq!(first, second);
    assert_eq!(form.backend().computes.get(), 1);
    assert_eq!(form.cache().memoized_result_count(), 1);
}

#[test]
fn test_material_catalogue_loaded_once() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Stripline).unwrap();
    form.select_material("FR4_HF").unwrap();
    form.select_material("Ceramic").unwrap();
    assert_eq!(form.backend().material_loads.get(), 1);
}

#[test]
fn test_material_does_not_change_outcome() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Microstrip).unwrap();
    form.set_field("width", 10.0).unwrap();
    form.set_field("height", 62.0).unwrap();
    form.submit().unwrap();

    form.select_material("Teflon_PTFE").unwrap();

    assert_eq!(form.phase(), Phase::Success);
    let result = form.submit().unwrap();
    // εr 2.1 → sqrt(1.55)
    assert!(result.impedance > 84.35);
}

#[test]
fn test_transport_failure_is_observable() {
    let mut form = Orchestrator::new(OfflineBackend, Arc::new(ResultCache::new(false)));
    form.select_geometry(GeometryType::Coaxial).unwrap();
    form.set_field("innerDia", 20.0).unwrap();
    form.set_field("outerDia", 46.0).unwrap();

    let err = form.submit().unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(form.phase(), Phase::Failed);
    assert_eq!(form.state().error.as_ref().unwrap().code, "TRANSPORT_ERROR");
    assert!(form.state().result.is_none());

    let err = form.select_material("FR4").unwrap_err();
    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    assert!(!form.cache().materials_loaded());
}

#[test]
fn test_stale_outcome_after_reset_is_dropped() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Coaxial).unwrap();
    form.set_field("innerDia", 20.0).unwrap();
    form.set_field("outerDia", 46.0).unwrap();

    let submission = form.begin_submission().unwrap();
    let outcome = form.compute(&submission);
    form.reset();

    assert!(!form.complete_submission(submission, outcome));
    assert_eq!(form.phase(), Phase::Idle);
}

#[test]
fn test_resubmit_after_failure_recovers() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Stripline).unwrap();
    form.set_field("width", 5.0).unwrap();
    form.set_field("height", 10.0).unwrap();
    form.set_field("spacing", 12.0).unwrap();

    assert!(matches!(form.submit(), Err(CalcError::Domain { .. })));
    assert_eq!(form.phase(), Phase::Failed);

    form.set_field("spacing", 60.0).unwrap();
    let result = form.submit().unwrap();
    assert_eq!(result.impedance, 46.46);
    assert!(form.state().error.is_none());
}

#[test]
fn test_differential_submission() {
    let mut form = counting(false);
    form.select_geometry_by_key("Differential").unwrap();
    for (key, value) in [("width", 10.0), ("height", 62.0), ("spacing", 6.0)] {
        form.set_field(key, value).unwrap();
    }
    let result = form.submit().unwrap();
    assert_eq!(result.single, Some(84.35));
    assert_eq!(result.differential, Some(101.22));
}

#[test]
fn test_state_serializes_for_observers() {
    let mut form = counting(false);
    form.select_geometry(GeometryType::Coaxial).unwrap();
    form.set_field("innerDia", "20").unwrap();
    let json = serde_json::to_value(form.state()).unwrap();
    assert_eq!(json["selected"], "coaxial");
    assert_eq!(json["fields"][0]["key"], "innerDia");
    assert_eq!(json["fields"][0]["enteredValue"], "20");
    assert_eq!(json["is_loading"], false);
    let _: BTreeMap<String, serde_json::Value> = serde_json::from_value(json).unwrap();
}
