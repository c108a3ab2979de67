//! Integration tests for cached model runs against on-disk stores.
//!
//! These tests drive real models through `Cache::compute_with_cache` with
//! file and SQLite backends in temporary directories, checking reuse,
//! invalidation, persistence and fail-open behavior end to end.

use std::path::Path;

use geox_cache::{
    decode, open_cache, Cache, CacheOutcome, Computable, FieldRole, Identity, PutAck, Schema,
};
use geox_config::{BackendKind, CacheConfig};
use geox_models::names::*;
use geox_models::{Economics, ModelError, Simulation};
use geox_params::{InputEntry, InputSet, OutputSet};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper: count how often a model really computes
// ---------------------------------------------------------------------------

struct Counting<M> {
    inner: M,
    computes: usize,
}

impl<M> Counting<M> {
    fn new(inner: M) -> Self {
        Self { inner, computes: 0 }
    }
}

impl<M: Computable<Error = ModelError>> Computable for Counting<M> {
    type Error = ModelError;

    fn identity(&self) -> Identity {
        self.inner.identity()
    }

    fn schema(&self) -> &Schema {
        self.inner.schema()
    }

    fn inputs(&self) -> &InputSet {
        self.inner.inputs()
    }

    fn outputs(&self) -> &OutputSet {
        self.inner.outputs()
    }

    fn restore(&mut self, inputs: InputSet, outputs: OutputSet) {
        self.inner.restore(inputs, outputs)
    }

    fn compute(&mut self) -> Result<(), ModelError> {
        self.computes += 1;
        self.inner.compute()
    }
}

// ---------------------------------------------------------------------------
// Helper: caches and models
// ---------------------------------------------------------------------------

fn file_cache(dir: &Path) -> Cache {
    let config = CacheConfig {
        path: "cache".to_string(),
        principal: Some("analyst".to_string()),
        ..CacheConfig::default()
    };
    open_cache(&config, dir)
}

fn sqlite_cache(dir: &Path) -> Cache {
    let config = CacheConfig {
        backend: BackendKind::Sqlite,
        path: "geox.sqlite".to_string(),
        ..CacheConfig::default()
    };
    open_cache(&config, dir)
}

fn economics(capital: &str) -> Counting<Economics> {
    let mut e = Economics::new();
    let inputs = e.inputs_mut();
    inputs.apply(DISCOUNT_RATE, "0.07").unwrap();
    inputs.apply(CAPITAL_COST, capital).unwrap();
    inputs.apply(PLANT_LIFETIME, "30").unwrap();
    Counting::new(e)
}

// ---------------------------------------------------------------------------
// Reuse and invalidation
// ---------------------------------------------------------------------------

#[test]
fn identical_economics_is_reused() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());

    let mut first = economics("12.5");
    let outcome = cache.compute_with_cache(&mut first).unwrap();
    assert!(matches!(outcome, CacheOutcome::Computed { ack: PutAck::Stored, .. }));
    assert_eq!(first.computes, 1);
    let fp = *outcome.fingerprint().unwrap();

    let mut second = economics("12.5");
    let outcome = cache.compute_with_cache(&mut second).unwrap();
    assert_eq!(outcome, CacheOutcome::Hit { fingerprint: fp });
    assert_eq!(second.computes, 0);
    assert_eq!(
        second.outputs().float(LCOE).unwrap(),
        first.outputs().float(LCOE).unwrap()
    );

    let entry = cache.inspect(&fp).unwrap().unwrap();
    assert_eq!(entry.principal, "analyst");
    let tree = decode(&entry.payload).unwrap();
    let rate = tree.find(FieldRole::Input, DISCOUNT_RATE).unwrap();
    assert_eq!(rate.value(), Some(&serde_json::json!(0.07)));
}

#[test]
fn changed_capital_cost_is_a_new_entry() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());

    let mut a = economics("12.5");
    let fp_a = *cache.compute_with_cache(&mut a).unwrap().fingerprint().unwrap();
    let payload_a = cache.inspect(&fp_a).unwrap().unwrap().payload;

    let mut b = economics("12.6");
    let outcome = cache.compute_with_cache(&mut b).unwrap();
    assert!(matches!(outcome, CacheOutcome::Computed { ack: PutAck::Stored, .. }));
    assert_eq!(b.computes, 1);
    let fp_b = *outcome.fingerprint().unwrap();
    assert_ne!(fp_a, fp_b);

    assert_eq!(cache.inspect(&fp_a).unwrap().unwrap().payload, payload_a);
    assert!(b.outputs().float(LCOE).unwrap() > a.outputs().float(LCOE).unwrap());
}

#[test]
fn entries_survive_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    {
        let cache = sqlite_cache(dir.path());
        cache.compute_with_cache(&mut economics("12.5")).unwrap();
    }
    let cache = sqlite_cache(dir.path());
    let mut again = economics("12.5");
    assert!(cache.compute_with_cache(&mut again).unwrap().is_hit());
    assert_eq!(again.computes, 0);
}

// ---------------------------------------------------------------------------
// Whole pipeline
// ---------------------------------------------------------------------------

#[test]
fn second_pipeline_run_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());

    let mut first = Simulation::new();
    let report = first.calculate(&cache).unwrap();
    assert_eq!(report.hits(), 0);

    let mut second = Simulation::new();
    let report = second.calculate(&cache).unwrap();
    assert_eq!(report.hits(), 4);
    assert_eq!(
        second.economics.outputs().float(LCOE).unwrap(),
        first.economics.outputs().float(LCOE).unwrap()
    );
}

#[test]
fn downstream_change_reuses_upstream_stages() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());
    Simulation::new().calculate(&cache).unwrap();

    let mut sim = Simulation::new();
    let inputs = [(ELECTRICITY_RATE.to_string(), InputEntry::new("0.09"))]
        .into_iter()
        .collect();
    sim.apply_inputs(&inputs).unwrap();
    let report = sim.calculate(&cache).unwrap();

    assert_eq!(report.hits(), 3);
    assert!(!report.outcome(geox_common::DomainKind::Economics).unwrap().is_hit());
}

#[test]
fn upstream_change_invalidates_downstream() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());
    Simulation::new().calculate(&cache).unwrap();

    let mut sim = Simulation::new();
    let inputs = [(GRADIENT.to_string(), InputEntry::new("55"))].into_iter().collect();
    sim.apply_inputs(&inputs).unwrap();
    let report = sim.calculate(&cache).unwrap();
    assert_eq!(report.hits(), 0);
}

// ---------------------------------------------------------------------------
// Fail-open
// ---------------------------------------------------------------------------

#[test]
fn disabled_cache_always_computes() {
    let cache = Cache::disabled();
    for _ in 0..2 {
        let mut e = economics("12.5");
        assert_eq!(cache.compute_with_cache(&mut e).unwrap(), CacheOutcome::Bypassed);
        assert_eq!(e.computes, 1);
    }
}

#[test]
fn unreachable_store_still_produces_results() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cache"), b"not a directory").unwrap();
    let cache = file_cache(dir.path());

    let mut expected = Simulation::new();
    expected.calculate(&Cache::disabled()).unwrap();

    let mut sim = Simulation::new();
    let report = sim.calculate(&cache).unwrap();
    assert_eq!(report.hits(), 0);
    assert!(report
        .stages
        .iter()
        .all(|s| matches!(s.outcome, CacheOutcome::Computed { ack: PutAck::Failed(_), .. })));
    assert_eq!(
        sim.economics.outputs().float(LCOE).unwrap(),
        expected.economics.outputs().float(LCOE).unwrap()
    );
}

#[test]
fn corrupted_entry_is_recomputed() {
    let dir = TempDir::new().unwrap();
    let cache = file_cache(dir.path());
    let mut first = economics("12.5");
    let fp = *cache.compute_with_cache(&mut first).unwrap().fingerprint().unwrap();

    let path = dir.path().join("cache").join("entries").join(format!("{fp}.entry"));
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    let mut again = economics("12.5");
    let outcome = cache.compute_with_cache(&mut again).unwrap();
    assert!(!outcome.is_hit());
    assert_eq!(again.computes, 1);
    assert_eq!(
        again.outputs().float(LCOE).unwrap(),
        first.outputs().float(LCOE).unwrap()
    );
}
