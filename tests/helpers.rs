#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rrcheck::{Catalog, MethodDefinition, load_catalog};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("fixture should be readable")
}

pub fn fixture_catalog(name: &str) -> Catalog {
    load_catalog(fixture_path(name)).expect("fixture catalog should load")
}

/// `MethodA,2.0,5.0,mg/L,,,2,0,1000`
pub fn method_a() -> MethodDefinition {
    MethodDefinition::new("MethodA", "mg/L")
        .with_static_limits(Some(2.0), Some(5.0))
        .with_bounds(0.0, 1000.0)
        .with_decimals(2)
}

pub fn assert_close(actual: f64, expected: f64) {
    let diff = (actual - expected).abs();
    assert!(diff <= 1e-9, "expected {expected}, got {actual}");
}
