//! Method definitions and the immutable catalog built from them.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::bounds::ValidationError;

pub const DEFAULT_LOWER_LIMIT: f64 = 0.0;
pub const DEFAULT_UPPER_LIMIT: f64 = 10_000_000.0;
pub const DEFAULT_DECIMALS: u32 = 4;
/// Display precision cap; an f64 carries about 17 significant digits.
pub const MAX_DECIMALS: u32 = 17;

/// One analytical method: its unit, display precision, input bounds and
/// r/R limits (static, formula-derived, or neither).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDefinition {
    pub name: String,
    pub unit: String,
    /// Static repeatability limit.
    #[serde(rename = "r")]
    pub static_r: Option<f64>,
    /// Static reproducibility limit.
    #[serde(rename = "R")]
    pub static_big_r: Option<f64>,
    /// Repeatability formula over `avg`.
    pub formula_r: Option<String>,
    /// Reproducibility formula over `avg`.
    #[serde(rename = "formula_R")]
    pub formula_big_r: Option<String>,
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub decimals: u32,
}

impl MethodDefinition {
    /// A method with no limits, default bounds and default precision.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            static_r: None,
            static_big_r: None,
            formula_r: None,
            formula_big_r: None,
            lower_limit: DEFAULT_LOWER_LIMIT,
            upper_limit: DEFAULT_UPPER_LIMIT,
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn with_static_limits(mut self, r: Option<f64>, big_r: Option<f64>) -> Self {
        self.static_r = r;
        self.static_big_r = big_r;
        self
    }

    pub fn with_formulas(mut self, r: Option<&str>, big_r: Option<&str>) -> Self {
        self.formula_r = r.map(str::to_string);
        self.formula_big_r = big_r.map(str::to_string);
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }
}

/// Method name -> definition, in first-appearance order.
///
/// Built once and never mutated afterwards; share it by reference (or `Arc`).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    methods: Vec<MethodDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog; a repeated name replaces the earlier definition but
    /// keeps its position.
    pub fn from_methods<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = MethodDefinition>,
    {
        let mut catalog = Self::default();
        for method in methods {
            catalog.insert(method);
        }
        catalog
    }

    pub(crate) fn insert(&mut self, method: MethodDefinition) {
        match self.index.get(&method.name) {
            Some(&slot) => {
                tracing::warn!(method = %method.name, "method redefined; last definition wins");
                self.methods[slot] = method;
            }
            None => {
                self.index.insert(method.name.clone(), self.methods.len());
                self.methods.push(method);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&MethodDefinition> {
        self.index.get(name).map(|&slot| &self.methods[slot])
    }

    /// Look up a method, failing with "no valid method selected".
    pub fn lookup(&self, name: &str) -> Result<&MethodDefinition, ValidationError> {
        self.get(name).ok_or_else(|| ValidationError::NoMethod {
            requested: Some(name.to_string()),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|method| method.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MethodDefinition> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a MethodDefinition;
    type IntoIter = std::slice::Iter<'a, MethodDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
