//! Tolerance engine: bounds validation, limit resolution and the r/R check.

pub mod bounds;
pub mod calculate;
pub mod formula;
