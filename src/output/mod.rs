pub mod human;
pub mod json;
pub mod report;
