pub mod codes;
pub mod domain;
