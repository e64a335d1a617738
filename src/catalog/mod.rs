//! Method catalog: CSV source -> immutable name -> `MethodDefinition` map.

pub mod cells;
pub mod input;
pub mod load;
pub mod method;
