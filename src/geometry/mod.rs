//! Geometric primitives and polygon tests

pub mod polygon;
pub mod types;
pub mod vector;

pub use types::*;
pub use vector::*;
