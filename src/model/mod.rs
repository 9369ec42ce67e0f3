//! Input model: bodies, faces, surfaces and edges
//!
//! This is the minimal capability surface the detector needs from a solid
//! modeler. Anything that can report faces with analytic surfaces and
//! boundary edges can be adapted into these types.

pub mod body;
pub mod shapes;

pub use body::*;
