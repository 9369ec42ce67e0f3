//! Interface Detector Library
//!
//! Detects touching surface patches between B-rep solid bodies (coplanar
//! faces, coaxial cylinders, plane/cylinder tangency and shared edges) and
//! assembles the grouped face sets used for mesh-tying and contact setup.

pub mod catalog;
pub mod config;
pub mod contact;
pub mod error;
pub mod geometry;
pub mod io;
pub mod model;

pub use error::{InterfaceDetectorError, Result};
