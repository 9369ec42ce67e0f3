//! Contact detection module

pub mod broad_phase;
pub mod classify;
pub mod detection;
pub mod diagnostics;
pub mod matcher;
pub mod nearest;
pub mod types;

pub use classify::{select_by_keyword, GroupFilter};
pub use detection::*;
pub use diagnostics::DiagnosticLog;
pub use types::*;
