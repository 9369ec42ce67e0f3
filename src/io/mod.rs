//! I/O module for reading body sets and writing detection reports

pub mod json;
pub mod report;

pub use json::{parse_json_bodies, read_json_bodies, write_json_bodies};
pub use report::{write_log, ContactReport};
