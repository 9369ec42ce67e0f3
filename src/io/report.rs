//! JSON export of detection results

use crate::contact::{
    ContactPair, DetectionCriteria, DetectionReport, DetectionStats, DiagnosticLog,
    InterfaceSummary, NamedGroup,
};
use crate::error::{InterfaceDetectorError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Complete record of one detection run
#[derive(Debug, Serialize)]
pub struct ContactReport<'a> {
    /// Source body file
    pub input_file: String,

    /// Timestamp when analysis was performed
    pub timestamp: String,

    pub criteria: &'a DetectionCriteria,
    pub stats: &'a DetectionStats,
    pub pairs: &'a [ContactPair],
    pub groups: &'a [NamedGroup],
    pub interfaces: &'a [InterfaceSummary],
    pub log: &'a DiagnosticLog,
}

impl<'a> ContactReport<'a> {
    /// Wrap a detection report for export
    pub fn new(input_file: impl Into<String>, report: &'a DetectionReport) -> Self {
        Self {
            input_file: input_file.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            criteria: &report.criteria,
            stats: &report.stats,
            pairs: &report.pairs,
            groups: &report.groups,
            interfaces: &report.interfaces,
            log: &report.log,
        }
    }

    /// Export to a JSON file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            InterfaceDetectorError::ConfigError(format!("Failed to write JSON report: {}", e))
        })?;
        Ok(())
    }
}

/// Write the diagnostic log as plain text, one entry per line
pub fn write_log<P: AsRef<Path>>(log: &DiagnosticLog, path: P) -> Result<()> {
    std::fs::write(path, log.to_text())?;
    Ok(())
}
