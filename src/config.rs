//! Configuration file support for batch analysis

use crate::contact::{DetectionCriteria, GroupFilter};
use crate::error::{InterfaceDetectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Input body-set JSON file
    pub input_file: String,

    /// Report file (optional, no report is written if not specified)
    #[serde(default)]
    pub output_file: Option<String>,

    /// Body name keyword for the first side
    #[serde(default)]
    pub keyword_a: Option<String>,

    /// Body name keyword for the second side (requires `keyword_a`)
    #[serde(default)]
    pub keyword_b: Option<String>,

    /// Contact detection criteria
    #[serde(default)]
    pub criteria: DetectionCriteria,
}

impl AnalysisConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            InterfaceDetectorError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            InterfaceDetectorError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.criteria.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            InterfaceDetectorError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content).map_err(|e| {
            InterfaceDetectorError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Group filter described by the keywords
    pub fn group_filter(&self) -> Result<GroupFilter> {
        GroupFilter::from_keywords(self.keyword_a.as_deref(), self.keyword_b.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"input_file": "assembly.json"}"#).unwrap();

        assert_eq!(config.input_file, "assembly.json");
        assert!(config.output_file.is_none());
        assert_eq!(config.criteria, DetectionCriteria::default());
        assert_eq!(config.group_filter().unwrap(), GroupFilter::All);
    }

    #[test]
    fn test_partial_criteria() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{
                "input_file": "assembly.json",
                "keyword_a": "Bolt",
                "criteria": {"tolerance": 0.5, "detect_edges": false}
            }"#,
        )
        .unwrap();

        assert_eq!(config.criteria.tolerance, 0.5);
        assert!(!config.criteria.detect_edges);
        assert!(config.criteria.detect_planar);
        assert_eq!(
            config.group_filter().unwrap(),
            GroupFilter::Single("Bolt".to_string())
        );
    }

    #[test]
    fn test_keyword_b_alone_is_rejected() {
        let config = AnalysisConfig {
            input_file: "assembly.json".to_string(),
            output_file: None,
            keyword_a: None,
            keyword_b: Some("Plate".to_string()),
            criteria: DetectionCriteria::default(),
        };
        assert!(config.group_filter().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AnalysisConfig {
            input_file: "assembly.json".to_string(),
            output_file: Some("contacts.json".to_string()),
            keyword_a: Some("Bolt".to_string()),
            keyword_b: Some("Plate".to_string()),
            criteria: DetectionCriteria::new(0.25),
        };
        config.to_file(&path).unwrap();

        let loaded = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(loaded.output_file.as_deref(), Some("contacts.json"));
        assert_eq!(loaded.criteria.tolerance, 0.25);
        assert_eq!(
            loaded.group_filter().unwrap(),
            GroupFilter::Between("Bolt".to_string(), "Plate".to_string())
        );
    }

    #[test]
    fn test_invalid_tolerance_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"input_file": "a.json", "criteria": {"tolerance": -1.0}}"#,
        )
        .unwrap();

        assert!(AnalysisConfig::from_file(&path).is_err());
    }
}
