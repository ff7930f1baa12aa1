//! Configuration structures for the CFDI pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main configuration for the cfdi pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfdiConfig {
    /// Extraction configuration.
    pub extraction: ExtractionConfig,

    /// Workbook output configuration.
    pub output: OutputConfig,

    /// Dispatch configuration.
    pub dispatch: DispatchConfig,
}

/// Record validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run consistency checks on every extracted record.
    pub validate: bool,

    /// Include RFC format checks in validation.
    pub validate_rfc: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validate: true,
            validate_rfc: true,
        }
    }
}

/// Workbook output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File stem used when no output path is given.
    pub default_name: String,

    /// Also write perceptions, deductions and other payments of payroll
    /// documents to a detail sheet.
    pub payroll_detail: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_name: "Excel_final".to_string(),
            payroll_detail: false,
        }
    }
}

/// What to do with a document that classifies correctly but lacks a
/// mandatory element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaErrorPolicy {
    /// Count the document as unknown and keep going.
    #[default]
    Skip,
    /// Stop the batch and report the error.
    Abort,
}

/// Dispatch settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Policy for schema violations.
    pub schema_errors: SchemaErrorPolicy,
}

impl CfdiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
