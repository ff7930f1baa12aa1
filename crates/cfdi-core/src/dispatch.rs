//! Per-document routing: classify, extract, validate, write, count.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::{CfdiKind, Classification, classify_file};
use crate::error::{CfdiError, Result};
use crate::extract::{self, rules::RecordValidator};
use crate::models::config::{CfdiConfig, SchemaErrorPolicy};
use crate::sink::WorkbookSink;

/// Per-kind document counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Every document dispatched with a decided outcome.
    #[serde(rename = "Total")]
    pub total: usize,
    /// Invoices and credit notes.
    #[serde(rename = "I/E")]
    pub invoice_or_credit_note: usize,
    /// Payment complements.
    #[serde(rename = "P")]
    pub payment: usize,
    /// Payroll documents.
    #[serde(rename = "N")]
    pub payroll: usize,
    /// Unknown kinds, parse failures and skipped schema violations.
    #[serde(rename = "Desconocido")]
    pub unknown: usize,
}

impl Counters {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// `Total == I/E + P + N + Desconocido`.
    pub fn is_consistent(&self) -> bool {
        self.total == self.invoice_or_credit_note + self.payment + self.payroll + self.unknown
    }

    /// Count one document under `kind`; unknown kinds go to `Desconocido`.
    fn record(&mut self, kind: Option<&CfdiKind>) {
        self.total += 1;
        match kind {
            Some(CfdiKind::Invoice(_)) => self.invoice_or_credit_note += 1,
            Some(CfdiKind::Payment) => self.payment += 1,
            Some(CfdiKind::Payroll) => self.payroll += 1,
            Some(CfdiKind::Unknown(_)) | None => self.unknown += 1,
        }
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, I/E: {}, P: {}, N: {}, Desconocido: {}",
            self.total, self.invoice_or_credit_note, self.payment, self.payroll, self.unknown
        )
    }
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rows were appended to the workbook.
    Written {
        kind: CfdiKind,
        rows: usize,
        /// Validation findings; never block the write.
        warnings: Vec<String>,
    },
    /// Nothing was written; counted as `Desconocido`.
    Skipped { reason: String },
}

impl Outcome {
    /// Whether rows were written.
    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Written { .. })
    }
}

/// Routes documents through classification, extraction and the workbook.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    sink: WorkbookSink,
    validator: Option<RecordValidator>,
    schema_errors: SchemaErrorPolicy,
}

impl Dispatcher {
    /// Create a dispatcher with default settings: validation on, schema
    /// violations skipped, no payroll detail sheet.
    pub fn new() -> Self {
        Self {
            sink: WorkbookSink::new(),
            validator: Some(RecordValidator::new()),
            schema_errors: SchemaErrorPolicy::default(),
        }
    }

    /// Create a dispatcher from configuration.
    pub fn from_config(config: &CfdiConfig) -> Self {
        Self::new()
            .with_validation(config.extraction.validate, config.extraction.validate_rfc)
            .with_payroll_detail(config.output.payroll_detail)
            .with_schema_error_policy(config.dispatch.schema_errors)
    }

    /// Set the schema violation policy.
    pub fn with_schema_error_policy(mut self, policy: SchemaErrorPolicy) -> Self {
        self.schema_errors = policy;
        self
    }

    /// Set whether payroll detail rows are written.
    pub fn with_payroll_detail(mut self, enabled: bool) -> Self {
        self.sink = self.sink.with_payroll_detail(enabled);
        self
    }

    /// Enable or disable record validation.
    pub fn with_validation(mut self, enabled: bool, rfc: bool) -> Self {
        self.validator = enabled.then(|| RecordValidator::new().with_rfc_validation(rfc));
        self
    }

    /// Dispatch one XML file into the workbook at `output`.
    ///
    /// Malformed XML, unknown kinds and, under [`SchemaErrorPolicy::Skip`],
    /// schema violations are counted as `Desconocido` and reported as
    /// [`Outcome::Skipped`]. Workbook errors and, under
    /// [`SchemaErrorPolicy::Abort`], schema violations are returned without
    /// touching `counters`.
    pub fn dispatch(&self, path: &Path, output: &Path, counters: &mut Counters) -> Result<Outcome> {
        let (classification, document) = classify_file(path);

        let (kind, document) = match (classification, document) {
            (Classification::Kind(kind), Some(document)) if kind.is_known() => (kind, document),
            (Classification::Kind(kind), _) => {
                warn!("Skipping {}: unsupported kind {}", path.display(), kind);
                counters.record(None);
                return Ok(Outcome::Skipped {
                    reason: format!("unsupported kind {}", kind),
                });
            }
            (Classification::ParseError(reason), _) => {
                warn!("Skipping {}: {}", path.display(), reason);
                counters.record(None);
                return Ok(Outcome::Skipped { reason });
            }
        };

        let record = match extract::extract(&document, &kind) {
            Ok(Some(record)) => record,
            Ok(None) => {
                counters.record(None);
                return Ok(Outcome::Skipped {
                    reason: format!("unsupported kind {}", kind),
                });
            }
            Err(e) => match self.schema_errors {
                SchemaErrorPolicy::Skip => {
                    warn!("Skipping {}: {}", path.display(), e);
                    counters.record(None);
                    return Ok(Outcome::Skipped {
                        reason: e.to_string(),
                    });
                }
                SchemaErrorPolicy::Abort => {
                    return Err(CfdiError::Rejected {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            },
        };

        let warnings = match &self.validator {
            Some(validator) => validator.validate(&record),
            None => Vec::new(),
        };
        for issue in &warnings {
            warn!("{}: {}", path.display(), issue);
        }

        let rows = self.sink.write(&record, output)?;
        counters.record(Some(&kind));
        info!(
            "Wrote {} ({}) to {}: {} rows",
            path.display(),
            kind,
            output.display(),
            rows
        );

        Ok(Outcome::Written {
            kind,
            rows,
            warnings,
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch one file with default settings.
pub fn dispatch(path: &Path, output: &Path, counters: &mut Counters) -> Result<Outcome> {
    Dispatcher::new().dispatch(path, output, counters)
}
