//! CFDI kind detection from the root `TipoDeComprobante` attribute.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::xml::XmlDocument;

/// Attribute on the root element that declares the document kind.
pub const KIND_ATTRIBUTE: &str = "TipoDeComprobante";

/// Income or expense flag of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoucherType {
    /// Ingreso ("I").
    #[serde(rename = "I")]
    Income,
    /// Egreso, i.e. a credit note ("E").
    #[serde(rename = "E")]
    Expense,
}

impl VoucherType {
    /// The single-letter code used in the XML.
    pub fn code(&self) -> &'static str {
        match self {
            VoucherType::Income => "I",
            VoucherType::Expense => "E",
        }
    }

    /// Parse the single-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "I" => Some(VoucherType::Income),
            "E" => Some(VoucherType::Expense),
            _ => None,
        }
    }
}

/// Kind of a well-formed CFDI document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfdiKind {
    /// Invoice or credit note.
    Invoice(VoucherType),
    /// Payment complement ("P").
    Payment,
    /// Payroll ("N").
    Payroll,
    /// Missing, empty, or unsupported kind. Keeps the raw value, if any.
    Unknown(Option<String>),
}

impl CfdiKind {
    /// Whether an extractor exists for this kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, CfdiKind::Unknown(_))
    }
}

impl fmt::Display for CfdiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfdiKind::Invoice(voucher) => write!(f, "{}", voucher.code()),
            CfdiKind::Payment => write!(f, "P"),
            CfdiKind::Payroll => write!(f, "N"),
            CfdiKind::Unknown(Some(raw)) => write!(f, "unknown ({})", raw),
            CfdiKind::Unknown(None) => write!(f, "unknown"),
        }
    }
}

/// Classification of an input file, including parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The file parsed; this is its kind.
    Kind(CfdiKind),
    /// The file could not be read or is not well-formed XML.
    ParseError(String),
}

/// Classify a parsed document.
///
/// Depends only on the root's `TipoDeComprobante` attribute.
pub fn classify(document: &XmlDocument) -> CfdiKind {
    let Some(raw) = document.root().attr(KIND_ATTRIBUTE) else {
        return CfdiKind::Unknown(None);
    };

    match raw.trim() {
        "" => CfdiKind::Unknown(None),
        "P" => CfdiKind::Payment,
        "N" => CfdiKind::Payroll,
        other => match VoucherType::from_code(other) {
            Some(voucher) => CfdiKind::Invoice(voucher),
            None => CfdiKind::Unknown(Some(other.to_string())),
        },
    }
}

/// Parse and classify a file, reporting read and parse failures as
/// [`Classification::ParseError`] rather than an error.
pub fn classify_file(path: &Path) -> (Classification, Option<XmlDocument>) {
    match XmlDocument::from_path(path) {
        Ok(document) => {
            let kind = classify(&document);
            debug!("Classified {} as {}", path.display(), kind);
            (Classification::Kind(kind), Some(document))
        }
        Err(e) => {
            debug!("Failed to parse {}: {}", path.display(), e);
            (Classification::ParseError(e.to_string()), None)
        }
    }
}
