//! Error types for the cfdi-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the cfdi library.
#[derive(Error, Debug)]
pub enum CfdiError {
    /// The input is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// A mandatory element or attribute is missing for the classified kind.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A schema violation that aborted the batch.
    #[error("{path}: {source}")]
    Rejected {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    /// The output workbook could not be read or written.
    #[error("workbook error: {0}")]
    Sink(#[from] SinkError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading an XML document.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The byte source could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parser rejected the input.
    #[error("malformed XML near byte {position}: {reason}")]
    Malformed { position: u64, reason: String },

    /// The document ended while elements were still open.
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),

    /// More than one top-level element.
    #[error("document has more than one root element")]
    MultipleRoots,

    /// No root element at all.
    #[error("document has no root element")]
    Empty,
}

/// Errors related to the CFDI structure of a well-formed document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Required element is missing.
    #[error("missing required element {0}")]
    MissingElement(String),

    /// Required attribute is missing or empty.
    #[error("missing required attribute {attribute} on {element}")]
    MissingAttribute { element: String, attribute: String },

    /// The document is not of the kind the extractor handles.
    #[error("unexpected TipoDeComprobante {found:?}, expected {expected}")]
    UnexpectedKind { expected: String, found: String },
}

/// Errors related to the output workbook.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The existing workbook could not be loaded.
    #[error("failed to open workbook {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// A sheet could not be created.
    #[error("failed to create sheet {sheet} in {path}: {reason}")]
    Sheet {
        path: PathBuf,
        sheet: String,
        reason: String,
    },

    /// The workbook could not be written back.
    #[error("failed to save workbook {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

/// Result type for the cfdi library.
pub type Result<T> = std::result::Result<T, CfdiError>;
