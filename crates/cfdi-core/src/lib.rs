//! Core library for CFDI (Mexican electronic invoice) processing.
//!
//! This crate provides:
//! - Namespace-aware XML access for the CFDI 4.0 schema family
//! - Document classification by `TipoDeComprobante`
//! - Field extraction for invoices, payment complements and payroll
//! - Consistency checks (RFC shape, totals, payment balances)
//! - Append-only output to a multi-sheet xlsx workbook
//! - A per-document dispatcher with per-kind counters

pub mod classifier;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod models;
pub mod sink;
pub mod xml;

pub use classifier::{CfdiKind, Classification, VoucherType, classify, classify_file};
pub use dispatch::{Counters, Dispatcher, Outcome, dispatch};
pub use error::{CfdiError, Result, SchemaError, SinkError, XmlError};
pub use extract::rules::RecordValidator;
pub use extract::{extract, extract_invoice, extract_payment, extract_payroll};
pub use models::cfdi::{CfdiRecord, InvoiceRecord, PaymentRecord, PayrollRecord};
pub use models::config::{CfdiConfig, SchemaErrorPolicy};
pub use sink::{WorkbookSink, write_invoice, write_payment, write_payroll};
pub use xml::{CFDI_NAMESPACES, NamespaceTable, XmlDocument};
