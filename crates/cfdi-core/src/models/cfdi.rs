//! Typed records extracted from CFDI 4.0 documents.
//!
//! Attribute values are kept as the exact text found in the XML. Optional
//! attributes of invoices and payments are `Option<String>`; payroll records
//! carry sentinel defaults instead (see [`NOT_AVAILABLE`] and [`ZERO_AMOUNT`]).

use serde::Serialize;

use crate::classifier::{CfdiKind, VoucherType};

/// Sentinel for missing payroll text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel for missing payroll amounts.
pub const ZERO_AMOUNT: &str = "0.00";

/// Sentinel for a missing payroll concept quantity.
pub const ZERO_QUANTITY: &str = "0";

/// A record extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CfdiRecord {
    Invoice(InvoiceRecord),
    Payment(PaymentRecord),
    Payroll(PayrollRecord),
}

impl CfdiRecord {
    /// The kind this record was extracted as.
    pub fn kind(&self) -> CfdiKind {
        match self {
            CfdiRecord::Invoice(record) => CfdiKind::Invoice(record.header.voucher_type),
            CfdiRecord::Payment(_) => CfdiKind::Payment,
            CfdiRecord::Payroll(_) => CfdiKind::Payroll,
        }
    }

    /// Fiscal stamp shared by every kind.
    pub fn stamp(&self) -> &FiscalStamp {
        match self {
            CfdiRecord::Invoice(record) => &record.stamp,
            CfdiRecord::Payment(record) => &record.stamp,
            CfdiRecord::Payroll(record) => &record.stamp,
        }
    }
}

/// Issuer (`cfdi:Emisor`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Issuer {
    /// RFC (tax id).
    pub rfc: Option<String>,
    /// Registered name.
    pub name: Option<String>,
    /// Tax regime code.
    pub tax_regime: Option<String>,
}

/// Recipient (`cfdi:Receptor`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// RFC (tax id).
    pub rfc: Option<String>,
    /// Registered name.
    pub name: Option<String>,
    /// Postal code of the fiscal domicile.
    pub fiscal_domicile: Option<String>,
    /// Tax regime code.
    pub tax_regime: Option<String>,
    /// Declared CFDI usage code.
    pub cfdi_use: Option<String>,
}

/// Fiscal stamp (`tfd:TimbreFiscalDigital`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FiscalStamp {
    /// Folio fiscal.
    pub uuid: String,
    /// Stamping timestamp.
    pub stamped_at: Option<String>,
}

/// Root attributes of an invoice or credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceHeader {
    pub version: Option<String>,
    pub series: Option<String>,
    pub folio: Option<String>,
    pub date: Option<String>,
    pub subtotal: Option<String>,
    pub total: Option<String>,
    pub payment_form: Option<String>,
    pub voucher_type: VoucherType,
    pub currency: Option<String>,
}

/// Transferred tax of a concept (first `cfdi:Traslado`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferredTax {
    pub base: Option<String>,
    pub amount: Option<String>,
}

/// One invoice line item (`cfdi:Concepto`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConceptLine {
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub unit_value: Option<String>,
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transferred_tax: Option<TransferredTax>,
}

/// An invoice (`I`) or credit note (`E`). Produces one row per concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceRecord {
    pub header: InvoiceHeader,
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub stamp: FiscalStamp,
    pub concepts: Vec<ConceptLine>,
}

/// A prior invoice settled by a payment (`pago20:DoctoRelacionado`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedDocument {
    pub document_id: Option<String>,
    pub series: Option<String>,
    pub folio: Option<String>,
    pub currency: Option<String>,
    pub equivalence: Option<String>,
    pub installment: Option<String>,
    pub prior_balance: Option<String>,
    pub amount_paid: Option<String>,
    pub outstanding_balance: Option<String>,
    pub tax_object: Option<String>,
}

/// One payment (`pago20:Pago`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub date: Option<String>,
    pub payment_form: Option<String>,
    pub currency: Option<String>,
    pub exchange_rate: Option<String>,
    pub amount: Option<String>,
    pub related_documents: Vec<RelatedDocument>,
}

/// A payment complement document. Produces one row per
/// (payment, related document) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub stamp: FiscalStamp,
    pub payments: Vec<Payment>,
}

impl PaymentRecord {
    /// Number of rows this record flattens into.
    pub fn row_count(&self) -> usize {
        self.payments.iter().map(|p| p.related_documents.len()).sum()
    }
}

/// Root attributes of a payroll document, with sentinel defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollHeader {
    pub series: String,
    pub folio: String,
    pub date: String,
    pub currency: String,
    pub subtotal: String,
    pub discount: String,
    pub total: String,
}

/// A payroll line item, with sentinel defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollConcept {
    pub description: String,
    pub quantity: String,
    pub unit_value: String,
    pub amount: String,
}

/// Summary attributes of the `nomina12:Nomina` complement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollSummary {
    pub version: String,
    pub payroll_type: String,
    pub total_perceptions: String,
    pub total_deductions: String,
    pub total_other_payments: String,
}

impl Default for PayrollSummary {
    fn default() -> Self {
        Self {
            version: NOT_AVAILABLE.to_string(),
            payroll_type: NOT_AVAILABLE.to_string(),
            total_perceptions: ZERO_AMOUNT.to_string(),
            total_deductions: ZERO_AMOUNT.to_string(),
            total_other_payments: ZERO_AMOUNT.to_string(),
        }
    }
}

/// `nomina12:Percepcion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Perception {
    pub key: String,
    pub concept: String,
    pub taxed_amount: String,
    pub exempt_amount: String,
}

/// `nomina12:Deduccion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deduction {
    pub key: String,
    pub concept: String,
    pub amount: String,
}

/// `nomina12:OtroPago`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherPayment {
    pub key: String,
    pub concept: String,
    pub amount: String,
}

/// A payroll document. Produces one row per concept on the main sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollRecord {
    pub header: PayrollHeader,
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub stamp: FiscalStamp,
    pub concepts: Vec<PayrollConcept>,
    /// Whether the payroll complement was present at all.
    pub has_complement: bool,
    pub payroll: PayrollSummary,
    pub perceptions: Vec<Perception>,
    pub deductions: Vec<Deduction>,
    pub other_payments: Vec<OtherPayment>,
}

impl PayrollRecord {
    /// Number of perception, deduction and other-payment entries.
    pub fn detail_count(&self) -> usize {
        self.perceptions.len() + self.deductions.len() + self.other_payments.len()
    }
}
