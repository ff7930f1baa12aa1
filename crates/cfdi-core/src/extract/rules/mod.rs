//! Consistency rules applied to extracted records.
//!
//! Findings are informational: they never block a document from being
//! written.

pub mod amounts;
pub mod patterns;
pub mod rfc;

pub use amounts::{AmountError, amounts_match, parse_amount, sum_amounts};
pub use rfc::{RfcKind, classify_rfc, validate_rfc};

use crate::models::cfdi::{
    CfdiRecord, InvoiceRecord, Issuer, PaymentRecord, PayrollRecord, Recipient,
};

/// Runs the consistency rules over a record.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    /// Whether to check issuer and recipient RFCs.
    validate_rfc: bool,
}

impl RecordValidator {
    /// Create a validator with every rule enabled.
    pub fn new() -> Self {
        Self { validate_rfc: true }
    }

    /// Set RFC validation.
    pub fn with_rfc_validation(mut self, validate: bool) -> Self {
        self.validate_rfc = validate;
        self
    }

    /// Validate a record and return the issues found.
    pub fn validate(&self, record: &CfdiRecord) -> Vec<String> {
        let mut issues = Vec::new();

        match record {
            CfdiRecord::Invoice(invoice) => {
                self.check_parties(&invoice.issuer, &invoice.recipient, &mut issues);
                check_invoice_totals(invoice, &mut issues);
            }
            CfdiRecord::Payment(payment) => {
                self.check_parties(&payment.issuer, &payment.recipient, &mut issues);
                check_payment_balances(payment, &mut issues);
            }
            CfdiRecord::Payroll(payroll) => {
                self.check_parties(&payroll.issuer, &payroll.recipient, &mut issues);
                check_payroll_totals(payroll, &mut issues);
            }
        }

        issues
    }

    fn check_parties(&self, issuer: &Issuer, recipient: &Recipient, issues: &mut Vec<String>) {
        if !self.validate_rfc {
            return;
        }

        for (role, rfc) in [("issuer", &issuer.rfc), ("recipient", &recipient.rfc)] {
            match rfc.as_deref() {
                Some(rfc) if !validate_rfc(rfc) => {
                    issues.push(format!("Malformed {} RFC: {}", role, rfc));
                }
                None => issues.push(format!("Missing {} RFC", role)),
                _ => {}
            }
        }
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_invoice_totals(invoice: &InvoiceRecord, issues: &mut Vec<String>) {
    let Some(subtotal) = invoice.header.subtotal.as_deref() else {
        issues.push("Missing SubTotal".to_string());
        return;
    };
    let Some(subtotal) = parse_amount(subtotal) else {
        issues.push(format!("SubTotal is not a number: {}", subtotal));
        return;
    };

    let amounts = invoice
        .concepts
        .iter()
        .map(|c| c.amount.as_deref().unwrap_or_default());

    match sum_amounts(amounts) {
        Ok(sum) if !amounts_match(sum, subtotal) => issues.push(format!(
            "Concept amounts ({}) differ from SubTotal ({})",
            sum, subtotal
        )),
        Ok(_) => {}
        Err(e) => issues.push(format!("Concept amounts: {}", e)),
    }
}

fn check_payment_balances(payment: &PaymentRecord, issues: &mut Vec<String>) {
    let doctos = payment.payments.iter().flat_map(|p| p.related_documents.iter());

    for docto in doctos {
        let balances = (
            docto.prior_balance.as_deref().and_then(parse_amount),
            docto.amount_paid.as_deref().and_then(parse_amount),
            docto.outstanding_balance.as_deref().and_then(parse_amount),
        );

        let (Some(prior), Some(paid), Some(outstanding)) = balances else {
            continue;
        };
        let id = docto.document_id.as_deref().unwrap_or("?");

        match prior.checked_sub(paid) {
            Some(expected) if amounts_match(expected, outstanding) => {}
            Some(_) => issues.push(format!(
                "Related document {}: {} - {} != {}",
                id, prior, paid, outstanding
            )),
            None => issues.push(format!(
                "Related document {}: {} - {} overflows",
                id, prior, paid
            )),
        }
    }
}

fn check_payroll_totals(payroll: &PayrollRecord, issues: &mut Vec<String>) {
    if !payroll.has_complement {
        return;
    }

    let perceptions = payroll
        .perceptions
        .iter()
        .flat_map(|p| [p.taxed_amount.as_str(), p.exempt_amount.as_str()]);
    compare_total(
        "perceptions",
        perceptions,
        &payroll.payroll.total_perceptions,
        issues,
    );

    let deductions = payroll.deductions.iter().map(|d| d.amount.as_str());
    compare_total(
        "deductions",
        deductions,
        &payroll.payroll.total_deductions,
        issues,
    );
}

fn compare_total<'a>(
    label: &str,
    values: impl IntoIterator<Item = &'a str>,
    declared: &str,
    issues: &mut Vec<String>,
) {
    let Some(declared) = parse_amount(declared) else {
        issues.push(format!("Total {} is not a number: {}", label, declared));
        return;
    };

    match sum_amounts(values) {
        Ok(sum) if !amounts_match(sum, declared) => issues.push(format!(
            "Sum of {} ({}) differs from declared total ({})",
            label, sum, declared
        )),
        Ok(_) => {}
        Err(e) => issues.push(format!("Amounts in {}: {}", label, e)),
    }
}
