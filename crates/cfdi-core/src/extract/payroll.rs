//! Payroll (`N`) extraction.
//!
//! Unlike invoices and payments, payroll fields fall back to sentinel values
//! when absent, and the payroll complement itself is optional. Issuer,
//! recipient and fiscal stamp remain mandatory.

use tracing::trace;

use super::{CONCEPT_PATH, Result, extract_issuer, extract_recipient, extract_stamp};
use crate::models::cfdi::{
    Deduction, NOT_AVAILABLE, OtherPayment, PayrollConcept, PayrollHeader, PayrollRecord,
    PayrollSummary, Perception, ZERO_AMOUNT, ZERO_QUANTITY,
};
use crate::xml::{Element, XmlDocument};

const NOMINA_PATH: &str = "cfdi:Complemento/nomina12:Nomina";

/// Extract a payroll document.
pub fn extract_payroll(document: &XmlDocument) -> Result<PayrollRecord> {
    let root = document.root();

    let header = PayrollHeader {
        series: root.attr_or("Serie", NOT_AVAILABLE),
        folio: root.attr_or("Folio", NOT_AVAILABLE),
        date: root.attr_or("Fecha", NOT_AVAILABLE),
        currency: root.attr_or("Moneda", NOT_AVAILABLE),
        subtotal: root.attr_or("SubTotal", ZERO_AMOUNT),
        discount: root.attr_or("Descuento", ZERO_AMOUNT),
        total: root.attr_or("Total", ZERO_AMOUNT),
    };

    let stamp = extract_stamp(document)?;
    let issuer = extract_issuer(document)?;
    let recipient = extract_recipient(document)?;

    let concepts = document
        .find_all(CONCEPT_PATH)
        .into_iter()
        .map(|concepto| PayrollConcept {
            description: concepto.attr_or("Descripcion", NOT_AVAILABLE),
            quantity: concepto.attr_or("Cantidad", ZERO_QUANTITY),
            unit_value: concepto.attr_or("ValorUnitario", ZERO_AMOUNT),
            amount: concepto.attr_or("Importe", ZERO_AMOUNT),
        })
        .collect();

    let mut record = PayrollRecord {
        header,
        issuer,
        recipient,
        stamp,
        concepts,
        has_complement: false,
        payroll: PayrollSummary::default(),
        perceptions: Vec::new(),
        deductions: Vec::new(),
        other_payments: Vec::new(),
    };

    if let Some(nomina) = document.find(NOMINA_PATH) {
        record.has_complement = true;
        record.payroll = PayrollSummary {
            version: nomina.attr_or("Version", NOT_AVAILABLE),
            payroll_type: nomina.attr_or("TipoNomina", NOT_AVAILABLE),
            total_perceptions: nomina.attr_or("TotalPercepciones", ZERO_AMOUNT),
            total_deductions: nomina.attr_or("TotalDeducciones", ZERO_AMOUNT),
            total_other_payments: nomina.attr_or("TotalOtrosPagos", ZERO_AMOUNT),
        };
        record.perceptions = group(document, nomina, "nomina12:Percepciones", "nomina12:Percepcion")
            .into_iter()
            .map(|p| Perception {
                key: p.attr_or("Clave", NOT_AVAILABLE),
                concept: p.attr_or("Concepto", NOT_AVAILABLE),
                taxed_amount: p.attr_or("ImporteGravado", ZERO_AMOUNT),
                exempt_amount: p.attr_or("ImporteExento", ZERO_AMOUNT),
            })
            .collect();
        record.deductions = group(document, nomina, "nomina12:Deducciones", "nomina12:Deduccion")
            .into_iter()
            .map(|d| Deduction {
                key: d.attr_or("Clave", NOT_AVAILABLE),
                concept: d.attr_or("Concepto", NOT_AVAILABLE),
                amount: d.attr_or("Importe", ZERO_AMOUNT),
            })
            .collect();
        record.other_payments = group(document, nomina, "nomina12:OtrosPagos", "nomina12:OtroPago")
            .into_iter()
            .map(|o| OtherPayment {
                key: o.attr_or("Clave", NOT_AVAILABLE),
                concept: o.attr_or("Concepto", NOT_AVAILABLE),
                amount: o.attr_or("Importe", ZERO_AMOUNT),
            })
            .collect();
    } else {
        trace!("Payroll {} has no payroll complement", record.stamp.uuid);
    }

    Ok(record)
}

/// Entries of the first `container` under `nomina`.
fn group<'a>(
    document: &XmlDocument,
    nomina: &'a Element,
    container: &str,
    entry: &str,
) -> Vec<&'a Element> {
    document
        .find_from(nomina, container)
        .map(|c| document.find_all_from(c, entry))
        .unwrap_or_default()
}
