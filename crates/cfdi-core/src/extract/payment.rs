//! Payment complement (`P`) extraction.

use tracing::trace;

use super::{Result, extract_issuer, extract_recipient, extract_stamp};
use crate::models::cfdi::{Payment, PaymentRecord, RelatedDocument};
use crate::xml::{Element, XmlDocument};

const PAYMENT_PATH: &str = "cfdi:Complemento/pago20:Pagos/pago20:Pago";
const RELATED_PATH: &str = "pago20:DoctoRelacionado";

/// Extract a payment complement document.
///
/// Issuer, recipient and fiscal stamp are mandatory. Payment and related
/// document attributes are copied verbatim; missing ones become `None`.
pub fn extract_payment(document: &XmlDocument) -> Result<PaymentRecord> {
    let issuer = extract_issuer(document)?;
    let recipient = extract_recipient(document)?;
    let stamp = extract_stamp(document)?;

    let payments: Vec<Payment> = document
        .find_all(PAYMENT_PATH)
        .into_iter()
        .map(|pago| payment(document, pago))
        .collect();

    trace!("Extracted payment {} with {} payments", stamp.uuid, payments.len());

    Ok(PaymentRecord {
        issuer,
        recipient,
        stamp,
        payments,
    })
}

fn payment(document: &XmlDocument, pago: &Element) -> Payment {
    let related_documents = document
        .find_all_from(pago, RELATED_PATH)
        .into_iter()
        .map(related_document)
        .collect();

    Payment {
        date: pago.attr_owned("FechaPago"),
        payment_form: pago.attr_owned("FormaDePagoP"),
        currency: pago.attr_owned("MonedaP"),
        exchange_rate: pago.attr_owned("TipoCambioP"),
        amount: pago.attr_owned("Monto"),
        related_documents,
    }
}

fn related_document(docto: &Element) -> RelatedDocument {
    RelatedDocument {
        document_id: docto.attr_owned("IdDocumento"),
        series: docto.attr_owned("Serie"),
        folio: docto.attr_owned("Folio"),
        currency: docto.attr_owned("MonedaDR"),
        equivalence: docto.attr_owned("EquivalenciaDR"),
        installment: docto.attr_owned("NumParcialidad"),
        prior_balance: docto.attr_owned("ImpSaldoAnt"),
        amount_paid: docto.attr_owned("ImpPagado"),
        outstanding_balance: docto.attr_owned("ImpSaldoInsoluto"),
        tax_object: docto.attr_owned("ObjetoImpDR"),
    }
}
