//! Invoice (`I`) and credit note (`E`) extraction.

use tracing::trace;

use super::{CONCEPT_PATH, Result, extract_issuer, extract_recipient, extract_stamp};
use crate::classifier::{KIND_ATTRIBUTE, VoucherType};
use crate::error::SchemaError;
use crate::models::cfdi::{ConceptLine, InvoiceHeader, InvoiceRecord, TransferredTax};
use crate::xml::{Element, XmlDocument};

const TRANSFER_PATH: &str = "cfdi:Impuestos/cfdi:Traslados/cfdi:Traslado";

/// Extract an invoice or credit note.
///
/// Issuer, recipient and fiscal stamp are mandatory. Missing header and
/// concept attributes are left as `None`.
pub fn extract_invoice(document: &XmlDocument) -> Result<InvoiceRecord> {
    let root = document.root();
    let voucher_type = root
        .attr(KIND_ATTRIBUTE)
        .and_then(VoucherType::from_code)
        .ok_or_else(|| SchemaError::UnexpectedKind {
            expected: "I or E".to_string(),
            found: root.attr(KIND_ATTRIBUTE).unwrap_or_default().to_string(),
        })?;

    let header = InvoiceHeader {
        version: root.attr_owned("Version"),
        series: root.attr_owned("Serie"),
        folio: root.attr_owned("Folio"),
        date: root.attr_owned("Fecha"),
        subtotal: root.attr_owned("SubTotal"),
        total: root.attr_owned("Total"),
        payment_form: root.attr_owned("FormaPago"),
        voucher_type,
        currency: root.attr_owned("Moneda"),
    };

    let issuer = extract_issuer(document)?;
    let recipient = extract_recipient(document)?;

    let concepts: Vec<ConceptLine> = document
        .find_all(CONCEPT_PATH)
        .into_iter()
        .map(|concepto| concept_line(document, concepto))
        .collect();

    let stamp = extract_stamp(document)?;

    trace!("Extracted invoice {} with {} concepts", stamp.uuid, concepts.len());

    Ok(InvoiceRecord {
        header,
        issuer,
        recipient,
        stamp,
        concepts,
    })
}

fn concept_line(document: &XmlDocument, concepto: &Element) -> ConceptLine {
    let transferred_tax = document
        .find_from(concepto, TRANSFER_PATH)
        .map(|traslado| TransferredTax {
            base: traslado.attr_owned("Base"),
            amount: traslado.attr_owned("Importe"),
        });

    ConceptLine {
        description: concepto.attr_owned("Descripcion"),
        quantity: concepto.attr_owned("Cantidad"),
        unit_value: concepto.attr_owned("ValorUnitario"),
        amount: concepto.attr_owned("Importe"),
        transferred_tax,
    }
}
