//! Field extraction from classified CFDI documents.
//!
//! Every extractor is a pure function over one parsed document. Element order
//! in the source is preserved in every output sequence.

mod invoice;
mod payment;
mod payroll;
pub mod rules;

pub use invoice::extract_invoice;
pub use payment::extract_payment;
pub use payroll::extract_payroll;

use crate::classifier::CfdiKind;
use crate::error::SchemaError;
use crate::models::cfdi::{CfdiRecord, FiscalStamp, Issuer, Recipient};
use crate::xml::{Element, XmlDocument};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

pub(crate) const ISSUER_PATH: &str = "cfdi:Emisor";
pub(crate) const RECIPIENT_PATH: &str = "cfdi:Receptor";
pub(crate) const STAMP_PATH: &str = "cfdi:Complemento/tfd:TimbreFiscalDigital";
pub(crate) const CONCEPT_PATH: &str = "cfdi:Conceptos/cfdi:Concepto";

/// Run the extractor matching `kind`.
///
/// Returns `Ok(None)` for [`CfdiKind::Unknown`].
pub fn extract(document: &XmlDocument, kind: &CfdiKind) -> Result<Option<CfdiRecord>> {
    let record = match kind {
        CfdiKind::Invoice(_) => CfdiRecord::Invoice(extract_invoice(document)?),
        CfdiKind::Payment => CfdiRecord::Payment(extract_payment(document)?),
        CfdiKind::Payroll => CfdiRecord::Payroll(extract_payroll(document)?),
        CfdiKind::Unknown(_) => return Ok(None),
    };
    Ok(Some(record))
}

fn required<'a>(document: &'a XmlDocument, path: &str) -> Result<&'a Element> {
    document
        .find(path)
        .ok_or_else(|| SchemaError::MissingElement(path.to_string()))
}

pub(crate) fn extract_issuer(document: &XmlDocument) -> Result<Issuer> {
    let emisor = required(document, ISSUER_PATH)?;
    Ok(Issuer {
        rfc: emisor.attr_owned("Rfc"),
        name: emisor.attr_owned("Nombre"),
        tax_regime: emisor.attr_owned("RegimenFiscal"),
    })
}

pub(crate) fn extract_recipient(document: &XmlDocument) -> Result<Recipient> {
    let receptor = required(document, RECIPIENT_PATH)?;
    Ok(Recipient {
        rfc: receptor.attr_owned("Rfc"),
        name: receptor.attr_owned("Nombre"),
        fiscal_domicile: receptor.attr_owned("DomicilioFiscalReceptor"),
        tax_regime: receptor.attr_owned("RegimenFiscalReceptor"),
        cfdi_use: receptor.attr_owned("UsoCFDI"),
    })
}

/// The fiscal stamp is mandatory: an unstamped CFDI is not a finished tax
/// document.
pub(crate) fn extract_stamp(document: &XmlDocument) -> Result<FiscalStamp> {
    let timbre = required(document, STAMP_PATH)?;
    let uuid = timbre
        .non_empty_attr("UUID")
        .ok_or_else(|| SchemaError::MissingAttribute {
            element: STAMP_PATH.to_string(),
            attribute: "UUID".to_string(),
        })?;

    Ok(FiscalStamp {
        uuid: uuid.to_string(),
        stamped_at: timbre.attr_owned("FechaTimbrado"),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Minimal CFDI documents shared by extractor, sink and dispatcher tests.

    pub const NAMESPACES: &str = concat!(
        r#"xmlns:cfdi="http://www.sat.gob.mx/cfd/4" "#,
        r#"xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital" "#,
        r#"xmlns:pago20="http://www.sat.gob.mx/Pagos20" "#,
        r#"xmlns:nomina12="http://www.sat.gob.mx/nomina12""#,
    );

    pub const PARTIES: &str = concat!(
        r#"<cfdi:Emisor Rfc="AAA010101AAA" Nombre="EMISORA SA" RegimenFiscal="601"/>"#,
        r#"<cfdi:Receptor Rfc="XAXX010101000" Nombre="PUBLICO EN GENERAL" "#,
        r#"DomicilioFiscalReceptor="06000" RegimenFiscalReceptor="616" UsoCFDI="S01"/>"#,
    );

    pub fn stamp(uuid: &str) -> String {
        format!(
            r#"<tfd:TimbreFiscalDigital UUID="{}" FechaTimbrado="2024-01-15T10:00:00"/>"#,
            uuid
        )
    }

    /// Invoice with one concept per description; the first carries a
    /// transferred tax.
    pub fn invoice(voucher: &str, uuid: &str, descriptions: &[&str]) -> String {
        let concepts: String = descriptions
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let taxes = if i == 0 {
                    r#"<cfdi:Impuestos><cfdi:Traslados><cfdi:Traslado Base="100.00" Importe="16.00"/></cfdi:Traslados></cfdi:Impuestos>"#
                } else {
                    ""
                };
                format!(
                    r#"<cfdi:Concepto Descripcion="{}" Cantidad="1" ValorUnitario="100.00" Importe="100.00">{}</cfdi:Concepto>"#,
                    d, taxes
                )
            })
            .collect();

        let subtotal = format!("{}.00", 100 * descriptions.len());
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {ns} Version="4.0" Serie="A" Folio="1" Fecha="2024-01-15T09:00:00" SubTotal="{subtotal}" Total="{subtotal}" FormaPago="03" TipoDeComprobante="{voucher}" Moneda="MXN">
{parties}<cfdi:Conceptos>{concepts}</cfdi:Conceptos><cfdi:Complemento>{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
            ns = NAMESPACES,
            parties = PARTIES,
            stamp = stamp(uuid),
        )
    }

    /// Payment document; `related[i]` is the number of related documents of
    /// payment `i`.
    pub fn payment(uuid: &str, related: &[usize]) -> String {
        let pagos: String = related
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let doctos: String = (0..*count)
                    .map(|j| {
                        format!(
                            r#"<pago20:DoctoRelacionado IdDocumento="DOC-{i}-{j}" Serie="F" Folio="{j}" MonedaDR="MXN" EquivalenciaDR="1" NumParcialidad="1" ImpSaldoAnt="100.00" ImpPagado="40.00" ImpSaldoInsoluto="60.00" ObjetoImpDR="02"/>"#
                        )
                    })
                    .collect();
                format!(
                    r#"<pago20:Pago FechaPago="2024-02-0{day}T12:00:00" FormaDePagoP="03" MonedaP="MXN" TipoCambioP="1" Monto="{amount}.00">{doctos}</pago20:Pago>"#,
                    day = i + 1,
                    amount = 40 * count,
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {ns} Version="4.0" SubTotal="0" Total="0" TipoDeComprobante="P" Moneda="XXX">
{parties}<cfdi:Complemento><pago20:Pagos Version="2.0">{pagos}</pago20:Pagos>{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
            ns = NAMESPACES,
            parties = PARTIES,
            stamp = stamp(uuid),
        )
    }

    /// Payroll document with two concepts and, optionally, the complement.
    pub fn payroll(uuid: &str, with_complement: bool) -> String {
        let nomina = if with_complement {
            concat!(
                r#"<nomina12:Nomina Version="1.2" TipoNomina="O" TotalPercepciones="1000.00" TotalDeducciones="150.00" TotalOtrosPagos="0.00">"#,
                r#"<nomina12:Percepciones>"#,
                r#"<nomina12:Percepcion Clave="001" Concepto="Sueldo" ImporteGravado="900.00" ImporteExento="0.00"/>"#,
                r#"<nomina12:Percepcion Clave="002" Concepto="Aguinaldo" ImporteGravado="50.00" ImporteExento="50.00"/>"#,
                r#"</nomina12:Percepciones>"#,
                r#"<nomina12:Deducciones><nomina12:Deduccion Clave="002" Concepto="ISR" Importe="150.00"/></nomina12:Deducciones>"#,
                r#"<nomina12:OtrosPagos><nomina12:OtroPago Clave="999" Concepto="Subsidio" Importe="0.00"/></nomina12:OtrosPagos>"#,
                r#"</nomina12:Nomina>"#,
            )
        } else {
            ""
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {ns} Version="4.0" Serie="NOM" Folio="7" Fecha="2024-01-31T00:00:00" SubTotal="1000.00" Descuento="150.00" Total="850.00" TipoDeComprobante="N" Moneda="MXN">
{parties}<cfdi:Conceptos><cfdi:Concepto Descripcion="Pago de nómina" Cantidad="1" ValorUnitario="1000.00" Importe="1000.00"/><cfdi:Concepto Descripcion="Ajuste"/></cfdi:Conceptos><cfdi:Complemento>{nomina}{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
            ns = NAMESPACES,
            parties = PARTIES,
            stamp = stamp(uuid),
        )
    }
}
