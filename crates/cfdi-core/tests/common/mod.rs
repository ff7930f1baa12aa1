//! CFDI documents and workbook helpers shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

const NAMESPACES: &str = concat!(
    r#"xmlns:cfdi="http://www.sat.gob.mx/cfd/4" "#,
    r#"xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital" "#,
    r#"xmlns:pago20="http://www.sat.gob.mx/Pagos20" "#,
    r#"xmlns:nomina12="http://www.sat.gob.mx/nomina12""#,
);

const PARTIES: &str = concat!(
    r#"<cfdi:Emisor Rfc="AAA010101AAA" Nombre="EMISORA SA" RegimenFiscal="601"/>"#,
    r#"<cfdi:Receptor Rfc="XAXX010101000" Nombre="PUBLICO EN GENERAL" "#,
    r#"DomicilioFiscalReceptor="06000" RegimenFiscalReceptor="616" UsoCFDI="S01"/>"#,
);

fn stamp(uuid: &str) -> String {
    format!(r#"<tfd:TimbreFiscalDigital UUID="{uuid}" FechaTimbrado="2024-01-15T10:00:00"/>"#)
}

pub fn invoice(kind: &str, uuid: &str, descriptions: &[&str]) -> String {
    let concepts: String = descriptions
        .iter()
        .map(|d| {
            format!(
                r#"<cfdi:Concepto Descripcion="{d}" Cantidad="1" ValorUnitario="100.00" Importe="100.00"><cfdi:Impuestos><cfdi:Traslados><cfdi:Traslado Base="100.00" Importe="16.00"/></cfdi:Traslados></cfdi:Impuestos></cfdi:Concepto>"#
            )
        })
        .collect();
    let subtotal = 100 * descriptions.len();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {NAMESPACES} Version="4.0" Serie="A" Folio="1" Fecha="2024-01-15T09:00:00" SubTotal="{subtotal}.00" Total="{subtotal}.00" FormaPago="03" TipoDeComprobante="{kind}" Moneda="MXN">
{PARTIES}<cfdi:Conceptos>{concepts}</cfdi:Conceptos><cfdi:Complemento>{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
        stamp = stamp(uuid),
    )
}

pub fn payment(uuid: &str, related: &[usize]) -> String {
    let pagos: String = related
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let doctos: String = (0..*count)
                .map(|j| {
                    format!(
                        r#"<pago20:DoctoRelacionado IdDocumento="DOC-{i}-{j}" MonedaDR="MXN" NumParcialidad="1" ImpSaldoAnt="100.00" ImpPagado="40.00" ImpSaldoInsoluto="60.00"/>"#
                    )
                })
                .collect();
            format!(
                r#"<pago20:Pago FechaPago="2024-02-01T12:00:00" FormaDePagoP="03" MonedaP="MXN" Monto="40.00">{doctos}</pago20:Pago>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {NAMESPACES} Version="4.0" SubTotal="0" Total="0" TipoDeComprobante="P" Moneda="XXX">
{PARTIES}<cfdi:Complemento><pago20:Pagos Version="2.0">{pagos}</pago20:Pagos>{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
        stamp = stamp(uuid),
    )
}

pub fn payroll(uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {NAMESPACES} Version="4.0" Fecha="2024-01-31T00:00:00" SubTotal="1000.00" Total="1000.00" TipoDeComprobante="N" Moneda="MXN">
{PARTIES}<cfdi:Conceptos><cfdi:Concepto Descripcion="Pago de nómina" Cantidad="1" ValorUnitario="1000.00" Importe="1000.00"/></cfdi:Conceptos><cfdi:Complemento>{stamp}</cfdi:Complemento>
</cfdi:Comprobante>"#,
        stamp = stamp(uuid),
    )
}

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Every non-header row of `sheet`, as strings.
pub fn rows(output: &Path, sheet: &str) -> Vec<Vec<String>> {
    let book = umya_spreadsheet::reader::xlsx::read(output).unwrap();
    let sheet = book.get_sheet_by_name(sheet).unwrap();
    let width = sheet.get_highest_column();
    (2..=sheet.get_highest_row())
        .map(|row| (1..=width).map(|col| sheet.get_value((col, row))).collect())
        .collect()
}

pub fn sheet_names(output: &Path) -> Vec<String> {
    let book = umya_spreadsheet::reader::xlsx::read(output).unwrap();
    book.get_sheet_collection()
        .iter()
        .map(|s| s.get_name().to_string())
        .collect()
}
