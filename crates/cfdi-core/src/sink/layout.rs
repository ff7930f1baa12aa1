//! Sheet names, header rows and row flattening for each record kind.

use crate::classifier::VoucherType;
use crate::models::cfdi::{InvoiceRecord, NOT_AVAILABLE, PaymentRecord, PayrollRecord};

/// A row of cells; `None` leaves the cell empty.
pub type Row<'a> = Vec<Option<&'a str>>;

/// Fixed name and header row of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub name: &'static str,
    pub headers: &'static [&'static str],
}

const INVOICE_HEADERS: &[&str] = &[
    "UUID",
    "Fecha",
    "Serie",
    "Folio",
    "Tipo",
    "RFC Emisor",
    "Nombre Emisor",
    "Régimen Fiscal",
    "Cantidad",
    "Valor Unitario",
    "Importe",
    "Traslado Importe",
    "Subtotal",
    "Total",
    "Forma de Pago",
    "Descripción",
    "Moneda",
    "Uso CFDI",
    "RFC Receptor",
    "Nombre Receptor",
    "Domicilio",
    "Régimen Fiscal",
    "Traslado Base",
    "Fecha Timbrado",
    "Versión",
];

/// Invoices (`I`).
pub const INCOME_SHEET: SheetLayout = SheetLayout {
    name: "Ingresos",
    headers: INVOICE_HEADERS,
};

/// Credit notes (`E`).
pub const EXPENSE_SHEET: SheetLayout = SheetLayout {
    name: "Egresos",
    headers: INVOICE_HEADERS,
};

/// Payment complements (`P`).
pub const PAYMENT_SHEET: SheetLayout = SheetLayout {
    name: "Pagos",
    headers: &[
        "UUID Timbre",
        "Fecha Timbrado",
        "RFC Emisor",
        "Nombre Emisor",
        "Régimen Fiscal Emisor",
        "RFC Receptor",
        "Nombre Receptor",
        "Fecha Pago",
        "Forma De Pago P",
        "Moneda P",
        "Tipo Cambio P",
        "Monto",
        "Id Documento",
        "Serie",
        "Folio",
        "Moneda DR",
        "Equivalencia DR",
        "Num Parcialidad",
        "Imp Saldo Ant",
        "Imp Pagado",
        "Imp Saldo Insoluto",
        "Objeto Imp DR",
    ],
};

/// Payroll (`N`).
pub const PAYROLL_SHEET: SheetLayout = SheetLayout {
    name: "Nómina",
    headers: &[
        "UUID",
        "Fecha Timbrado",
        "Serie",
        "Folio",
        "Fecha",
        "Moneda",
        "SubTotal",
        "Descuento",
        "Total",
        "RFC Emisor",
        "Nombre Emisor",
        "RFC Receptor",
        "Nombre Receptor",
        "Descripcion",
        "Cantidad",
        "Valor Unitario",
        "Importe",
        "Version Nómina",
        "Tipo Nómina",
        "Total Percepciones",
        "Total Deducciones",
        "Total Otros Pagos",
    ],
};

/// Perceptions, deductions and other payments of payroll documents.
pub const PAYROLL_DETAIL_SHEET: SheetLayout = SheetLayout {
    name: "Nómina Detalle",
    headers: &[
        "UUID",
        "Tipo",
        "Clave",
        "Concepto",
        "Importe Gravado",
        "Importe Exento",
        "Importe",
    ],
};

/// Sheet receiving an invoice, by its I/E flag.
pub fn invoice_sheet(voucher_type: VoucherType) -> SheetLayout {
    match voucher_type {
        VoucherType::Income => INCOME_SHEET,
        VoucherType::Expense => EXPENSE_SHEET,
    }
}

/// One row per concept.
pub fn invoice_rows(record: &InvoiceRecord) -> Vec<Row<'_>> {
    let header = &record.header;
    let issuer = &record.issuer;
    let recipient = &record.recipient;

    record
        .concepts
        .iter()
        .map(|concept| {
            let tax = concept.transferred_tax.as_ref();
            vec![
                Some(record.stamp.uuid.as_str()),
                header.date.as_deref(),
                header.series.as_deref(),
                header.folio.as_deref(),
                Some(header.voucher_type.code()),
                issuer.rfc.as_deref(),
                issuer.name.as_deref(),
                issuer.tax_regime.as_deref(),
                concept.quantity.as_deref(),
                concept.unit_value.as_deref(),
                concept.amount.as_deref(),
                tax.and_then(|t| t.amount.as_deref()),
                header.subtotal.as_deref(),
                header.total.as_deref(),
                header.payment_form.as_deref(),
                concept.description.as_deref(),
                header.currency.as_deref(),
                recipient.cfdi_use.as_deref(),
                recipient.rfc.as_deref(),
                recipient.name.as_deref(),
                recipient.fiscal_domicile.as_deref(),
                recipient.tax_regime.as_deref(),
                tax.and_then(|t| t.base.as_deref()),
                record.stamp.stamped_at.as_deref(),
                header.version.as_deref(),
            ]
        })
        .collect()
}

/// One row per (payment, related document) pair.
pub fn payment_rows(record: &PaymentRecord) -> Vec<Row<'_>> {
    let issuer = &record.issuer;
    let recipient = &record.recipient;

    record
        .payments
        .iter()
        .flat_map(|payment| {
            payment.related_documents.iter().map(move |docto| {
                vec![
                    Some(record.stamp.uuid.as_str()),
                    record.stamp.stamped_at.as_deref(),
                    issuer.rfc.as_deref(),
                    issuer.name.as_deref(),
                    issuer.tax_regime.as_deref(),
                    recipient.rfc.as_deref(),
                    recipient.name.as_deref(),
                    payment.date.as_deref(),
                    payment.payment_form.as_deref(),
                    payment.currency.as_deref(),
                    payment.exchange_rate.as_deref(),
                    payment.amount.as_deref(),
                    docto.document_id.as_deref(),
                    docto.series.as_deref(),
                    docto.folio.as_deref(),
                    docto.currency.as_deref(),
                    docto.equivalence.as_deref(),
                    docto.installment.as_deref(),
                    docto.prior_balance.as_deref(),
                    docto.amount_paid.as_deref(),
                    docto.outstanding_balance.as_deref(),
                    docto.tax_object.as_deref(),
                ]
            })
        })
        .collect()
}

/// One row per concept. Missing issuer/recipient attributes render as `N/A`.
pub fn payroll_rows(record: &PayrollRecord) -> Vec<Row<'_>> {
    let header = &record.header;
    let payroll = &record.payroll;

    record
        .concepts
        .iter()
        .map(|concept| {
            vec![
                Some(record.stamp.uuid.as_str()),
                Some(record.stamp.stamped_at.as_deref().unwrap_or(NOT_AVAILABLE)),
                Some(header.series.as_str()),
                Some(header.folio.as_str()),
                Some(header.date.as_str()),
                Some(header.currency.as_str()),
                Some(header.subtotal.as_str()),
                Some(header.discount.as_str()),
                Some(header.total.as_str()),
                or_na(&record.issuer.rfc),
                or_na(&record.issuer.name),
                or_na(&record.recipient.rfc),
                or_na(&record.recipient.name),
                Some(concept.description.as_str()),
                Some(concept.quantity.as_str()),
                Some(concept.unit_value.as_str()),
                Some(concept.amount.as_str()),
                Some(payroll.version.as_str()),
                Some(payroll.payroll_type.as_str()),
                Some(payroll.total_perceptions.as_str()),
                Some(payroll.total_deductions.as_str()),
                Some(payroll.total_other_payments.as_str()),
            ]
        })
        .collect()
}

fn or_na(value: &Option<String>) -> Option<&str> {
    Some(value.as_deref().unwrap_or(NOT_AVAILABLE))
}

/// One row per perception, deduction and other payment, in that order.
pub fn payroll_detail_rows(record: &PayrollRecord) -> Vec<Row<'_>> {
    let uuid = Some(record.stamp.uuid.as_str());

    let perceptions = record.perceptions.iter().map(|p| {
        vec![
            uuid,
            Some("Percepción"),
            Some(p.key.as_str()),
            Some(p.concept.as_str()),
            Some(p.taxed_amount.as_str()),
            Some(p.exempt_amount.as_str()),
            None,
        ]
    });
    let deductions = record.deductions.iter().map(|d| {
        vec![
            uuid,
            Some("Deducción"),
            Some(d.key.as_str()),
            Some(d.concept.as_str()),
            None,
            None,
            Some(d.amount.as_str()),
        ]
    });
    let other_payments = record.other_payments.iter().map(|o| {
        vec![
            uuid,
            Some("Otro Pago"),
            Some(o.key.as_str()),
            Some(o.concept.as_str()),
            None,
            None,
            Some(o.amount.as_str()),
        ]
    });

    perceptions.chain(deductions).chain(other_payments).collect()
}
