//! Append-only workbook output.
//!
//! Every write reopens the workbook at the output path (or starts an empty
//! one), makes sure the target sheet exists with its header row, appends
//! below the last used row and saves back to the same path. No workbook
//! handle is kept between calls, so a batch that stops halfway leaves only
//! whole documents on disk.

pub mod layout;

use std::path::Path;

use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::SinkError;
use crate::models::cfdi::{CfdiRecord, InvoiceRecord, PaymentRecord, PayrollRecord};

pub use layout::{
    EXPENSE_SHEET, INCOME_SHEET, PAYMENT_SHEET, PAYROLL_DETAIL_SHEET, PAYROLL_SHEET, Row,
    SheetLayout, invoice_sheet,
};

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;

/// Writes extracted records to a multi-sheet workbook.
#[derive(Debug, Clone, Default)]
pub struct WorkbookSink {
    /// Whether payroll documents also fill the detail sheet.
    payroll_detail: bool,
}

impl WorkbookSink {
    /// Create a sink with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether perceptions, deductions and other payments of payroll
    /// documents are written to [`PAYROLL_DETAIL_SHEET`].
    pub fn with_payroll_detail(mut self, enabled: bool) -> Self {
        self.payroll_detail = enabled;
        self
    }

    /// Append any record. Returns the number of rows written to the kind's
    /// main sheet.
    pub fn write(&self, record: &CfdiRecord, path: &Path) -> Result<usize> {
        match record {
            CfdiRecord::Invoice(invoice) => self.write_invoice(invoice, path),
            CfdiRecord::Payment(payment) => self.write_payment(payment, path),
            CfdiRecord::Payroll(payroll) => self.write_payroll(payroll, path),
        }
    }

    /// Append one row per concept to "Ingresos" or "Egresos".
    pub fn write_invoice(&self, record: &InvoiceRecord, path: &Path) -> Result<usize> {
        let sheet = invoice_sheet(record.header.voucher_type);
        append(path, vec![(sheet, layout::invoice_rows(record))])
    }

    /// Append one row per (payment, related document) pair to "Pagos".
    pub fn write_payment(&self, record: &PaymentRecord, path: &Path) -> Result<usize> {
        append(path, vec![(PAYMENT_SHEET, layout::payment_rows(record))])
    }

    /// Append one row per concept to "Nómina", plus the detail rows when
    /// enabled.
    pub fn write_payroll(&self, record: &PayrollRecord, path: &Path) -> Result<usize> {
        let mut sheets = vec![(PAYROLL_SHEET, layout::payroll_rows(record))];
        if self.payroll_detail {
            sheets.push((PAYROLL_DETAIL_SHEET, layout::payroll_detail_rows(record)));
        }
        append(path, sheets)
    }
}

/// Append an invoice with default settings.
pub fn write_invoice(record: &InvoiceRecord, path: &Path) -> Result<usize> {
    WorkbookSink::new().write_invoice(record, path)
}

/// Append a payment with default settings.
pub fn write_payment(record: &PaymentRecord, path: &Path) -> Result<usize> {
    WorkbookSink::new().write_payment(record, path)
}

/// Append a payroll document with default settings.
pub fn write_payroll(record: &PayrollRecord, path: &Path) -> Result<usize> {
    WorkbookSink::new().write_payroll(record, path)
}

/// Open, append to every listed sheet, save. Returns the row count of the
/// first sheet.
fn append(path: &Path, sheets: Vec<(SheetLayout, Vec<Row<'_>>)>) -> Result<usize> {
    let mut book = open_workbook(path)?;
    let mut written = None;

    for (layout, rows) in &sheets {
        let sheet = sheet_for(&mut book, path, layout)?;
        let first = append_rows(sheet, rows);
        debug!(
            "Appended {} rows to {} starting at row {}",
            rows.len(),
            layout.name,
            first
        );
        written.get_or_insert(rows.len());
    }

    save_workbook(&book, path)?;
    Ok(written.unwrap_or_default())
}

/// Load the workbook at `path`, or start an empty one if there is no file.
pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Ok(umya_spreadsheet::new_file_empty_worksheet());
    }

    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| SinkError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write the workbook to `path`.
pub fn save_workbook(book: &Spreadsheet, path: &Path) -> Result<()> {
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(|e| SinkError::Save {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// The sheet named by `layout`, created with its header row if missing.
/// An existing sheet is returned untouched.
fn sheet_for<'a>(
    book: &'a mut Spreadsheet,
    path: &Path,
    layout: &SheetLayout,
) -> Result<&'a mut Worksheet> {
    if book.get_sheet_by_name(layout.name).is_none() {
        let sheet = book.new_sheet(layout.name).map_err(|reason| SinkError::Sheet {
            path: path.to_path_buf(),
            sheet: layout.name.to_string(),
            reason: reason.to_string(),
        })?;
        for (col, header) in layout.headers.iter().enumerate() {
            sheet.get_cell_mut((col as u32 + 1, 1)).set_value_string(*header);
        }
    }

    book.get_sheet_by_name_mut(layout.name)
        .ok_or_else(|| SinkError::Sheet {
            path: path.to_path_buf(),
            sheet: layout.name.to_string(),
            reason: "sheet disappeared after creation".to_string(),
        })
}

/// Append rows below the last used row; returns the first row number used.
fn append_rows(sheet: &mut Worksheet, rows: &[Row<'_>]) -> u32 {
    let first = sheet.get_highest_row() + 1;

    for (offset, row) in rows.iter().enumerate() {
        let row_number = first + offset as u32;
        for (col, value) in row.iter().enumerate() {
            if let Some(value) = value {
                sheet
                    .get_cell_mut((col as u32 + 1, row_number))
                    .set_value_string(*value);
            }
        }
    }

    first
}
