//! Process command - classify and extract a single CFDI document.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use cfdi_core::{
    CfdiRecord, Classification, RecordValidator, classify_file, extract,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let (classification, document) = classify_file(&args.input);
    let kind = match classification {
        Classification::Kind(kind) => kind,
        Classification::ParseError(reason) => {
            anyhow::bail!("Cannot parse {}: {}", args.input.display(), reason)
        }
    };

    let record = match document {
        Some(document) => extract(&document, &kind)?,
        None => None,
    };
    let Some(record) = record else {
        anyhow::bail!("Unsupported document kind: {}", kind);
    };

    if args.validate {
        let issues = RecordValidator::new()
            .with_rfc_validation(config.extraction.validate_rfc)
            .validate(&record);
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
        OutputFormat::Text => format_record_text(&record),
    };
    println!("{}", output);

    Ok(())
}

fn format_record_text(record: &CfdiRecord) -> String {
    let mut lines = Vec::new();
    let stamp = record.stamp();

    lines.push(format!("Kind:      {}", record.kind()));
    lines.push(format!("UUID:      {}", stamp.uuid));
    lines.push(format!(
        "Stamped:   {}",
        stamp.stamped_at.as_deref().unwrap_or("-")
    ));

    let (issuer, recipient) = match record {
        CfdiRecord::Invoice(r) => (&r.issuer, &r.recipient),
        CfdiRecord::Payment(r) => (&r.issuer, &r.recipient),
        CfdiRecord::Payroll(r) => (&r.issuer, &r.recipient),
    };
    lines.push(format!(
        "Issuer:    {} ({})",
        issuer.rfc.as_deref().unwrap_or("-"),
        issuer.name.as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "Recipient: {} ({})",
        recipient.rfc.as_deref().unwrap_or("-"),
        recipient.name.as_deref().unwrap_or("-")
    ));

    match record {
        CfdiRecord::Invoice(r) => {
            lines.push(format!(
                "Total:     {} {}",
                r.header.total.as_deref().unwrap_or("-"),
                r.header.currency.as_deref().unwrap_or("")
            ));
            lines.push(format!("Concepts:  {}", r.concepts.len()));
        }
        CfdiRecord::Payment(r) => {
            lines.push(format!("Payments:  {}", r.payments.len()));
            lines.push(format!("Related:   {}", r.row_count()));
        }
        CfdiRecord::Payroll(r) => {
            lines.push(format!("Total:     {} {}", r.header.total, r.header.currency));
            lines.push(format!("Concepts:  {}", r.concepts.len()));
            if r.has_complement {
                lines.push(format!(
                    "Payroll:   {} perceptions, {} deductions, {} other payments",
                    r.perceptions.len(),
                    r.deductions.len(),
                    r.other_payments.len()
                ));
            }
        }
    }

    lines.join("\n")
}
