//! Batch command - append many CFDI documents to one workbook.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use cfdi_core::{CfdiConfig, Counters, Dispatcher, Outcome, SchemaErrorPolicy};

use crate::input;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// XML files, zip archives, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output workbook (default: <output.default_name>_<timestamp>.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop the batch on the first document missing mandatory elements
    #[arg(long)]
    strict: bool,

    /// Also write perceptions, deductions and other payments of payroll documents
    #[arg(long)]
    payroll_detail: bool,

    /// Write a per-file CSV summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the counters as JSON
    #[arg(long)]
    json: bool,
}

/// Result of dispatching a single file.
struct FileResult {
    path: PathBuf,
    outcome: Outcome,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if args.strict {
        config.dispatch.schema_errors = SchemaErrorPolicy::Abort;
    }
    if args.payroll_detail {
        config.output.payroll_detail = true;
    }

    let inputs = input::collect(&args.inputs)?;
    if inputs.files.is_empty() {
        anyhow::bail!("No XML documents found in: {}", args.inputs.join(", "));
    }

    let output = output_path(args.output.as_deref(), &config);

    if !args.json {
        println!(
            "{} Found {} documents, writing to {}",
            style("ℹ").blue(),
            inputs.files.len(),
            output.display()
        );
    }

    let pb = ProgressBar::new(inputs.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let dispatcher = Dispatcher::from_config(&config);
    let mut counters = Counters::new();
    let mut results = Vec::with_capacity(inputs.files.len());

    for path in &inputs.files {
        match dispatcher.dispatch(path, &output, &mut counters) {
            Ok(outcome) => results.push(FileResult {
                path: path.clone(),
                outcome,
            }),
            Err(e) => {
                pb.abandon();
                error!("Batch stopped at {}: {}", path.display(), e);
                eprintln!("{} {}", style("✗").red(), counters);
                return Err(anyhow::Error::new(e)
                    .context(format!("Batch stopped at {}", path.display())));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    debug!("Dispatched {} files in {:?}", results.len(), start.elapsed());

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        if !args.json {
            println!(
                "{} Summary written to {}",
                style("✓").green(),
                summary_path.display()
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&counters)?);
        return Ok(());
    }

    print_counters(&counters, &output, start.elapsed());

    let skipped: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.outcome {
            Outcome::Skipped { reason } => Some((&r.path, reason)),
            Outcome::Written { .. } => None,
        })
        .collect();

    if !skipped.is_empty() {
        println!();
        println!("{}", style("Skipped files:").yellow());
        for (path, reason) in skipped {
            println!("  - {}: {}", path.display(), reason);
        }
    }

    Ok(())
}

/// Given path with `.xlsx` enforced, or `<default_name>_<timestamp>.xlsx`.
fn output_path(output: Option<&Path>, config: &CfdiConfig) -> PathBuf {
    match output {
        Some(path) if has_xlsx_extension(path) => path.to_path_buf(),
        Some(path) => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".xlsx");
            PathBuf::from(name)
        }
        None => PathBuf::from(format!(
            "{}_{}.xlsx",
            config.output.default_name,
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )),
    }
}

fn has_xlsx_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
}

fn print_counters(counters: &Counters, output: &Path, elapsed: std::time::Duration) {
    println!();
    println!(
        "{} Processed {} documents in {:?} -> {}",
        style("✓").green(),
        counters.total,
        elapsed,
        output.display()
    );
    println!("   Total: {}", style(counters.total).bold());
    println!("   I/E: {}", style(counters.invoice_or_credit_note).green());
    println!("   P: {}", style(counters.payment).green());
    println!("   N: {}", style(counters.payroll).green());
    println!("   Desconocido: {}", style(counters.unknown).yellow());
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "kind", "rows", "detail"])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Outcome::Written {
                kind,
                rows,
                warnings,
            } => wtr.write_record([
                filename,
                "written",
                &kind.to_string(),
                &rows.to_string(),
                &warnings.join("; "),
            ])?,
            Outcome::Skipped { reason } => {
                wtr.write_record([filename, "skipped", "", "0", reason])?
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
