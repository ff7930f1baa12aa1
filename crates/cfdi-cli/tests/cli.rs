//! Command-line tests for the `cfdi` binary.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const NAMESPACES: &str = concat!(
    r#"xmlns:cfdi="http://www.sat.gob.mx/cfd/4" "#,
    r#"xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital" "#,
    r#"xmlns:pago20="http://www.sat.gob.mx/Pagos20""#,
);

const PARTIES: &str = concat!(
    r#"<cfdi:Emisor Rfc="AAA010101AAA" Nombre="EMISORA SA" RegimenFiscal="601"/>"#,
    r#"<cfdi:Receptor Rfc="XAXX010101000" Nombre="PUBLICO EN GENERAL" UsoCFDI="S01"/>"#,
);

fn invoice(uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {NAMESPACES} Version="4.0" Folio="1" SubTotal="100.00" Total="116.00" TipoDeComprobante="I" Moneda="MXN">
{PARTIES}<cfdi:Conceptos><cfdi:Concepto Descripcion="Servicio" Cantidad="1" ValorUnitario="100.00" Importe="100.00"/></cfdi:Conceptos>
<cfdi:Complemento><tfd:TimbreFiscalDigital UUID="{uuid}" FechaTimbrado="2024-01-15T10:00:00"/></cfdi:Complemento>
</cfdi:Comprobante>"#
    )
}

fn payment(uuid: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante {NAMESPACES} Version="4.0" SubTotal="0" Total="0" TipoDeComprobante="P" Moneda="XXX">
{PARTIES}<cfdi:Complemento><pago20:Pagos Version="2.0"><pago20:Pago FechaPago="2024-02-01T12:00:00" Monto="50.00"><pago20:DoctoRelacionado IdDocumento="DOC-1" ImpSaldoAnt="100.00" ImpPagado="50.00" ImpSaldoInsoluto="50.00"/></pago20:Pago></pago20:Pagos>
<tfd:TimbreFiscalDigital UUID="{uuid}"/></cfdi:Complemento>
</cfdi:Comprobante>"#
    )
}

fn unstamped() -> String {
    format!(
        r#"<cfdi:Comprobante {NAMESPACES} TipoDeComprobante="I">{PARTIES}</cfdi:Comprobante>"#
    )
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// The binary with a config file of its own, so a user's settings never
/// leak into a test run.
fn cfdi(config_dir: &Path) -> Command {
    let config = config_dir.join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }

    let mut cmd = Command::cargo_bin("cfdi").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn batch_counters(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn batch_reports_counters_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    write(&docs, "a.xml", &invoice("1234-ABCD"));
    write(&docs, "b.xml", &payment("PAGO-1"));
    write(&docs, "c.xml", "definitely not xml");
    let output = dir.path().join("out.xlsx");

    let result = cfdi(dir.path())
        .args(["batch", "--json", "-o"])
        .arg(&output)
        .arg(&docs)
        .assert()
        .success();

    assert_eq!(
        batch_counters(&result.get_output().stdout),
        serde_json::json!({"Total": 3, "I/E": 1, "P": 1, "N": 0, "Desconocido": 1})
    );
    assert!(output.exists());
}

#[test]
fn batch_prints_labelled_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "a.xml", &invoice("U-1"));
    let output = dir.path().join("out.xlsx");

    cfdi(dir.path())
        .args(["batch", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1"))
        .stdout(predicate::str::contains("I/E: 1"))
        .stdout(predicate::str::contains("Desconocido: 0"));
}

#[test]
fn batch_adds_xlsx_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "a.xml", &invoice("U-1"));

    cfdi(dir.path())
        .args(["batch", "--json", "-o"])
        .arg(dir.path().join("reporte"))
        .arg(&input)
        .assert()
        .success();

    assert!(dir.path().join("reporte.xlsx").exists());
}

#[test]
fn batch_reads_zip_archives() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("lote.zip");
    let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
    for (name, content) in [
        ("uno.xml", invoice("U-1")),
        ("dos.xml", payment("U-2")),
        ("leeme.txt", "ignored".to_string()),
    ] {
        zip.start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();

    let result = cfdi(dir.path())
        .args(["batch", "--json", "-o"])
        .arg(dir.path().join("out.xlsx"))
        .arg(&archive)
        .assert()
        .success();

    let counters = batch_counters(&result.get_output().stdout);
    assert_eq!(counters["Total"], 2);
    assert_eq!(counters["P"], 1);
}

#[test]
fn batch_without_xml_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "nothing here");

    cfdi(dir.path())
        .arg("batch")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No XML documents found"));
}

#[test]
fn strict_batch_stops_on_schema_violation() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "1.xml", &invoice("U-1"));
    let bad = write(dir.path(), "2.xml", &unstamped());

    cfdi(dir.path())
        .args(["batch", "--strict", "-o"])
        .arg(dir.path().join("out.xlsx"))
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Batch stopped at"))
        .stderr(predicate::str::contains("Total: 1"));
}

#[test]
fn lenient_batch_skips_schema_violation() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.xml", &unstamped());
    let summary = dir.path().join("summary.csv");

    cfdi(dir.path())
        .args(["batch", "--json", "-o"])
        .arg(dir.path().join("out.xlsx"))
        .arg("--summary")
        .arg(&summary)
        .arg(&bad)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Desconocido": 1"#));

    let csv = fs::read_to_string(&summary).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("filename,status,kind,rows,detail"));
    assert!(lines.next().unwrap().starts_with("bad.xml,skipped,,0,"));
}

#[test]
fn process_prints_record_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "a.xml", &invoice("1234-ABCD"));

    cfdi(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""kind": "invoice""#))
        .stdout(predicate::str::contains("1234-ABCD"));
}

#[test]
fn process_text_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "p.xml", &payment("PAGO-1"));

    cfdi(dir.path())
        .args(["process", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind:      P"))
        .stdout(predicate::str::contains("Related:   1"));
}

#[test]
fn process_rejects_unknown_kind() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "t.xml",
        &invoice("U").replace(r#"TipoDeComprobante="I""#, r#"TipoDeComprobante="T""#),
    );

    cfdi(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported document kind"));
}

#[test]
fn config_set_and_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();

    cfdi(dir.path())
        .args(["config", "set", "dispatch.schema_errors", "abort"])
        .assert()
        .success();

    cfdi(dir.path())
        .args(["config", "get", "dispatch.schema_errors"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""abort""#));

    cfdi(dir.path())
        .args(["config", "set", "dispatch.schema_errors", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn config_file_drives_batch_policy() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.xml", &unstamped());

    cfdi(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    cfdi(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
    cfdi(dir.path())
        .args(["config", "set", "dispatch.schema_errors", "abort"])
        .assert()
        .success();

    cfdi(dir.path())
        .args(["batch", "-o"])
        .arg(dir.path().join("out.xlsx"))
        .arg(&bad)
        .assert()
        .failure();
}
