use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use umlsgraph_core::rrf::TABLES;

fn umg() -> Command {
    let cmd: Command = cargo_bin_cmd!("umg").into();
    cmd
}

fn record(fields: &[&str]) -> String {
    let mut line = fields.join("|");
    line.push_str("|\n");
    line
}

fn table_row(table: &str, values: &[(&str, &str)]) -> String {
    let schema = TABLES.iter().find(|t| t.table == table).unwrap();
    let mut fields = vec![""; schema.arity()];
    for (col, val) in values {
        let idx = schema.columns.iter().position(|c| c == col).unwrap();
        fields[idx] = *val;
    }
    record(&fields)
}

fn conso(cui: &str, aui: &str, sab: &str, code: &str, name: &str) -> String {
    table_row(
        "MRCONSO",
        &[
            ("CUI", cui),
            ("LAT", "ENG"),
            ("TS", "P"),
            ("STT", "PF"),
            ("ISPREF", "Y"),
            ("AUI", aui),
            ("SAB", sab),
            ("CODE", code),
            ("STR", name),
            ("SUPPRESS", "N"),
        ],
    )
}

/// Write a tiny but complete release into `dir`: every catalog file
/// exists, a handful of tables carry real-looking rows.
fn release_fixture(dir: &Path) {
    for schema in &TABLES {
        fs::write(dir.join(schema.file), "").unwrap();
    }

    let mrconso = [
        conso("C0011849", "A0000001", "SNOMEDCT_US", "73211009", "Diabetes mellitus"),
        conso("C0011860", "A0000002", "SNOMEDCT_US", "44054006", "Type 2 diabetes mellitus"),
        conso("C0006826", "A0000003", "NCI", "C9305", "Malignant neoplasm"),
        conso("C0999999", "A0999999", "MSH", "D003920", "Diabetes Mellitus"),
    ]
    .concat();
    fs::write(dir.join("MRCONSO.RRF"), mrconso).unwrap();

    fs::write(
        dir.join("MRSTY.RRF"),
        table_row(
            "MRSTY",
            &[("CUI", "C0011849"), ("TUI", "T047"), ("STY", "Disease or Syndrome")],
        ),
    )
    .unwrap();

    let mrrel = [
        table_row(
            "MRREL",
            &[
                ("CUI2", "C0011849"),
                ("CUI1", "C0011860"),
                ("REL", "RO"),
                ("RELA", "part-of"),
                ("SAB", "SNOMEDCT_US"),
                ("SUPPRESS", "N"),
            ],
        ),
        table_row(
            "MRREL",
            &[
                ("CUI2", "C0011849"),
                ("CUI1", "C0011860"),
                ("REL", "SIB"),
                ("SAB", "SNOMEDCT_US"),
                ("SUPPRESS", "N"),
            ],
        ),
    ]
    .concat();
    fs::write(dir.join("MRREL.RRF"), mrrel).unwrap();

    fs::write(
        dir.join("MRHIER.RRF"),
        table_row(
            "MRHIER",
            &[("AUI", "A0000002"), ("PTR", "A0000009.A0000001"), ("SAB", "SNOMEDCT_US")],
        ),
    )
    .unwrap();

    fs::write(
        dir.join("MRSAT.RRF"),
        table_row(
            "MRSAT",
            &[
                ("CUI", "C0006826"),
                ("CODE", "C9305"),
                ("ATUI", "AT100"),
                ("ATN", "ICD-O-3_CODE"),
                ("SAB", "NCI"),
                ("ATV", "8000/3"),
                ("SUPPRESS", "N"),
            ],
        ),
    )
    .unwrap();
}

fn workspace() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let meta = tmp.path().join("META");
    fs::create_dir(&meta).unwrap();
    release_fixture(&meta);
    let db = tmp.path().join("umls.db");
    let out = tmp.path().join("import");
    (tmp, meta, db, out)
}

#[test]
fn binary_runs() {
    umg()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("umg"));
}

#[test]
fn run_builds_the_graph_end_to_end() {
    let (_tmp, meta, db, out) = workspace();

    umg()
        .args(["run", "--meta"])
        .arg(&meta)
        .arg("--db")
        .arg(&db)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("staging database ready"))
        .stdout(predicate::str::contains("conceptNode.csv"));

    assert!(db.is_file());
    for name in [
        "semanticTypeNode.csv",
        "conceptNode.csv",
        "atomNode.csv",
        "codeNode.csv",
        "has_sty_rel.csv",
        "has_cui_rel.csv",
        "concept_concept_rel.csv",
        "child_of_rel_ptr.csv",
        "cui_code_rel.csv",
    ] {
        assert!(out.join(name).is_file(), "{name} missing");
    }

    let concepts = fs::read_to_string(out.join("conceptNode.csv")).unwrap();
    assert!(concepts.contains("C0011849"));
    assert!(!concepts.contains("C0999999"));

    let rels = fs::read_to_string(out.join("concept_concept_rel.csv")).unwrap();
    assert!(rels.contains("PART_OF"));
    assert!(!rels.contains("SIB"));

    let hier = fs::read_to_string(out.join("child_of_rel_ptr.csv")).unwrap();
    assert!(hier.contains("A0000009,A0000001,CHILD_OF"));
    assert!(hier.contains("A0000001,A0000002,CHILD_OF"));

    let codes = fs::read_to_string(out.join("codeNode.csv")).unwrap();
    assert!(codes.contains("ICDO3#8000/3,ICDO3,8000/3,Code;ICDO3"));
}

#[test]
fn scope_file_narrows_the_vocabulary_set() {
    let (tmp, meta, db, out) = workspace();

    let scope = tmp.path().join("scope.json");
    fs::write(&scope, r#"{ "vocabularies": ["NCI"] }"#).unwrap();

    umg()
        .args(["run", "--meta"])
        .arg(&meta)
        .arg("--db")
        .arg(&db)
        .arg("--out")
        .arg(&out)
        .arg("--scope")
        .arg(&scope)
        .assert()
        .success();

    let concepts = fs::read_to_string(out.join("conceptNode.csv")).unwrap();
    assert!(concepts.contains("C0006826"));
    assert!(!concepts.contains("C0011849"));
}

#[test]
fn load_rejects_a_malformed_release() {
    let (_tmp, meta, db, _out) = workspace();
    fs::write(meta.join("MRSTY.RRF"), "C0011849|T047\n").unwrap();

    umg()
        .args(["load", "--meta"])
        .arg(&meta)
        .arg("--db")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MRSTY.RRF"));

    assert!(!db.exists());
}

#[test]
fn load_reports_the_missing_release_file() {
    let (_tmp, meta, db, _out) = workspace();
    fs::remove_file(meta.join("MRREL.RRF")).unwrap();

    umg()
        .args(["load", "--meta"])
        .arg(&meta)
        .arg("--db")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MRREL"));

    assert!(!db.exists());
}

#[test]
fn export_requires_an_existing_staging_database() {
    let tmp = TempDir::new().unwrap();

    umg()
        .args(["export", "--db"])
        .arg(tmp.path().join("missing.db"))
        .arg("--out")
        .arg(tmp.path().join("import"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging database"));
}
