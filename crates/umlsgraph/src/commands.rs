use std::path::Path;

use anyhow::{bail, Context, Result};
use umlsgraph_core::{load_release, ExtractReport, Extractor, Scope, Staging};

pub async fn load(meta: &Path, db: &Path) -> Result<()> {
    let report = load_release(meta, db)
        .await
        .with_context(|| format!("failed to load release from {}", meta.display()))?;

    for (table, rows) in &report.rows {
        println!("{table}: {rows} rows");
    }
    println!("staging database ready: {} ({} rows)", db.display(), report.total());
    Ok(())
}

pub async fn export(db: &Path, out: &Path, scope_path: Option<&Path>) -> Result<()> {
    let scope = read_scope(scope_path)?;

    let staging = Staging::open(db)
        .await
        .with_context(|| format!("failed to open staging database {}", db.display()))?;
    let extractor = Extractor::new(&staging, scope)?;
    let report = extractor.extract_all(out).await?;
    staging.close().await;

    print_report(&report);
    if !report.is_success() {
        bail!("{} extraction step(s) failed", report.failures.len());
    }
    Ok(())
}

pub async fn run(meta: &Path, db: &Path, out: &Path, scope_path: Option<&Path>) -> Result<()> {
    load(meta, db).await?;
    export(db, out, scope_path).await
}

fn read_scope(path: Option<&Path>) -> Result<Scope> {
    match path {
        Some(path) => Scope::from_file(path)
            .with_context(|| format!("failed to read scope file {}", path.display())),
        None => Ok(Scope::default()),
    }
}

fn print_report(report: &ExtractReport) {
    for (file, rows) in &report.written {
        println!("{file}: {rows} rows");
    }
    for (file, rows) in &report.appended {
        println!("{file}: {rows} rows appended");
    }
    for (step, err) in &report.failures {
        eprintln!("{step}: {err}");
    }
}
