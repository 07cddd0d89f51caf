use std::collections::BTreeMap;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::rrf::{parse_record, TableSchema, TABLES};
use crate::staging::Staging;
use crate::{Error, Result};

const BATCH_ROWS: usize = 4096;

#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub rows: BTreeMap<&'static str, u64>,
}

impl LoadReport {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.values().sum()
    }
}

/// Load a UMLS release directory into a fresh staging database.
///
/// Any failure (a missing release file, a malformed record, a failed
/// insert) aborts the run and removes the staging database; a
/// half-populated store must never be observable.
pub async fn load_release(meta_dir: &Path, db_path: &Path) -> Result<LoadReport> {
    // Every release file must be present before a single row is written.
    for schema in &TABLES {
        let path = meta_dir.join(schema.file);
        if !path.is_file() {
            return Err(Error::MissingSource {
                table: schema.table,
                path,
            });
        }
    }

    let staging = Staging::create(db_path).await?;
    match load_into(&staging, meta_dir).await {
        Ok(report) => {
            staging.close().await;
            Ok(report)
        }
        Err(err) => {
            if let Err(cleanup) = staging.destroy(db_path).await {
                warn!(error = %cleanup, "failed to remove partial staging database");
            }
            Err(err)
        }
    }
}

async fn load_into(staging: &Staging, meta_dir: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    for schema in &TABLES {
        let path = meta_dir.join(schema.file);
        let count = load_table(staging, schema, &path).await?;
        info!(table = schema.table, rows = count, "table loaded");
        report.rows.insert(schema.table, count);
    }

    staging.create_indexes().await?;
    Ok(report)
}

async fn load_table(staging: &Staging, schema: &TableSchema, path: &Path) -> Result<u64> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut batch: Vec<Vec<String>> = Vec::with_capacity(BATCH_ROWS);
    let mut line_no = 0u64;
    let mut total = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        batch.push(parse_record(&line, schema.file, line_no, schema.arity())?);
        if batch.len() == BATCH_ROWS {
            total += staging.insert_all(schema, &batch).await?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        total += staging.insert_all(schema, &batch).await?;
    }

    Ok(total)
}
