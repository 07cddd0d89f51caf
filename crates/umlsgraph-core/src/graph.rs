use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::Result;

pub const EDGE_HEADER: [&str; 3] = [":START_ID", ":END_ID", ":TYPE"];

/// Relationship label: the finer RELA when present, otherwise the coarse
/// REL. Labels become relationship types in the graph, so they are
/// uppercased and hyphens are mapped to underscores.
#[must_use]
pub fn rel_label(rela: &str, rel: &str) -> String {
    let raw = if rela.is_empty() { rel } else { rela };
    raw.to_uppercase().replace('-', "_")
}

/// Composite source-code identifier, the join key between codes, atoms and
/// concepts.
#[must_use]
pub fn code_id(sab: &str, code: &str) -> String {
    format!("{sab}#{code}")
}

/// Compound node label; the per-vocabulary subtype rides along after the
/// shared `Code` label.
#[must_use]
pub fn code_label(sab: &str) -> String {
    format!("Code;{sab}")
}

/// Label token for a promoted attribute. ICD-O-3 carries hyphens the graph
/// import format will not accept in a label.
#[must_use]
pub fn attribute_token(atn: &str) -> String {
    if atn == "ICD-O-3_CODE" {
        "ICDO3Code".to_owned()
    } else {
        atn.to_owned()
    }
}

/// One node or edge result headed for a single CSV file. Rows deduplicate
/// on insert and iterate in sorted order, so a re-run over the same store
/// writes byte-identical output.
pub struct OutputTable {
    name: String,
    header: Vec<String>,
    rows: BTreeSet<Vec<String>>,
}

impl OutputTable {
    #[must_use]
    pub fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            header: header.iter().map(|h| (*h).to_owned()).collect(),
            rows: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len());
        self.rows.insert(row);
    }

    /// Push an edge row, dropping self-loops: a node related to itself is
    /// noise in the source data, never signal.
    pub fn push_edge(&mut self, start: String, end: String, rest: Vec<String>) {
        if start == end {
            return;
        }
        let mut row = vec![start, end];
        row.extend(rest);
        self.push(row);
    }

    /// Write header plus rows to `<dir>/<name>`. The file is written to a
    /// temporary sibling and renamed into place, so a failed extraction
    /// never leaves a truncated CSV behind.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        let tmp = dir.join(format!("{}.tmp", self.name));

        match self.write_to(&tmp) {
            Ok(()) => {
                fs::rename(&tmp, &path)?;
                Ok(path)
            }
            Err(err) => {
                let _ = fs::remove_file(&tmp);
                Err(err)
            }
        }
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Append rows, headerless, to a CSV this run already wrote.
    pub fn append(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rel_label_prefers_the_finer_relation() {
        assert_eq!(rel_label("part-of", "RO"), "PART_OF");
        assert_eq!(rel_label("", "RN"), "RN");
        assert_eq!(rel_label("may_treat", "RO"), "MAY_TREAT");
    }

    #[test]
    fn composite_identifiers() {
        assert_eq!(code_id("SNOMEDCT_US", "73211009"), "SNOMEDCT_US#73211009");
        assert_eq!(code_label("RXNORM"), "Code;RXNORM");
        assert_eq!(attribute_token("ICD-O-3_CODE"), "ICDO3Code");
        assert_eq!(attribute_token("NDC"), "NDC");
    }

    #[test]
    fn rows_deduplicate_and_sort() {
        let mut table = OutputTable::new("x.csv", &["A:ID", ":LABEL"]);
        table.push(vec!["b".into(), "L".into()]);
        table.push(vec!["a".into(), "L".into()]);
        table.push(vec!["b".into(), "L".into()]);

        assert_eq!(table.len(), 2);
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0][0], "a");
        assert_eq!(rows[1][0], "b");
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut table = OutputTable::new("e.csv", &EDGE_HEADER);
        table.push_edge("A1".into(), "A1".into(), vec!["CHILD_OF".into()]);
        table.push_edge("A1".into(), "A2".into(), vec!["CHILD_OF".into()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn write_then_append_keeps_prior_rows() {
        let tmp = TempDir::new().unwrap();

        let mut base = OutputTable::new("n.csv", &["Code:ID", ":LABEL"]);
        base.push(vec!["NCI#1".into(), "Code;NCI".into()]);
        base.write(tmp.path()).unwrap();

        let mut extra = OutputTable::new("n.csv", &["Code:ID", ":LABEL"]);
        extra.push(vec!["ICDO3#8000/3".into(), "Code;ICDO3".into()]);
        extra.append(tmp.path()).unwrap();

        let content = std::fs::read_to_string(tmp.path().join("n.csv")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["Code:ID,:LABEL", "NCI#1,Code;NCI", "ICDO3#8000/3,Code;ICDO3"]);
        assert!(!tmp.path().join("n.csv.tmp").exists());
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let tmp = TempDir::new().unwrap();

        let mut table = OutputTable::new("q.csv", &["Concept:ID", "STR", ":LABEL"]);
        table.push(vec!["C1".into(), "aspirin, buffered".into(), "Concept".into()]);
        table.write(tmp.path()).unwrap();

        let content = std::fs::read_to_string(tmp.path().join("q.csv")).unwrap();
        assert!(content.contains("\"aspirin, buffered\""));
    }
}
