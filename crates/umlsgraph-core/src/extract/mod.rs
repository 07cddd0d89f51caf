mod augment;
mod hierarchy;
mod queries;

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info, warn};

use crate::graph::{attribute_token, code_id, code_label, rel_label, OutputTable, EDGE_HEADER};
use crate::scope::{HierarchyMode, Scope};
use crate::staging::Staging;
use crate::{Error, Result};

pub(crate) const CODE_NODE_FILE: &str = "codeNode.csv";
pub(crate) const CUI_CODE_FILE: &str = "cui_code_rel.csv";
pub(crate) const CODE_NODE_HEADER: [&str; 4] = ["Code:ID", "SAB", "CODE", ":LABEL"];

const ICDO3_ATTRIBUTE: &str = "ICD-O-3_CODE";

#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Files written this run, with their row counts (header excluded).
    pub written: Vec<(String, u64)>,
    /// Rows appended to already-written files by the ICD-O-3 augmentation.
    pub appended: Vec<(String, u64)>,
    /// Steps that failed. A failed step never leaves a partial file.
    pub failures: Vec<(String, Error)>,
}

impl ExtractReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.written.iter().map(|(_, n)| n).sum::<u64>()
            + self.appended.iter().map(|(_, n)| n).sum::<u64>()
    }
}

/// Derives the node/edge CSV battery from a populated staging store.
pub struct Extractor<'a> {
    staging: &'a Staging,
    scope: Scope,
}

impl<'a> Extractor<'a> {
    pub fn new(staging: &'a Staging, scope: Scope) -> Result<Self> {
        scope.validate()?;
        Ok(Self { staging, scope })
    }

    /// Run every extraction, each independent of its siblings: a failing
    /// step is recorded and the rest continue. The one ordering constraint
    /// is the ICD-O-3 augmentation, which appends to the code-node and
    /// concept-code files and therefore requires both base steps to have
    /// completed.
    pub async fn extract_all(&self, out_dir: &Path) -> Result<ExtractReport> {
        std::fs::create_dir_all(out_dir)?;
        let mut report = ExtractReport::default();

        commit(&mut report, out_dir, "semanticTypeNode.csv", self.semantic_type_nodes().await);
        commit(&mut report, out_dir, "conceptNode.csv", self.concept_nodes().await);
        commit(&mut report, out_dir, "atomNode.csv", self.atom_nodes().await);
        commit(&mut report, out_dir, "has_sty_rel.csv", self.has_sty_edges().await);
        commit(&mut report, out_dir, "has_aui_rel.csv", self.has_aui_edges().await);
        commit(&mut report, out_dir, "has_cui_rel.csv", self.has_cui_edges().await);
        commit(&mut report, out_dir, "tui_tui_rel.csv", self.semantic_isa_edges().await);
        commit(&mut report, out_dir, "concept_concept_rel.csv", self.concept_concept_edges().await);

        match self.scope.hierarchy {
            HierarchyMode::Exploded => commit(
                &mut report,
                out_dir,
                "child_of_rel_ptr.csv",
                hierarchy::exploded_edges(self.staging, &self.scope).await,
            ),
            HierarchyMode::Direct => commit(
                &mut report,
                out_dir,
                "child_of_rel.csv",
                hierarchy::direct_edges(self.staging, &self.scope).await,
            ),
        };

        if self.scope.promoted_attributes.is_empty() {
            info!("no promoted attributes configured, skipping attribute extraction");
        } else {
            commit(&mut report, out_dir, "attributeNode.csv", self.attribute_nodes().await);
            commit(&mut report, out_dir, "code_attribute_rel.csv", self.code_attribute_edges().await);
        }

        let code_nodes = commit(&mut report, out_dir, CODE_NODE_FILE, self.code_nodes().await);
        let cui_code = commit(&mut report, out_dir, CUI_CODE_FILE, self.cui_code_edges().await);

        if self
            .scope
            .promoted_attributes
            .iter()
            .any(|a| a == ICDO3_ATTRIBUTE)
        {
            match (&code_nodes, &cui_code) {
                (Some(_), Some(base)) => self.append_icdo3(&mut report, out_dir, base).await,
                _ => {
                    let missing = if code_nodes.is_none() {
                        CODE_NODE_FILE
                    } else {
                        CUI_CODE_FILE
                    };
                    warn!(missing, "ICD-O-3 augmentation skipped");
                    report.failures.push((
                        "icdo3_augmentation".to_owned(),
                        Error::AugmentationSkipped { missing },
                    ));
                }
            }
        }

        Ok(report)
    }

    async fn append_icdo3(&self, report: &mut ExtractReport, out_dir: &Path, base: &OutputTable) {
        let rows = match augment::icdo3_rows(self.staging).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "ICD-O-3 augmentation failed");
                report.failures.push(("icdo3_augmentation".to_owned(), err));
                return;
            }
        };

        let (nodes, edges) = augment::build_appends(&rows, base);
        for table in [nodes, edges] {
            match table.append(out_dir) {
                Ok(_) => {
                    info!(file = table.name(), rows = table.len(), "augmentation appended");
                    report
                        .appended
                        .push((table.name().to_owned(), table.len() as u64));
                }
                Err(err) => {
                    error!(file = table.name(), error = %err, "augmentation append failed");
                    report.failures.push((table.name().to_owned(), err));
                }
            }
        }
    }

    async fn semantic_type_nodes(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::semantic_type_nodes(&self.scope))
            .await?;

        let mut table = OutputTable::new("semanticTypeNode.csv", &["TUI:ID", "STY", "STN", ":LABEL"]);
        for mut row in rows {
            row.push("SemanticType".to_owned());
            table.push(row);
        }
        Ok(table)
    }

    async fn concept_nodes(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::concept_nodes(&self.scope))
            .await?;

        let mut table = OutputTable::new("conceptNode.csv", &["Concept:ID", "STR", ":LABEL"]);
        for mut row in rows {
            row.push("Concept".to_owned());
            table.push(row);
        }
        Ok(table)
    }

    async fn atom_nodes(&self) -> Result<OutputTable> {
        let mut rows = self
            .staging
            .fetch_rows(&queries::atom_nodes(&self.scope))
            .await?;
        rows.sort();

        let mut table = OutputTable::new(
            "atomNode.csv",
            &["AUI:ID", "STR", "SAB", "CODE", "TTY", "ISPREF", "TS", ":LABEL"],
        );
        // An atom may surface with several preference flag combinations;
        // the node keeps the first row in sorted order.
        let mut seen = HashSet::new();
        for mut row in rows {
            if !seen.insert(row[0].clone()) {
                continue;
            }
            row.push("Atom".to_owned());
            table.push(row);
        }
        Ok(table)
    }

    async fn code_nodes(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::code_nodes(&self.scope))
            .await?;

        let mut table = OutputTable::new(CODE_NODE_FILE, &CODE_NODE_HEADER);
        for row in rows {
            if let [sab, code] = row.as_slice() {
                table.push(vec![
                    code_id(sab, code),
                    sab.clone(),
                    code.clone(),
                    code_label(sab),
                ]);
            }
        }
        Ok(table)
    }

    async fn attribute_nodes(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::attribute_nodes(&self.scope))
            .await?;

        let mut table = OutputTable::new("attributeNode.csv", &["ATUI:ID", "ATV", ":LABEL"]);
        for row in rows {
            if let [atui, atv, atn] = row.as_slice() {
                table.push(vec![
                    atui.clone(),
                    atv.clone(),
                    format!("Attribute;{}", attribute_token(atn)),
                ]);
            }
        }
        Ok(table)
    }

    async fn has_sty_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::has_sty_edges(&self.scope))
            .await?;

        let mut table = OutputTable::new("has_sty_rel.csv", &EDGE_HEADER);
        for row in rows {
            if let [cui, tui] = row.as_slice() {
                table.push_edge(cui.clone(), tui.clone(), vec!["HAS_STY".to_owned()]);
            }
        }
        Ok(table)
    }

    async fn has_aui_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::has_aui_edges(&self.scope))
            .await?;

        let mut table = OutputTable::new("has_aui_rel.csv", &EDGE_HEADER);
        for row in rows {
            if let [sab, code, aui] = row.as_slice() {
                table.push_edge(code_id(sab, code), aui.clone(), vec!["HAS_AUI".to_owned()]);
            }
        }
        Ok(table)
    }

    async fn has_cui_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::has_cui_edges(&self.scope))
            .await?;

        let mut table = OutputTable::new("has_cui_rel.csv", &EDGE_HEADER);
        for row in rows {
            if let [aui, cui] = row.as_slice() {
                table.push_edge(aui.clone(), cui.clone(), vec!["HAS_CUI".to_owned()]);
            }
        }
        Ok(table)
    }

    async fn cui_code_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::cui_code_edges(&self.scope))
            .await?;

        let mut table = OutputTable::new(CUI_CODE_FILE, &EDGE_HEADER);
        for row in rows {
            if let [cui, sab, code] = row.as_slice() {
                table.push_edge(
                    cui.clone(),
                    code_id(sab, code),
                    vec!["HAS_SOURCE_CODE".to_owned()],
                );
            }
        }
        Ok(table)
    }

    async fn code_attribute_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::code_attribute_edges(&self.scope))
            .await?;

        let mut table = OutputTable::new("code_attribute_rel.csv", &EDGE_HEADER);
        for row in rows {
            if let [sab, code, atui, atn] = row.as_slice() {
                table.push_edge(code_id(sab, code), atui.clone(), vec![attribute_token(atn)]);
            }
        }
        Ok(table)
    }

    async fn semantic_isa_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::semantic_isa_edges())
            .await?;

        let mut table = OutputTable::new("tui_tui_rel.csv", &EDGE_HEADER);
        for row in rows {
            if let [child, parent] = row.as_slice() {
                table.push_edge(child.clone(), parent.clone(), vec!["ISA".to_owned()]);
            }
        }
        Ok(table)
    }

    async fn concept_concept_edges(&self) -> Result<OutputTable> {
        let rows = self
            .staging
            .fetch_rows(&queries::concept_relations(&self.scope))
            .await?;

        let mut table = OutputTable::new(
            "concept_concept_rel.csv",
            &[":START_ID", ":END_ID", ":TYPE", "SAB"],
        );
        for row in rows {
            if let [start, end, rela, rel, sab] = row.as_slice() {
                if self.scope.is_excluded_relation(rel) {
                    continue;
                }
                table.push_edge(
                    start.clone(),
                    end.clone(),
                    vec![rel_label(rela, rel), sab.clone()],
                );
            }
        }
        Ok(table)
    }
}

fn commit(
    report: &mut ExtractReport,
    out_dir: &Path,
    name: &str,
    outcome: Result<OutputTable>,
) -> Option<OutputTable> {
    match outcome {
        Ok(table) => match table.write(out_dir) {
            Ok(_) => {
                info!(file = name, rows = table.len(), "extraction written");
                report.written.push((name.to_owned(), table.len() as u64));
                Some(table)
            }
            Err(err) => {
                error!(file = name, error = %err, "extraction write failed");
                report.failures.push((name.to_owned(), err));
                None
            }
        },
        Err(err) => {
            error!(file = name, error = %err, "extraction failed");
            report.failures.push((name.to_owned(), err));
            None
        }
    }
}
