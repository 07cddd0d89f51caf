use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How parent/child edges are derived from MRHIER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyMode {
    /// Explode the dot-delimited PTR ancestor path into adjacent edges.
    #[default]
    Exploded,
    /// One edge per MRHIER row, joining PAUI to AUI through MRCONSO.
    Direct,
}

/// The externally supplied extraction scope. Vocabulary and relation lists
/// vary between UMLS subsets, so none of them are hard-coded in the
/// extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub vocabularies: Vec<String>,
    pub language: String,
    pub excluded_relations: Vec<String>,
    pub promoted_attributes: Vec<String>,
    pub hierarchy: HierarchyMode,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            vocabularies: to_strings(&[
                "ATC",
                "GO",
                "HPO",
                "ICD9CM",
                "ICD10CM",
                "NCI",
                "RXNORM",
                "SNOMEDCT_US",
            ]),
            language: "ENG".to_owned(),
            excluded_relations: to_strings(&["SIB", "SY"]),
            promoted_attributes: to_strings(&[
                "ENSEMBLGENE_ID",
                "ENTREZGENE_ID",
                "ICD-O-3_CODE",
                "NDC",
            ]),
            hierarchy: HierarchyMode::default(),
        }
    }
}

impl Scope {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let scope: Self = serde_json::from_str(&text)?;
        Ok(scope)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocabularies.is_empty() {
            return Err(Error::EmptyScope);
        }
        Ok(())
    }

    /// Coarse relations excluded from the concept-concept edge set,
    /// matched case-insensitively.
    #[must_use]
    pub fn is_excluded_relation(&self, rel: &str) -> bool {
        self.excluded_relations
            .iter()
            .any(|e| e.eq_ignore_ascii_case(rel))
    }

    pub(crate) fn sab_list(&self) -> String {
        quoted_list(&self.vocabularies)
    }

    pub(crate) fn attribute_list(&self) -> String {
        quoted_list(&self.promoted_attributes)
    }

    pub(crate) fn language_literal(&self) -> String {
        quoted(&self.language)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

pub(crate) fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| quoted(v))
        .collect::<Vec<_>>()
        .join(", ")
}
