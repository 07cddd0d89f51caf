//! The fixed extraction query battery, parameterized by the configured
//! scope. Queries select raw columns only; identifier synthesis, labels and
//! filtering that the import format needs happen on the Rust side.

use crate::scope::Scope;

fn base_filters(scope: &Scope, alias: &str) -> String {
    let prefix = if alias.is_empty() {
        String::new()
    } else {
        format!("{alias}.")
    };
    format!(
        "{prefix}SAB IN ({sabs}) AND {prefix}SUPPRESS = 'N' AND {prefix}LAT = {lat}",
        sabs = scope.sab_list(),
        lat = scope.language_literal()
    )
}

pub fn semantic_type_nodes(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT s.TUI, s.STY, s.STN \
         FROM MRSTY s JOIN MRCONSO c ON s.CUI = c.CUI \
         WHERE {};",
        base_filters(scope, "c")
    )
}

pub fn concept_nodes(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT CUI, STR FROM MRCONSO \
         WHERE {} AND ISPREF = 'Y' AND TS = 'P' AND STT = 'PF';",
        base_filters(scope, "")
    )
}

pub fn atom_nodes(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT AUI, STR, SAB, CODE, TTY, ISPREF, TS FROM MRCONSO \
         WHERE {};",
        base_filters(scope, "")
    )
}

pub fn code_nodes(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT SAB, CODE FROM MRCONSO WHERE {};",
        base_filters(scope, "")
    )
}

pub fn attribute_nodes(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT ATUI, ATV, ATN FROM MRSAT \
         WHERE ATN IN ({attrs}) AND SUPPRESS = 'N' AND SAB IN ({sabs});",
        attrs = scope.attribute_list(),
        sabs = scope.sab_list()
    )
}

pub fn has_sty_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT c.CUI, s.TUI \
         FROM MRSTY s JOIN MRCONSO c ON s.CUI = c.CUI \
         WHERE {};",
        base_filters(scope, "c")
    )
}

pub fn has_aui_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT SAB, CODE, AUI FROM MRCONSO WHERE {};",
        base_filters(scope, "")
    )
}

pub fn has_cui_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT AUI, CUI FROM MRCONSO WHERE {};",
        base_filters(scope, "")
    )
}

pub fn cui_code_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT CUI, SAB, CODE FROM MRCONSO WHERE {};",
        base_filters(scope, "")
    )
}

pub fn code_attribute_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT SAB, CODE, ATUI, ATN FROM MRSAT \
         WHERE ATN IN ({attrs}) AND SUPPRESS = 'N' AND SAB IN ({sabs});",
        attrs = scope.attribute_list(),
        sabs = scope.sab_list()
    )
}

/// Semantic-network `isa` edges. Only the hierarchy relation carries graph
/// value; the remaining SRSTR relations are left in the staging store.
pub fn semantic_isa_edges() -> String {
    "SELECT DISTINCT s2.UI, s3.UI \
     FROM SRSTR s \
     JOIN SRDEF s2 ON s.STY_RL1 = s2.STY_RL \
     JOIN SRDEF s3 ON s.STY_RL2 = s3.STY_RL \
     WHERE s2.UI != s3.UI AND s.RL = 'isa';"
        .to_owned()
}

/// Concept-concept relationship rows, scoped to relationships asserted by
/// an in-scope vocabulary. RELA/REL resolution and the relation exclusion
/// set are applied by the caller.
pub fn concept_relations(scope: &Scope) -> String {
    format!(
        "WITH q AS (SELECT DISTINCT SAB FROM MRCONSO WHERE {base}) \
         SELECT DISTINCT r.CUI2, r.CUI1, r.RELA, r.REL, r.SAB \
         FROM MRREL r JOIN q ON r.SAB = q.SAB \
         WHERE r.SUPPRESS = 'N';",
        base = base_filters(scope, "")
    )
}

pub fn direct_hierarchy_edges(scope: &Scope) -> String {
    format!(
        "SELECT DISTINCT h.PAUI, c.AUI \
         FROM MRHIER h \
         JOIN MRCONSO c ON h.AUI = c.AUI \
         JOIN MRCONSO c2 ON h.PAUI = c2.AUI \
         WHERE h.SAB IN ({sabs}) \
           AND c.SUPPRESS = 'N' AND c2.SUPPRESS = 'N' \
           AND c.LAT = {lat} AND c2.LAT = {lat} \
           AND c.CODE != c2.CODE;",
        sabs = scope.sab_list(),
        lat = scope.language_literal()
    )
}

pub fn hierarchy_paths(scope: &Scope) -> String {
    format!(
        "SELECT AUI, PTR FROM MRHIER WHERE SAB IN ({sabs}) AND PTR != '';",
        sabs = scope.sab_list()
    )
}

/// ICD-O-3 codes ride along as NCI attribute values rather than first-class
/// source codes; `0000/0` is the not-a-neoplasm placeholder.
pub fn icdo3_attributes() -> String {
    "SELECT DISTINCT ATV, SAB, CODE FROM MRSAT \
     WHERE SAB = 'NCI' AND ATN = 'ICD-O-3_CODE' AND SUPPRESS = 'N' AND ATV != '0000/0';"
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_carry_the_configured_scope() {
        let scope = Scope {
            vocabularies: vec!["RXNORM".into()],
            language: "SPA".into(),
            ..Scope::default()
        };

        let sql = concept_nodes(&scope);
        assert!(sql.contains("SAB IN ('RXNORM')"));
        assert!(sql.contains("LAT = 'SPA'"));
        assert!(sql.contains("ISPREF = 'Y'"));

        let sql = concept_relations(&scope);
        assert!(sql.contains("r.SUPPRESS = 'N'"));
        assert!(sql.contains("JOIN q ON r.SAB = q.SAB"));
    }

    #[test]
    fn joined_queries_qualify_the_filter_alias() {
        let sql = semantic_type_nodes(&Scope::default());
        assert!(sql.contains("c.SAB IN ("));
        assert!(sql.contains("c.SUPPRESS = 'N'"));
    }
}
