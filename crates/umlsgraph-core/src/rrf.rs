use crate::{Error, Result};

/// One UMLS release table: its staging table name, the release file it is
/// loaded from, and its ordered column list. Every column is TEXT; UMLS
/// stores "no value" as the empty string and the loader keeps it that way.
pub struct TableSchema {
    pub table: &'static str,
    pub file: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSchema {
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{c} TEXT"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({columns});", self.table)
    }

    #[must_use]
    pub fn insert_sql(&self) -> String {
        let placeholders = vec!["?"; self.arity()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            self.table,
            self.columns.join(", ")
        )
    }
}

pub static TABLES: [TableSchema; 13] = [
    TableSchema {
        table: "MRCONSO",
        file: "MRCONSO.RRF",
        columns: &[
            "CUI", "LAT", "TS", "LUI", "STT", "SUI", "ISPREF", "AUI", "SAUI", "SCUI", "SDUI",
            "SAB", "TTY", "CODE", "STR", "SRL", "SUPPRESS", "CVF",
        ],
    },
    TableSchema {
        table: "MRSTY",
        file: "MRSTY.RRF",
        columns: &["CUI", "TUI", "STN", "STY", "ATUI", "CVF"],
    },
    TableSchema {
        table: "MRREL",
        file: "MRREL.RRF",
        columns: &[
            "CUI1", "AUI1", "STYPE1", "REL", "CUI2", "AUI2", "STYPE2", "RELA", "RUI", "SRUI",
            "SAB", "SL", "RG", "DIR", "SUPPRESS", "CVF",
        ],
    },
    TableSchema {
        table: "MRHIER",
        file: "MRHIER.RRF",
        columns: &["CUI", "AUI", "CXN", "PAUI", "SAB", "RELA", "PTR", "HCD", "CVF"],
    },
    TableSchema {
        table: "MRRANK",
        file: "MRRANK.RRF",
        columns: &["MRRANK_RANK", "SAB", "TTY", "SUPPRESS"],
    },
    TableSchema {
        table: "MRSAT",
        file: "MRSAT.RRF",
        columns: &[
            "CUI", "LUI", "SUI", "METAUI", "STYPE", "CODE", "ATUI", "SATUI", "ATN", "SAB", "ATV",
            "SUPPRESS", "CVF",
        ],
    },
    TableSchema {
        table: "MRSAB",
        file: "MRSAB.RRF",
        columns: &[
            "VCUI", "RCUI", "VSAB", "RSAB", "SON", "SF", "SVER", "VSTART", "VEND", "IMETA",
            "RMETA", "SLC", "SCC", "SRL", "TRF", "CFR", "CXTY", "TTYL", "ATNL", "LAT", "CENC",
            "CURVER", "SABIN", "SSN", "SCIT",
        ],
    },
    TableSchema {
        table: "MRDEF",
        file: "MRDEF.RRF",
        columns: &["CUI", "AUI", "ATUI", "SATUI", "SAB", "DEF", "SUPPRESS", "CVF"],
    },
    TableSchema {
        table: "SRDEF",
        file: "SRDEF.pipe",
        columns: &[
            "RT", "UI", "STY_RL", "STN_RTN", "DEF", "EX", "UN", "NH", "ABR", "RIN",
        ],
    },
    TableSchema {
        table: "SRSTR",
        file: "SRSTR.pipe",
        columns: &["STY_RL1", "RL", "STY_RL2", "LS"],
    },
    TableSchema {
        table: "SRSTRE1",
        file: "SRSTRE1.pipe",
        columns: &["UI1", "UI2", "UI3"],
    },
    TableSchema {
        table: "SRSTRE2",
        file: "SRSTRE2.pipe",
        columns: &["STY1", "RL", "STY2"],
    },
    TableSchema {
        table: "SRGRP",
        file: "semantic_groups.pipe",
        columns: &["STY_GROUP_ABBREV", "STY_GROUP", "TUI", "STY"],
    },
];

/// Join/filter columns the extraction queries depend on. Created after all
/// tables are loaded; creating them up front would slow the bulk insert.
pub static INDEXES: [(&str, &str, &str); 10] = [
    ("X_mrsty_cui", "MRSTY", "CUI"),
    ("X_mrconso_cui", "MRCONSO", "CUI"),
    ("X_mrconso_sab", "MRCONSO", "SAB"),
    ("X_mrrel_cui1", "MRREL", "CUI1"),
    ("X_mrrel_cui2", "MRREL", "CUI2"),
    ("X_mrrel_aui1", "MRREL", "AUI1"),
    ("X_mrrel_aui2", "MRREL", "AUI2"),
    ("X_mrhier_aui", "MRHIER", "AUI"),
    ("X_mrhier_paui", "MRHIER", "PAUI"),
    ("X_mrsat_cui", "MRSAT", "CUI"),
];

/// Split one release record into its fields.
///
/// Records are pipe-delimited and pipe-terminated; the line terminator has
/// already been stripped by the reader. A record that does not end with the
/// terminator, or that does not split into exactly `arity` fields, is a
/// fatal parse error for the whole run.
pub fn parse_record(line: &str, file: &'static str, line_no: u64, arity: usize) -> Result<Vec<String>> {
    let Some(body) = line.strip_suffix('|') else {
        return Err(Error::MissingTerminator {
            file,
            line: line_no,
        });
    };

    let fields: Vec<String> = body.split('|').map(str::to_owned).collect();
    if fields.len() != arity {
        return Err(Error::FieldCount {
            file,
            line: line_no,
            expected: arity,
            found: fields.len(),
        });
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_all_release_tables() {
        assert_eq!(TABLES.len(), 13);

        let arity_of = |name: &str| {
            TABLES
                .iter()
                .find(|t| t.table == name)
                .map(TableSchema::arity)
                .unwrap()
        };
        assert_eq!(arity_of("MRCONSO"), 18);
        assert_eq!(arity_of("MRSTY"), 6);
        assert_eq!(arity_of("MRREL"), 16);
        assert_eq!(arity_of("MRHIER"), 9);
        assert_eq!(arity_of("MRSAT"), 13);
        assert_eq!(arity_of("MRSAB"), 25);
    }

    #[test]
    fn parse_record_splits_fields() {
        let fields = parse_record("C0001|T047|A1.2.3|Disease||256|", "MRSTY.RRF", 1, 6).unwrap();
        assert_eq!(fields, vec!["C0001", "T047", "A1.2.3", "Disease", "", "256"]);
    }

    #[test]
    fn parse_record_keeps_empty_fields() {
        let fields = parse_record("|||", "SRSTRE1.pipe", 1, 3).unwrap();
        assert_eq!(fields, vec!["", "", ""]);
    }

    #[test]
    fn parse_record_rejects_missing_terminator() {
        let err = parse_record("C0001|T047", "MRSTY.RRF", 7, 6).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingTerminator { file: "MRSTY.RRF", line: 7 }
        ));
    }

    #[test]
    fn parse_record_rejects_wrong_field_count() {
        let err = parse_record("C0001|T047|", "MRSTY.RRF", 3, 6).unwrap_err();
        assert!(matches!(
            err,
            Error::FieldCount { expected: 6, found: 2, .. }
        ));
    }

    #[test]
    fn insert_sql_has_one_placeholder_per_column() {
        let mrsty = TABLES.iter().find(|t| t.table == "MRSTY").unwrap();
        assert_eq!(
            mrsty.insert_sql(),
            "INSERT INTO MRSTY (CUI, TUI, STN, STY, ATUI, CVF) VALUES (?, ?, ?, ?, ?, ?);"
        );
    }
}
