use std::collections::BTreeMap;

use crate::graph::{code_id, code_label, OutputTable, EDGE_HEADER};
use crate::staging::Staging;
use crate::Result;

use super::queries;
use super::{CODE_NODE_FILE, CODE_NODE_HEADER, CUI_CODE_FILE};

const ICDO3: &str = "ICDO3";

/// One ICD-O-3 attribute occurrence: the attribute value and the composite
/// id of the NCI code it annotates.
pub(super) struct Icdo3Row {
    pub atv: String,
    pub nci_code_id: String,
}

pub(super) async fn icdo3_rows(staging: &Staging) -> Result<Vec<Icdo3Row>> {
    let rows = staging.fetch_rows(&queries::icdo3_attributes()).await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            if let [atv, sab, code] = row.as_slice() {
                Some(Icdo3Row {
                    atv: atv.clone(),
                    nci_code_id: code_id(sab, code),
                })
            } else {
                None
            }
        })
        .collect())
}

/// Promote ICD-O-3 attribute values to Code nodes and join them onto the
/// concepts already linked to the annotated NCI codes.
///
/// The base concept-code edge set is taken as an argument on purpose: the
/// join must see exactly what the base extraction produced this run, not
/// whatever happens to be on disk.
pub(super) fn build_appends(
    icdo3: &[Icdo3Row],
    base_cui_code: &OutputTable,
) -> (OutputTable, OutputTable) {
    let mut by_code: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for row in base_cui_code.rows() {
        if let [cui, end_id, _] = row.as_slice() {
            by_code.entry(end_id).or_default().push(cui);
        }
    }

    let mut nodes = OutputTable::new(CODE_NODE_FILE, &CODE_NODE_HEADER);
    let mut edges = OutputTable::new(CUI_CODE_FILE, &EDGE_HEADER);

    for row in icdo3 {
        let icdo_id = code_id(ICDO3, &row.atv);
        nodes.push(vec![
            icdo_id.clone(),
            ICDO3.to_owned(),
            row.atv.clone(),
            code_label(ICDO3),
        ]);

        if let Some(cuis) = by_code.get(row.nci_code_id.as_str()) {
            for cui in cuis {
                edges.push_edge(
                    (*cui).to_owned(),
                    icdo_id.clone(),
                    vec!["HAS_SOURCE_CODE".to_owned()],
                );
            }
        }
    }

    (nodes, edges)
}
