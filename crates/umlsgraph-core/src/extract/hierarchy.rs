use crate::graph::{OutputTable, EDGE_HEADER};
use crate::scope::Scope;
use crate::staging::Staging;
use crate::Result;

use super::queries;

const CHILD_OF: &str = "CHILD_OF";

/// Explode the PTR ancestor paths into CHILD_OF edges.
///
/// PTR holds the dot-delimited atom path from the hierarchy root down to
/// the immediate parent of the row's AUI. Each adjacent ancestor pair
/// becomes an edge, plus the terminal edge from the parent to the atom
/// itself. Rows are streamed and edges deduplicate on insert; memory is
/// bounded by the count of unique edges, not total path segments.
pub(super) async fn exploded_edges(staging: &Staging, scope: &Scope) -> Result<OutputTable> {
    let mut table = OutputTable::new("child_of_rel_ptr.csv", &EDGE_HEADER);

    staging
        .for_each_row(&queries::hierarchy_paths(scope), |row| {
            let aui = &row[0];
            let ptr = &row[1];

            let mut prev: Option<&str> = None;
            for ancestor in ptr.split('.').filter(|a| !a.is_empty()) {
                if let Some(parent) = prev {
                    table.push_edge(parent.to_owned(), ancestor.to_owned(), vec![CHILD_OF.to_owned()]);
                }
                prev = Some(ancestor);
            }
            if let Some(parent) = prev {
                table.push_edge(parent.to_owned(), aui.clone(), vec![CHILD_OF.to_owned()]);
            }
            Ok(())
        })
        .await?;

    Ok(table)
}

/// The join-based alternative: one edge per MRHIER row, both endpoints
/// required to pass the scope filters.
pub(super) async fn direct_edges(staging: &Staging, scope: &Scope) -> Result<OutputTable> {
    let rows = staging
        .fetch_rows(&queries::direct_hierarchy_edges(scope))
        .await?;

    let mut table = OutputTable::new("child_of_rel.csv", &EDGE_HEADER);
    for row in rows {
        if let [paui, aui] = row.as_slice() {
            table.push_edge(paui.clone(), aui.clone(), vec![CHILD_OF.to_owned()]);
        }
    }
    Ok(table)
}
