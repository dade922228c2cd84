//
// planner/workspace.rs
//
// Planning a rename across several documents.
//

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tower_lsp::lsp_types::{TextEdit, Url, WorkspaceEdit};

use super::{compute_rename_edits, CandidateLocation, RenameTarget};
use crate::config::RefactorConfig;
use crate::snapshot::LineSource;

/// One document's snapshot and the reference locations found in it.
pub struct DocumentRequest<'a, S: ?Sized> {
    pub uri: Url,
    pub snapshot: &'a S,
    pub locations: Vec<CandidateLocation>,
}

/// Plan a rename over many documents.
///
/// Documents are planned in parallel, each against its own snapshot. A URI
/// that appears more than once is planned only for its first request, since
/// two edit sets computed for one document cannot be merged safely.
pub fn plan_workspace_rename<S>(
    requests: &[DocumentRequest<'_, S>],
    old: &RenameTarget,
    new: &RenameTarget,
    config: &RefactorConfig,
) -> WorkspaceEdit
where
    S: LineSource + Sync + ?Sized,
{
    let mut seen = HashSet::new();
    let distinct: Vec<&DocumentRequest<'_, S>> = requests
        .iter()
        .filter(|request| {
            let first = seen.insert(&request.uri);
            if !first {
                log::warn!("Skipping duplicate rename request for {}", request.uri);
            }
            first
        })
        .collect();

    let changes: HashMap<Url, Vec<TextEdit>> = distinct
        .par_iter()
        .filter_map(|request| {
            let edits =
                compute_rename_edits(request.snapshot, &request.locations, old, new, config);
            log::trace!("Planned {} edits for {}", edits.len(), request.uri);
            (!edits.is_empty()).then(|| (request.uri.clone(), edits))
        })
        .collect();

    WorkspaceEdit {
        changes: Some(changes),
        ..Default::default()
    }
}
