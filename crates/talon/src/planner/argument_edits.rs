//
// planner/argument_edits.rs
//
// Adding, removing, and reordering predicate arguments.
//
// Call sites get surgical edits that touch only the affected argument and
// its separator, so formatting and comments elsewhere in the call survive.
// Indicator sites get their arity rewritten.
//

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::TextEdit;

use super::matching::{callable_at, indicator_at, name_len_at, CallShape};
use super::rename::{callable_references, LocatedTerm, ReferenceMatch};
use super::{finalize_edits, CandidateLocation};
use crate::config::RefactorConfig;
use crate::indicator::Indicator;
use crate::snapshot::LineSource;

/// A change to a predicate's argument list. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ArgumentChange {
    /// Insert `text` so that it becomes argument `position`.
    Add { position: u32, text: String },
    /// Delete argument `position`.
    Remove { position: u32 },
    /// `order[i]` is the old position of the argument placed at new
    /// position `i + 1`.
    Reorder { order: Vec<u32> },
}

impl ArgumentChange {
    /// Arity after applying the change to a predicate of `arity`, or `None`
    /// when the change does not fit that arity.
    pub fn new_arity(&self, arity: u32) -> Option<u32> {
        match self {
            ArgumentChange::Add { position, text } => {
                (*position >= 1 && *position <= arity + 1 && !text.trim().is_empty())
                    .then_some(arity + 1)
            }
            ArgumentChange::Remove { position } => {
                (*position >= 1 && *position <= arity).then(|| arity - 1)
            }
            ArgumentChange::Reorder { order } => {
                let mut seen = vec![false; arity as usize];
                let is_permutation = order.len() == arity as usize
                    && order.iter().all(|&old| {
                        let slot = (old as usize).checked_sub(1).and_then(|i| seen.get_mut(i));
                        match slot {
                            Some(flag) if !*flag => {
                                *flag = true;
                                true
                            }
                            _ => false,
                        }
                    });
                is_permutation.then_some(arity)
            }
        }
    }

    fn is_identity(&self) -> bool {
        match self {
            ArgumentChange::Reorder { order } => order
                .iter()
                .enumerate()
                .all(|(i, &old)| old as usize == i + 1),
            _ => false,
        }
    }
}

/// Text inserted for an added argument inside a callable-form directive.
fn template_placeholder(keyword: Option<&str>) -> Option<&'static str> {
    match keyword? {
        "mode" | "mode_non_terminal" => Some("?term"),
        "meta_predicate" | "meta_non_terminal" => Some("*"),
        _ => None,
    }
}

/// Compute the edits that apply `change` to every reference of `target` at
/// the candidate locations.
///
/// Returns no edits when the change does not fit the target's arity (an
/// out-of-range position, or an order that is not a permutation).
pub fn compute_argument_edits<S: LineSource + ?Sized>(
    snapshot: &S,
    locations: &[CandidateLocation],
    target: &Indicator,
    change: &ArgumentChange,
    config: &RefactorConfig,
) -> Vec<TextEdit> {
    let Some(new_arity) = change.new_arity(target.arity) else {
        log::debug!("Argument change {:?} does not fit {}", change, target);
        return Vec::new();
    };
    if change.is_identity() {
        return Vec::new();
    }

    let mut edits = Vec::new();
    for &location in locations {
        let Some(located) = LocatedTerm::locate(snapshot, location, config) else {
            log::debug!("No term found for argument candidate {:?}", location);
            continue;
        };
        let added_text = match change {
            ArgumentChange::Add { text, .. } => {
                template_placeholder(located.context.keyword.as_deref()).unwrap_or(text.trim())
            }
            _ => "",
        };

        for (m, check) in callable_references(&located, location, target, config) {
            edits.extend(match_edits(&located, &m, change, new_arity, added_text));

            // Both sides of `Original as Alias` keep the same arity.
            if let Some(other) = check.other_side() {
                if let Some(other_match) = reference_at(&located.term.text, other.start) {
                    edits.extend(match_edits(
                        &located,
                        &other_match,
                        change,
                        new_arity,
                        added_text,
                    ));
                }
            }
        }
    }

    finalize_edits(snapshot, edits)
}

/// The indicator or callable starting at `start`.
fn reference_at(text: &str, start: usize) -> Option<ReferenceMatch> {
    let name = start..start + name_len_at(text, start)?;
    if let Some(indicator) = indicator_at(text, name.clone()) {
        return Some(ReferenceMatch::Indicator(indicator));
    }
    let shape = callable_at(text, &name)?;
    Some(ReferenceMatch::Call { name, shape })
}

fn match_edits(
    located: &LocatedTerm,
    m: &ReferenceMatch,
    change: &ArgumentChange,
    new_arity: u32,
    added_text: &str,
) -> Vec<TextEdit> {
    let text = located.term.text.as_str();
    match m {
        ReferenceMatch::Indicator(indicator) => {
            if indicator.arity == new_arity {
                return Vec::new();
            }
            vec![located.edit(indicator.arity_span.clone(), new_arity.to_string())]
        }
        ReferenceMatch::Call {
            name,
            shape: CallShape::Atom,
        } => match change {
            ArgumentChange::Add { .. } => {
                vec![located.edit(name.end..name.end, format!("({})", added_text))]
            }
            _ => Vec::new(),
        },
        ReferenceMatch::Call {
            name,
            shape: CallShape::Compound(call),
        } => {
            let spans = &call.spans;
            match change {
                ArgumentChange::Add { position, .. } => {
                    let index = *position as usize - 1;
                    let edit = match (spans.get(index), spans.last()) {
                        (Some(span), _) => {
                            located.edit(span.start..span.start, format!("{}, ", added_text))
                        }
                        (None, Some(last)) => {
                            located.edit(last.end..last.end, format!(", {}", added_text))
                        }
                        (None, None) => {
                            located.edit(call.open + 1..call.open + 1, added_text.to_string())
                        }
                    };
                    vec![edit]
                }
                ArgumentChange::Remove { position } => {
                    let index = *position as usize - 1;
                    let deletion = if spans.len() == 1 {
                        // Last argument gone: `foo(X)` becomes `foo`.
                        Some(name.end..call.close + 1)
                    } else if index + 1 < spans.len() {
                        Some(spans[index].start..spans[index + 1].start)
                    } else if index > 0 && index < spans.len() {
                        Some(spans[index - 1].end..spans[index].end)
                    } else {
                        None
                    };
                    deletion
                        .map(|range| vec![located.edit(range, "")])
                        .unwrap_or_default()
                }
                ArgumentChange::Reorder { order } => {
                    if order.len() != spans.len() {
                        return Vec::new();
                    }
                    order
                        .iter()
                        .enumerate()
                        .filter(|&(i, &old)| old as usize != i + 1)
                        .filter_map(|(i, &old)| {
                            let source = spans.get(old as usize - 1)?;
                            Some(located.edit(
                                spans[i].start..spans[i].end,
                                source.text(text).to_string(),
                            ))
                        })
                        .collect()
                }
            }
        }
    }
}
