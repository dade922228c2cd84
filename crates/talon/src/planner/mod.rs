//! Edit planning.
//!
//! Turns candidate reference locations into `TextEdit`s for renames,
//! argument changes, and directive reformatting. Edits are computed against
//! one read-only snapshot and never applied here; the caller owns the
//! document and decides when to apply them.

pub mod argument_edits;
pub mod directive_format;
mod matching;
pub mod rename;
pub mod workspace;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::indicator::Indicator;
use crate::snapshot::LineSource;
use crate::utf16::utf16_column_to_byte_offset;

pub use argument_edits::{compute_argument_edits, ArgumentChange};
pub use directive_format::format_directive;
pub use rename::compute_rename_edits;
pub use workspace::{plan_workspace_rename, DocumentRequest};

/// A reference position reported by the reference index.
///
/// Some index results only carry a line; `character` is then `None` and
/// the planner searches the whole line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateLocation {
    pub line: u32,
    /// UTF-16 column of the start of the reference name.
    pub character: Option<u32>,
}

impl CandidateLocation {
    pub fn line(line: u32) -> Self {
        Self {
            line,
            character: None,
        }
    }

    pub fn at(line: u32, character: u32) -> Self {
        Self {
            line,
            character: Some(character),
        }
    }
}

impl From<Position> for CandidateLocation {
    fn from(position: Position) -> Self {
        Self::at(position.line, position.character)
    }
}

/// What a rename applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenameTarget {
    /// A predicate or non-terminal.
    Callable(Indicator),
    /// An object, protocol, or category with its parameter count.
    Entity { name: String, arity: u32 },
    /// A variable, or a parameter variable such as `_Name_`.
    Variable { name: String },
}

impl RenameTarget {
    pub fn name(&self) -> &str {
        match self {
            RenameTarget::Callable(indicator) => &indicator.name,
            RenameTarget::Entity { name, .. } => name,
            RenameTarget::Variable { name } => name,
        }
    }
}

fn position_key(position: Position) -> (u32, u32) {
    (position.line, position.character)
}

/// Text covered by `range`, lines joined with `\n`.
fn range_text<S: LineSource + ?Sized>(snapshot: &S, range: Range) -> Option<String> {
    let mut text = String::new();
    for line in range.start.line..=range.end.line {
        let line_text = snapshot.line_text(line as usize)?;
        let start = if line == range.start.line {
            utf16_column_to_byte_offset(&line_text, range.start.character)
        } else {
            0
        };
        let end = if line == range.end.line {
            utf16_column_to_byte_offset(&line_text, range.end.character)
        } else {
            line_text.len()
        };
        if start > end {
            return None;
        }
        if line != range.start.line {
            text.push('\n');
        }
        text.push_str(&line_text[start..end]);
    }
    Some(text)
}

/// Sort edits by position, drop no-op and inverted edits, and drop any edit
/// that overlaps one already kept.
///
/// Insertions at the same position as a kept edit are dropped too: the
/// resulting text would depend on the order an editor applies them in.
pub(crate) fn finalize_edits<S: LineSource + ?Sized>(
    snapshot: &S,
    mut edits: Vec<TextEdit>,
) -> Vec<TextEdit> {
    edits.sort_by_key(|edit| (position_key(edit.range.start), position_key(edit.range.end)));

    let mut kept: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if position_key(edit.range.start) > position_key(edit.range.end) {
            log::trace!("Dropping inverted edit {:?}", edit.range);
            continue;
        }
        match range_text(snapshot, edit.range) {
            Some(existing) if existing == edit.new_text => continue,
            Some(_) => {}
            None => {
                log::trace!("Dropping edit outside the document {:?}", edit.range);
                continue;
            }
        }
        if let Some(last) = kept.last() {
            let overlaps = position_key(edit.range.start) < position_key(last.range.end)
                || edit.range.start == last.range.start;
            if overlaps {
                log::trace!(
                    "Dropping edit {:?} overlapping {:?}",
                    edit.range,
                    last.range
                );
                continue;
            }
        }
        kept.push(edit);
    }
    kept
}
