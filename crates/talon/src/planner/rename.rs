//
// planner/rename.rs
//
// Rename edits for predicates, non-terminals, entities, and variables.
//

use std::ops::Range as ByteRange;

use tower_lsp::lsp_types::{Position, Range, TextEdit};

use super::matching::{
    alias_check, callable_at, followed_by_message_send, indicator_at, name_len_at, AliasCheck,
    CallShape, IndicatorMatch, MaskedText,
};
use super::{finalize_edits, CandidateLocation, RenameTarget};
use crate::arguments::{call_arguments_at, CallArguments};
use crate::config::RefactorConfig;
use crate::context::{
    classify_term_with_limit, directive_keyword, directive_kind, enclosing_entity_with_limit,
    find_entity_end, DirectiveKind, SyntacticRole, TermContext,
};
use crate::indicator::{is_atom, is_parameter_variable, is_variable, Indicator};
use crate::scanner::{scan, strip_line_comment};
use crate::snapshot::LineSource;
use crate::term_boundary::{get_clause_range, get_term_range_with_limit, LineRange, TermText};

/// One reference to a predicate or non-terminal inside a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReferenceMatch {
    Indicator(IndicatorMatch),
    Call {
        name: ByteRange<usize>,
        shape: CallShape,
    },
}

impl ReferenceMatch {
    pub fn name(&self) -> &ByteRange<usize> {
        match self {
            ReferenceMatch::Indicator(m) => &m.name,
            ReferenceMatch::Call { name, .. } => name,
        }
    }
}

/// A term located from a candidate, ready for matching.
pub(crate) struct LocatedTerm {
    pub context: TermContext,
    pub term: TermText,
}

impl LocatedTerm {
    pub fn locate<S: LineSource + ?Sized>(
        snapshot: &S,
        location: CandidateLocation,
        config: &RefactorConfig,
    ) -> Option<Self> {
        let context = classify_term_with_limit(snapshot, location.line, config.max_scan_lines)?;
        let term = TermText::collect(snapshot, context.range)?;
        Some(Self { context, term })
    }

    /// Byte offset of the candidate column, when one was given.
    pub fn location_offset(&self, location: CandidateLocation) -> Option<usize> {
        let character = location.character?;
        self.term.offset_of(Position {
            line: location.line,
            character,
        })
    }

    pub fn edit(&self, span: ByteRange<usize>, new_text: impl Into<String>) -> TextEdit {
        TextEdit {
            range: Range {
                start: self.term.position_of(span.start),
                end: self.term.position_of(span.end),
            },
            new_text: new_text.into(),
        }
    }
}

/// Keep one match per directive (the one at the candidate column, else the
/// first in document order) unless every occurrence was asked for.
fn select_in_directive<T>(
    mut matches: Vec<T>,
    location_offset: Option<usize>,
    name_of: impl Fn(&T) -> &ByteRange<usize>,
    config: &RefactorConfig,
) -> Vec<T> {
    if config.all_occurrences_per_term {
        if matches.len() > config.max_matches_per_term {
            log::warn!(
                "Term has {} matches; keeping the first {}",
                matches.len(),
                config.max_matches_per_term
            );
            matches.truncate(config.max_matches_per_term);
        }
        return matches;
    }
    let at_location = location_offset
        .and_then(|offset| matches.iter().position(|m| name_of(m).contains(&offset)));
    match at_location {
        Some(index) => vec![matches.swap_remove(index)],
        None => matches.into_iter().take(1).collect(),
    }
}

/// Keep the match at the candidate column, else every match on the line.
fn select_on_line<T>(
    mut matches: Vec<T>,
    location_offset: Option<usize>,
    name_of: impl Fn(&T) -> &ByteRange<usize>,
    config: &RefactorConfig,
) -> Vec<T> {
    if let Some(index) = location_offset
        .and_then(|offset| matches.iter().position(|m| name_of(m).contains(&offset)))
    {
        return vec![matches.swap_remove(index)];
    }
    matches.truncate(config.max_matches_per_term);
    matches
}

fn indicator_matches(
    masked: &MaskedText<'_>,
    target: &Indicator,
    within: &ByteRange<usize>,
) -> Vec<ReferenceMatch> {
    masked
        .name_occurrences(&target.name)
        .into_iter()
        .filter(|start| within.contains(start))
        .filter_map(|start| indicator_at(masked.text, start..start + target.name.len()))
        .filter(|m| {
            let accepted = m.kind == target.kind && m.arity == target.arity;
            if !accepted {
                log::trace!(
                    "Indicator at {} has arity {} ({:?}), wanted {}",
                    m.name.start,
                    m.arity,
                    m.kind,
                    target
                );
            }
            accepted
        })
        .map(ReferenceMatch::Indicator)
        .collect()
}

fn call_matches(
    masked: &MaskedText<'_>,
    target: &Indicator,
    within: &ByteRange<usize>,
) -> Vec<ReferenceMatch> {
    masked
        .name_occurrences(&target.name)
        .into_iter()
        .filter(|start| within.contains(start))
        .filter_map(|start| {
            let name = start..start + target.name.len();
            let shape = callable_at(masked.text, &name)?;
            if shape.arity() != target.arity as usize {
                log::trace!(
                    "Call at {} has {} arguments, wanted {}",
                    start,
                    shape.arity(),
                    target
                );
                return None;
            }
            // `name::goal` sends a message to an entity of that name.
            if followed_by_message_send(masked.text, shape.end(&name)) {
                return None;
            }
            Some(ReferenceMatch::Call { name, shape })
        })
        .collect()
}

/// References to `target` in the term around `location`, with the alias
/// classification of each.
pub(crate) fn callable_references(
    located: &LocatedTerm,
    location: CandidateLocation,
    target: &Indicator,
    config: &RefactorConfig,
) -> Vec<(ReferenceMatch, AliasCheck)> {
    let masked = MaskedText::new(&located.term.text);
    let location_offset = located.location_offset(location);

    match located.context.role.directive_kind() {
        Some(kind) => {
            let whole = 0..masked.text.len();
            let mut matches = Vec::new();
            if kind.permits_indicator_form() {
                matches = indicator_matches(&masked, target, &whole);
            }
            if matches.is_empty() && kind.permits_callable_form() {
                matches = call_matches(&masked, target, &whole);
            }

            let checked: Vec<_> = matches
                .into_iter()
                .map(|m| {
                    let check = if kind == DirectiveKind::UsesAliasList {
                        alias_check(masked.text, m.name().start)
                    } else {
                        AliasCheck::Plain
                    };
                    (m, check)
                })
                .filter(|(_, check)| *check != AliasCheck::Ambiguous)
                .collect();

            if checked.is_empty() {
                log::debug!(
                    "No reference to {} in {:?} directive at lines {}..={}",
                    target,
                    kind,
                    located.term.range.start,
                    located.term.range.end
                );
            }
            select_in_directive(checked, location_offset, |(m, _)| m.name(), config)
        }
        None => {
            let Some(line_span) = located.term.line_span(location.line) else {
                return Vec::new();
            };
            let mut matches = call_matches(&masked, target, &line_span);
            if matches.is_empty() {
                matches = indicator_matches(&masked, target, &line_span);
            }
            let checked: Vec<_> = matches
                .into_iter()
                .map(|m| (m, AliasCheck::Plain))
                .collect();
            select_on_line(checked, location_offset, |(m, _)| m.name(), config)
        }
    }
}

/// Compute the edits that rename `old` to `new` at every candidate location.
///
/// Each location is classified on its own. A location whose term cannot be
/// delimited, whose directive is unknown, or that holds no matching
/// reference contributes nothing, and the others still produce edits.
/// Renaming a target to itself produces no edits.
///
/// ```
/// use talon::indicator::Indicator;
/// use talon::planner::{compute_rename_edits, CandidateLocation, RenameTarget};
///
/// let doc = vec![":- uses(list, [append/3, member/2])."];
/// let edits = compute_rename_edits(
///     &doc,
///     &[CandidateLocation::line(0)],
///     &RenameTarget::Callable(Indicator::predicate("member", 2)),
///     &RenameTarget::Callable(Indicator::predicate("element", 2)),
///     &Default::default(),
/// );
/// assert_eq!(edits.len(), 1);
/// assert_eq!(edits[0].new_text, "element");
/// ```
pub fn compute_rename_edits<S: LineSource + ?Sized>(
    snapshot: &S,
    locations: &[CandidateLocation],
    old: &RenameTarget,
    new: &RenameTarget,
    config: &RefactorConfig,
) -> Vec<TextEdit> {
    if old == new || old.name() == new.name() {
        return Vec::new();
    }

    let mut edits = Vec::new();
    match (old, new) {
        (RenameTarget::Callable(target), RenameTarget::Callable(replacement)) => {
            if !is_atom(&replacement.name) {
                log::debug!("Refusing to rename to non-atom '{}'", replacement.name);
                return Vec::new();
            }
            for &location in locations {
                let Some(located) = LocatedTerm::locate(snapshot, location, config) else {
                    log::debug!("No term found for rename candidate {:?}", location);
                    continue;
                };
                for (m, _) in callable_references(&located, location, target, config) {
                    edits.push(located.edit(m.name().clone(), replacement.name.as_str()));
                }
            }
        }
        (
            RenameTarget::Entity { name, arity },
            RenameTarget::Entity {
                name: new_name, ..
            },
        ) => {
            if !is_atom(new_name) {
                log::debug!("Refusing to rename entity to non-atom '{}'", new_name);
                return Vec::new();
            }
            for &location in locations {
                edits.extend(entity_edits(snapshot, location, name, *arity, new_name, config));
            }
        }
        (RenameTarget::Variable { name }, RenameTarget::Variable { name: new_name }) => {
            // Each `_` is a distinct variable; renaming would merge them.
            if name == "_" || new_name == "_" {
                log::debug!("Refusing to rename the anonymous variable");
                return Vec::new();
            }
            if !is_variable(new_name) {
                log::debug!("Refusing to rename variable to '{}'", new_name);
                return Vec::new();
            }
            for &location in locations {
                edits.extend(variable_edits(snapshot, location, name, new_name, config));
            }
        }
        _ => {
            log::debug!("Rename between different target kinds: {:?} -> {:?}", old, new);
            return Vec::new();
        }
    }

    finalize_edits(snapshot, edits)
}

/// Arguments of a directive (`:- uses(list, [...])` → `list`, `[...]`).
pub(crate) fn directive_arguments(text: &str) -> Option<CallArguments> {
    let open = scan(text, 0)
        .find(|step| step.ch == '(' && step.is_code())?
        .index;
    call_arguments_at(text, open)
}

fn entity_matches(
    located: &LocatedTerm,
    masked: &MaskedText<'_>,
    name: &str,
    arity: u32,
    within: &ByteRange<usize>,
) -> Vec<ByteRange<usize>> {
    let role = located.context.role;
    let first_argument = (role == SyntacticRole::UsesAliasList)
        .then(|| directive_arguments(masked.text))
        .flatten()
        .and_then(|args| args.spans.first().map(|span| span.start));

    masked
        .name_occurrences(name)
        .into_iter()
        .filter(|start| within.contains(start))
        .filter_map(|start| {
            let span = start..start + name.len();
            let shape = callable_at(masked.text, &span)?;
            if shape.arity() != arity as usize {
                log::trace!("Entity reference at {} has arity {}", start, shape.arity());
                return None;
            }
            let accepted = match role {
                SyntacticRole::EntityOpening => true,
                SyntacticRole::UsesAliasList => {
                    first_argument == Some(start)
                        || followed_by_message_send(masked.text, shape.end(&span))
                }
                _ => followed_by_message_send(masked.text, shape.end(&span)),
            };
            accepted.then_some(span)
        })
        .collect()
}

fn entity_edits<S: LineSource + ?Sized>(
    snapshot: &S,
    location: CandidateLocation,
    name: &str,
    arity: u32,
    new_name: &str,
    config: &RefactorConfig,
) -> Vec<TextEdit> {
    let Some(located) = LocatedTerm::locate(snapshot, location, config) else {
        log::debug!("No term found for entity rename candidate {:?}", location);
        return Vec::new();
    };
    let masked = MaskedText::new(&located.term.text);
    let location_offset = located.location_offset(location);

    let spans = if located.context.is_directive() {
        let whole = 0..masked.text.len();
        let matches = entity_matches(&located, &masked, name, arity, &whole);
        select_in_directive(matches, location_offset, |span| span, config)
    } else {
        let Some(line_span) = located.term.line_span(location.line) else {
            return Vec::new();
        };
        let matches = entity_matches(&located, &masked, name, arity, &line_span);
        select_on_line(matches, location_offset, |span| span, config)
    };

    let mut edits: Vec<TextEdit> = spans
        .into_iter()
        .map(|span| located.edit(span, new_name))
        .collect();

    if !located.context.is_directive() {
        edits.extend(consecutive_multifile_heads(
            snapshot,
            located.context.range,
            name,
            arity,
            new_name,
            config,
        ));
    }
    edits
}

/// Entity qualifier of a multifile clause head (`entity::head`,
/// `entity(A)::head`): byte range of the entity name, name, parameter count.
pub(crate) fn qualified_head(line: &str) -> Option<(ByteRange<usize>, String, u32)> {
    let code = strip_line_comment(line);
    let indent = code.len() - code.trim_start().len();
    let rest = &code[indent..];
    if !rest.starts_with(|c: char| c.is_ascii_lowercase() || c == '\'') {
        return None;
    }
    let len = name_len_at(rest, 0)?;
    let (arity, after) = match call_arguments_at(rest, len) {
        Some(call) => (call.arity() as u32, call.close + 1),
        None => (0, len),
    };
    if !rest[after..].starts_with("::") {
        return None;
    }
    Some((indent..indent + len, rest[..len].to_string(), arity))
}

/// Edits for the run of clauses after `range` whose heads are qualified
/// with the same entity.
fn consecutive_multifile_heads<S: LineSource + ?Sized>(
    snapshot: &S,
    range: LineRange,
    name: &str,
    arity: u32,
    new_name: &str,
    config: &RefactorConfig,
) -> Vec<TextEdit> {
    let start_matches = snapshot
        .line_text(range.start as usize)
        .and_then(|text| qualified_head(&text))
        .is_some_and(|(_, head_name, head_arity)| head_name == name && head_arity == arity);
    if !start_matches {
        return Vec::new();
    }

    let mut edits = Vec::new();
    let mut line = range.end as usize + 1;
    let mut visited = 0;
    while line < snapshot.line_count() {
        if visited >= config.max_scan_lines {
            log::warn!(
                "Stopped following multifile heads for {} after {} lines",
                name,
                config.max_scan_lines
            );
            break;
        }
        visited += 1;

        if snapshot.line_tag(line).is_skippable() {
            line += 1;
            continue;
        }
        let Some(text) = snapshot.line_text(line) else {
            break;
        };
        if directive_keyword(&text).is_some() {
            break;
        }
        let Some((span, head_name, head_arity)) = qualified_head(&text) else {
            break;
        };
        if head_name != name || head_arity != arity {
            break;
        }

        edits.push(TextEdit {
            range: Range {
                start: Position {
                    line: line as u32,
                    character: crate::utf16::byte_offset_to_utf16_column(&text, span.start),
                },
                end: Position {
                    line: line as u32,
                    character: crate::utf16::byte_offset_to_utf16_column(&text, span.end),
                },
            },
            new_text: new_name.to_string(),
        });

        let Some(clause) = get_clause_range(snapshot, line as u32) else {
            break;
        };
        line = clause.end as usize + 1;
    }
    edits
}

/// Lines a variable rename may touch: the whole entity for a parameter
/// variable renamed in the entity's opening directive, else the term.
fn variable_scope<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    name: &str,
    config: &RefactorConfig,
) -> Option<LineRange> {
    let (_, range) = get_term_range_with_limit(snapshot, line, config.max_scan_lines)?;
    if !is_parameter_variable(name) {
        return Some(range);
    }
    let start_text = snapshot.line_text(range.start as usize)?;
    let opens_entity = directive_keyword(&start_text)
        .and_then(|keyword| directive_kind(&keyword))
        == Some(DirectiveKind::EntityOpening);
    if !opens_entity {
        return Some(range);
    }
    let header = enclosing_entity_with_limit(snapshot, range.start, config.max_scan_lines)?;
    LineRange::new(header.line, find_entity_end(snapshot, header.line))
}

fn variable_edits<S: LineSource + ?Sized>(
    snapshot: &S,
    location: CandidateLocation,
    name: &str,
    new_name: &str,
    config: &RefactorConfig,
) -> Vec<TextEdit> {
    let Some(scope) = variable_scope(snapshot, location.line, name, config) else {
        log::debug!("No term found for variable rename candidate {:?}", location);
        return Vec::new();
    };
    let Some(term) = TermText::collect(snapshot, scope) else {
        return Vec::new();
    };
    log::trace!(
        "Renaming variable {} across lines {}..={}",
        name,
        scope.start,
        scope.end
    );

    MaskedText::new(&term.text)
        .name_occurrences(name)
        .into_iter()
        .map(|start| TextEdit {
            range: Range {
                start: term.position_of(start),
                end: term.position_of(start + name.len()),
            },
            new_text: new_name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::apply_edits;

    fn rename(text: &str, locations: &[CandidateLocation], old: RenameTarget, new: RenameTarget) -> String {
        let doc: Vec<&str> = text.lines().collect();
        let edits = compute_rename_edits(&doc, locations, &old, &new, &RefactorConfig::default());
        apply_edits(text, &edits)
    }

    fn predicate(name: &str, arity: u32) -> RenameTarget {
        RenameTarget::Callable(Indicator::predicate(name, arity))
    }

    fn entity(name: &str, arity: u32) -> RenameTarget {
        RenameTarget::Entity {
            name: name.into(),
            arity,
        }
    }

    #[test]
    fn test_rename_in_scope_directive_multiline() {
        let text = ":- public([\n\tfoo/1,\n\tbar/2\n]).\n";
        let result = rename(text, &[CandidateLocation::line(2)], predicate("bar", 2), predicate("baz", 2));
        assert_eq!(result, ":- public([\n\tfoo/1,\n\tbaz/2\n]).\n");
    }

    #[test]
    fn test_arity_mismatch_in_directive_is_skipped() {
        let text = ":- public(bar/3).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("bar", 2), predicate("baz", 2));
        assert_eq!(result, text);
    }

    #[test]
    fn test_non_terminal_indicator() {
        let text = ":- public(digits//1).\n:- public(digits/1).\n";
        let old = RenameTarget::Callable(Indicator::non_terminal("digits", 1));
        let new = RenameTarget::Callable(Indicator::non_terminal("nums", 1));
        let result = rename(text, &[CandidateLocation::line(0), CandidateLocation::line(1)], old, new);
        assert_eq!(result, ":- public(nums//1).\n:- public(digits/1).\n");
    }

    #[test]
    fn test_rename_clause_calls_on_line() {
        let text = "go :-\n\tfoo(1), foo(2, 3), foo(4).\n";
        let result = rename(text, &[CandidateLocation::line(1)], predicate("foo", 1), predicate("bar", 1));
        assert_eq!(result, "go :-\n\tbar(1), foo(2, 3), bar(4).\n");
    }

    #[test]
    fn test_rename_clause_prefers_location_column() {
        let text = "go :- foo(1), foo(2).\n";
        let result = rename(text, &[CandidateLocation::at(0, 14)], predicate("foo", 1), predicate("bar", 1));
        assert_eq!(result, "go :- foo(1), bar(2).\n");
    }

    #[test]
    fn test_rename_head_after_block_comment() {
        let text = "/* c */ foo(X) :-\n\tbar(X).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("foo", 1), predicate("baz", 1));
        assert_eq!(result, "/* c */ baz(X) :-\n\tbar(X).\n");
    }

    #[test]
    fn test_message_send_is_not_a_call() {
        let text = "go :- foo::run, foo.\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("foo", 0), predicate("bar", 0));
        assert_eq!(result, "go :- foo::run, bar.\n");
    }

    #[test]
    fn test_clause_falls_back_to_indicator() {
        let text = "go :- findall(P, current_op(P, _, foo), _), call(foo/1).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("foo", 1), predicate("bar", 1));
        assert_eq!(result, "go :- findall(P, current_op(P, _, foo), _), call(bar/1).\n");
    }

    #[test]
    fn test_alias_sides() {
        let text = ":- uses(list, [member/2 as elem/2]).\n";
        let loc = [CandidateLocation::line(0)];
        assert_eq!(
            rename(text, &loc, predicate("member", 2), predicate("memberchk", 2)),
            ":- uses(list, [memberchk/2 as elem/2]).\n"
        );
        assert_eq!(
            rename(text, &loc, predicate("elem", 2), predicate("item", 2)),
            ":- uses(list, [member/2 as item/2]).\n"
        );
    }

    #[test]
    fn test_mismatched_alias_is_left_alone() {
        let text = ":- uses(list, [member/2 as elem/3]).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("member", 2), predicate("m", 2));
        assert_eq!(result, text);
    }

    #[test]
    fn test_uses_callable_fallback() {
        let text = ":- uses(list, [member(X, L) as elem(X, L)]).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("elem", 2), predicate("item", 2));
        assert_eq!(result, ":- uses(list, [member(X, L) as item(X, L)]).\n");
    }

    #[test]
    fn test_one_occurrence_per_directive_by_default() {
        let text = ":- dynamic((foo/1, foo/1)).\n";
        let doc: Vec<&str> = text.lines().collect();
        let locations = [CandidateLocation::line(0)];
        let old = predicate("foo", 1);
        let new = predicate("bar", 1);

        let edits = compute_rename_edits(&doc, &locations, &old, &new, &RefactorConfig::default());
        assert_eq!(edits.len(), 1);

        let config = RefactorConfig {
            all_occurrences_per_term: true,
            ..Default::default()
        };
        let edits = compute_rename_edits(&doc, &locations, &old, &new, &config);
        assert_eq!(apply_edits(text, &edits), ":- dynamic((bar/1, bar/1)).\n");
    }

    #[test]
    fn test_unknown_directive_yields_nothing() {
        let text = ":- set_logtalk_flag(foo, on).\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("foo", 0), predicate("bar", 0));
        assert_eq!(result, text);
    }

    #[test]
    fn test_invalid_new_name_rejected() {
        let text = "go :- foo.\n";
        let result = rename(text, &[CandidateLocation::line(0)], predicate("foo", 0), predicate("Bar", 0));
        assert_eq!(result, text);
    }

    #[test]
    fn test_entity_rename_in_directives_and_sends() {
        let text = "\
:- object(client).
	:- uses(store, [get/1]).
	go :- store::get(X), write(X).
:- end_object.
";
        let old = RenameTarget::Entity { name: "store".into(), arity: 0 };
        let new = RenameTarget::Entity { name: "vault".into(), arity: 0 };
        let result = rename(text, &[CandidateLocation::line(1), CandidateLocation::line(2)], old, new);
        assert!(result.contains(":- uses(vault, [get/1])."));
        assert!(result.contains("go :- vault::get(X)"));
    }

    #[test]
    fn test_entity_opening_directive() {
        let text = ":- object(store(_Size_),\n\timplements(storep)).\n:- end_object.\n";
        let old = RenameTarget::Entity { name: "store".into(), arity: 1 };
        let new = RenameTarget::Entity { name: "vault".into(), arity: 1 };
        let result = rename(text, &[CandidateLocation::line(0)], old, new);
        assert!(result.starts_with(":- object(vault(_Size_),"));
    }

    #[test]
    fn test_entity_arity_must_match() {
        let text = "go :- store(1)::get(X).\n";
        let old = RenameTarget::Entity { name: "store".into(), arity: 0 };
        let new = RenameTarget::Entity { name: "vault".into(), arity: 0 };
        assert_eq!(rename(text, &[CandidateLocation::line(0)], old, new), text);
    }

    #[test]
    fn test_qualified_head() {
        assert_eq!(
            qualified_head("\tlogger::log(X) :- write(X)."),
            Some((1..7, "logger".to_string(), 0))
        );
        assert_eq!(
            qualified_head("cache(N)::size(N)."),
            Some((0..5, "cache".to_string(), 1))
        );
        assert_eq!(qualified_head("foo(X) :- bar::baz(X)."), None);
        assert_eq!(qualified_head("% logger::log(x)."), None);
    }

    #[test]
    fn test_multifile_heads_stop_at_other_entity() {
        let text = "\
logger::log(a).
logger::log(b).

logger::log(c) :-
	true.
other::log(d).
logger::log(e).
";
        let old = RenameTarget::Entity { name: "logger".into(), arity: 0 };
        let new = RenameTarget::Entity { name: "journal".into(), arity: 0 };
        let result = rename(text, &[CandidateLocation::line(0)], old, new);
        assert_eq!(
            result,
            "\
journal::log(a).
journal::log(b).

journal::log(c) :-
	true.
other::log(d).
logger::log(e).
"
        );
    }

    #[test]
    fn test_multifile_heads_stop_at_same_name_with_other_arity() {
        let text = "entity::pred(a).\nentity(X)::pred(b).\nentity::pred(c).\n";
        let result = rename(text, &[CandidateLocation::line(0)], entity("entity", 0), entity("entity2", 0));
        assert_eq!(
            result,
            "entity2::pred(a).\nentity(X)::pred(b).\nentity::pred(c).\n"
        );
    }

    #[test]
    fn test_variable_rename_is_term_local() {
        let text = "foo(X) :-\n\tbar(X, 'X').\nbaz(X).\n";
        let old = RenameTarget::Variable { name: "X".into() };
        let new = RenameTarget::Variable { name: "Item".into() };
        let result = rename(text, &[CandidateLocation::at(0, 4)], old, new);
        assert_eq!(result, "foo(Item) :-\n\tbar(Item, 'X').\nbaz(X).\n");
    }

    #[test]
    fn test_anonymous_variable_is_never_renamed() {
        let text = "foo(_, _) :- bar(_).\n";
        let result = rename(
            text,
            &[CandidateLocation::at(0, 4)],
            RenameTarget::Variable { name: "_".into() },
            RenameTarget::Variable { name: "X".into() },
        );
        assert_eq!(result, text);

        let text = "foo(X, _) :- bar(X).\n";
        let result = rename(
            text,
            &[CandidateLocation::at(0, 4)],
            RenameTarget::Variable { name: "X".into() },
            RenameTarget::Variable { name: "_".into() },
        );
        assert_eq!(result, text);
    }

    #[test]
    fn test_parameter_variable_spans_entity() {
        let text = "\
:- object(stack(_Limit_)).
	full(N) :- N >= _Limit_.
	limit(_Limit_).
:- end_object.
size(_Limit_).
";
        let old = RenameTarget::Variable { name: "_Limit_".into() };
        let new = RenameTarget::Variable { name: "_Max_".into() };
        let result = rename(text, &[CandidateLocation::at(0, 16)], old, new);
        assert_eq!(
            result,
            "\
:- object(stack(_Max_)).
	full(N) :- N >= _Max_.
	limit(_Max_).
:- end_object.
size(_Limit_).
"
        );
    }

    #[test]
    fn test_parameter_variable_outside_opening_is_local() {
        let text = ":- object(stack(_Limit_)).\n\tfull(N) :- N >= _Limit_.\n\tlimit(_Limit_).\n:- end_object.\n";
        let old = RenameTarget::Variable { name: "_Limit_".into() };
        let new = RenameTarget::Variable { name: "_Max_".into() };
        let result = rename(text, &[CandidateLocation::line(1)], old, new);
        assert_eq!(
            result,
            ":- object(stack(_Limit_)).\n\tfull(N) :- N >= _Max_.\n\tlimit(_Limit_).\n:- end_object.\n"
        );
    }

    #[test]
    fn test_mixed_target_kinds_yield_nothing() {
        let doc = vec!["foo."];
        let edits = compute_rename_edits(
            &doc,
            &[CandidateLocation::line(0)],
            &predicate("foo", 0),
            &RenameTarget::Variable { name: "X".into() },
            &RefactorConfig::default(),
        );
        assert!(edits.is_empty());
    }
}
