//
// term_boundary.rs
//
// Locating the directive, clause, or grammar rule that encloses a line.
//
// Boundaries are found with line-ending heuristics: a term keeps going while
// lines do not end in a period, and a period at top level (outside quotes,
// comments, and open delimiters) ends it. Start lines are recognised either by
// their own shape (`:- ...`, `Head :- ...`, `Head --> ...`) or by the
// previous non-blank line ending a term.
//

use std::borrow::Cow;

use tower_lsp::lsp_types::Position;

use crate::scanner::{scan, scan_with_state, strip_comments, ScanState};
use crate::snapshot::LineSource;
use crate::utf16::byte_offset_to_utf16_column;

/// Iteration cap for backward and forward line walks.
pub const DEFAULT_MAX_SCAN_LINES: usize = 1000;

/// Structural tag of a single line, decided from that line alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Blank,
    Comment,
    /// Starts a term that continues on later lines.
    TermStart,
    /// Starts and ends a term on the same line (`foo :- bar.`, `:- dynamic(a/1).`).
    SingleLineTerm,
    /// Inside a term, not ending it.
    Continuation,
    /// Ends a term (`baz(1).`, `\t\tqux.`, `).`).
    TermEnd,
}

impl LineTag {
    pub fn is_skippable(self) -> bool {
        matches!(self, LineTag::Blank | LineTag::Comment)
    }

    pub fn starts_term(self) -> bool {
        matches!(self, LineTag::TermStart | LineTag::SingleLineTerm)
    }

    pub fn ends_term(self) -> bool {
        matches!(self, LineTag::TermEnd | LineTag::SingleLineTerm)
    }
}

/// Inclusive line range of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    /// Returns `None` for an inverted range.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// What kind of term starts on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Directive,
    Clause,
    GrammarRule,
}

/// Classify one line without looking at its neighbours.
pub fn classify_line(line: &str) -> LineTag {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineTag::Blank;
    }
    if is_comment_line(line, trimmed) {
        return LineTag::Comment;
    }

    let starts = is_term_start_line(line);
    let ends = ends_with_end_token(line);
    match (starts, ends) {
        (true, true) => LineTag::SingleLineTerm,
        (true, false) => LineTag::TermStart,
        (false, true) => LineTag::TermEnd,
        (false, false) => LineTag::Continuation,
    }
}

/// Lines that hold only comment text: `%` comments, and the opening, body,
/// and closing lines of a `/* ... */` block written in the usual style.
fn is_comment_line(line: &str, trimmed: &str) -> bool {
    if trimmed.starts_with('%') || trimmed.starts_with("/*") {
        // Code may follow a closed block comment on the same line.
        return strip_comments(line).trim().is_empty();
    }
    // Body lines of block comments (` * text`, ` */`). A lone `*` operator
    // continuing an arithmetic expression would need an operand after it
    // without a space, which is how it is told apart.
    trimmed == "*" || trimmed.starts_with("* ") || trimmed.starts_with("*/") || trimmed.starts_with("**")
}

/// Directive marker or rule head on this line.
///
/// Recognises `:- ...` and heads of the form `Name(...) :-`, `Name :-`,
/// `Name(...) -->`, including entity-qualified heads (`obj::foo(X) :-`).
/// The neck must sit at the top level of the line.
pub fn is_term_start_line(line: &str) -> bool {
    let code = strip_comments(line);
    let trimmed = code.trim_start();
    if trimmed.starts_with(":-") {
        return true;
    }

    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    if !(first.is_ascii_lowercase() || first == '\'') {
        return false;
    }

    top_level_neck(trimmed).is_some()
}

/// Offset and kind of the first top-level `:-` or `-->` in `text`.
fn top_level_neck(text: &str) -> Option<(usize, TermKind)> {
    for step in scan(text, 0) {
        if !step.is_code() || step.before.is_nested() {
            continue;
        }
        let rest = &text[step.index..];
        if rest.starts_with(":-") {
            return Some((step.index, TermKind::Clause));
        }
        if rest.starts_with("-->") {
            return Some((step.index, TermKind::GrammarRule));
        }
    }
    None
}

/// The last code character on the line is an end token: a `.` that is not
/// part of `=..` and not a character code.
pub fn ends_with_end_token(line: &str) -> bool {
    let mut last = None;
    for step in scan(line, 0) {
        if step.is_code() && !step.ch.is_whitespace() {
            last = Some(step);
        }
    }
    match last {
        Some(step) if step.ch == '.' => !line[..step.index].ends_with("=."),
        _ => false,
    }
}

/// Kind of the term whose first line is `line`.
pub fn term_kind_of_line(line: &str) -> TermKind {
    let code = strip_comments(line);
    let trimmed = code.trim_start();
    if trimmed.starts_with(":-") {
        return TermKind::Directive;
    }
    match top_level_neck(trimmed) {
        Some((_, TermKind::GrammarRule)) => TermKind::GrammarRule,
        _ => TermKind::Clause,
    }
}

/// Find the first line of the term containing `line`.
///
/// ```
/// use talon::term_boundary::find_term_start;
///
/// let lines = vec!["foo(X) :-", "\tbar(X),", "\tbaz(X).", "qux."];
/// assert_eq!(find_term_start(&lines, 2), Some(0));
/// assert_eq!(find_term_start(&lines, 3), Some(3));
/// ```
pub fn find_term_start<S: LineSource + ?Sized>(snapshot: &S, line: u32) -> Option<u32> {
    find_term_start_with_limit(snapshot, line, DEFAULT_MAX_SCAN_LINES)
}

/// [`find_term_start`] with an explicit iteration cap.
///
/// Returns `None` when `line` is out of range, blank, or a comment, or when
/// the walk exceeds `max_lines` without finding a boundary.
pub fn find_term_start_with_limit<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    max_lines: usize,
) -> Option<u32> {
    let idx = line as usize;
    if idx >= snapshot.line_count() {
        return None;
    }

    let tag = snapshot.line_tag(idx);
    if tag.starts_term() {
        return Some(line);
    }
    if tag.is_skippable() {
        return None;
    }

    let mut candidate = idx;
    let mut current = idx;
    let mut iterations = 0;
    while current > 0 {
        if iterations >= max_lines {
            log::warn!(
                "find_term_start: exceeded {} lines walking back from line {}",
                max_lines,
                line
            );
            return None;
        }
        iterations += 1;
        current -= 1;

        let tag = snapshot.line_tag(current);
        if tag.is_skippable() {
            continue;
        }
        if tag.ends_term() {
            // The previous term ended here; ours begins at the next non-blank line.
            return Some(candidate as u32);
        }
        if tag == LineTag::TermStart {
            return Some(current as u32);
        }
        candidate = current;
    }

    Some(candidate as u32)
}

/// Line range of the directive starting at `start_line`.
///
/// The directive ends at the line whose last code character is a top-level
/// period, normally `).` optionally followed by a comment (or just `.` for
/// argument-less directives such as `:- end_object.`). An unterminated
/// directive extends to the last line.
pub fn get_directive_range<S: LineSource + ?Sized>(
    snapshot: &S,
    start_line: u32,
) -> Option<LineRange> {
    get_term_end(snapshot, start_line, DEFAULT_MAX_SCAN_LINES)
}

/// Line range of the clause or grammar rule starting at `start_line`.
///
/// Same terminator rule as directives: the first line ending in a top-level
/// period.
pub fn get_clause_range<S: LineSource + ?Sized>(
    snapshot: &S,
    start_line: u32,
) -> Option<LineRange> {
    get_term_end(snapshot, start_line, DEFAULT_MAX_SCAN_LINES)
}

/// Extend forward from `start_line` to the term terminator.
///
/// The scanner state is carried across lines so a period inside a
/// multi-line quoted atom, a block comment, or an open delimiter never ends
/// the term.
pub fn get_term_end<S: LineSource + ?Sized>(
    snapshot: &S,
    start_line: u32,
    max_lines: usize,
) -> Option<LineRange> {
    let line_count = snapshot.line_count();
    let start = start_line as usize;
    if start >= line_count {
        return None;
    }

    let mut state = ScanState::default();
    for (iterations, idx) in (start..line_count).enumerate() {
        if iterations >= max_lines {
            log::warn!(
                "get_term_end: no terminator within {} lines of line {}",
                max_lines,
                start_line
            );
            return None;
        }
        let text = snapshot.line_text(idx).unwrap_or(Cow::Borrowed(""));

        let mut last_code = None;
        let mut scan = scan_with_state(&text, 0, state);
        for step in scan.by_ref() {
            if step.is_code() && !step.ch.is_whitespace() {
                last_code = Some(step);
            }
        }
        state = scan.state().advance(text.chars().next_back(), '\n', None);

        if let Some(step) = last_code {
            if step.ch == '.'
                && step.before.is_top_level()
                && !text[..step.index].ends_with("=.")
            {
                return LineRange::new(start_line, idx as u32);
            }
        }
    }

    LineRange::new(start_line, line_count.saturating_sub(1) as u32)
}

/// Kind and line range of the term containing `line`.
pub fn get_term_range<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
) -> Option<(TermKind, LineRange)> {
    get_term_range_with_limit(snapshot, line, DEFAULT_MAX_SCAN_LINES)
}

pub fn get_term_range_with_limit<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    max_lines: usize,
) -> Option<(TermKind, LineRange)> {
    let start = find_term_start_with_limit(snapshot, line, max_lines)?;
    let start_text = snapshot.line_text(start as usize)?;
    let kind = term_kind_of_line(&start_text);
    let range = get_term_end(snapshot, start, max_lines)?;
    if !range.contains(line) {
        // The period that ends the term lies above the requested line, so
        // the line belongs to no term we can delimit.
        log::debug!(
            "Line {} falls outside term {}..={} found from it",
            line,
            range.start,
            range.end
        );
        return None;
    }
    Some((kind, range))
}

/// The text of a line range joined with `\n`, with a mapping from byte
/// offsets back to document positions.
#[derive(Debug, Clone)]
pub struct TermText {
    pub range: LineRange,
    pub text: String,
    line_starts: Vec<usize>,
}

impl TermText {
    pub fn collect<S: LineSource + ?Sized>(snapshot: &S, range: LineRange) -> Option<Self> {
        let mut text = String::new();
        let mut line_starts = Vec::with_capacity(range.len());
        for line in range.start..=range.end {
            let line_text = snapshot.line_text(line as usize)?;
            if !line_starts.is_empty() {
                text.push('\n');
            }
            line_starts.push(text.len());
            text.push_str(&line_text);
        }
        Some(Self {
            range,
            text,
            line_starts,
        })
    }

    /// Byte range of a document line within `text`.
    pub fn line_span(&self, line: u32) -> Option<std::ops::Range<usize>> {
        if !self.range.contains(line) {
            return None;
        }
        let i = (line - self.range.start) as usize;
        let start = self.line_starts[i];
        let end = self
            .line_starts
            .get(i + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(start..end)
    }

    /// Document position of a byte offset within `text`.
    pub fn position_of(&self, offset: usize) -> Position {
        let i = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[i];
        let line_end = self
            .line_starts
            .get(i + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line_text = &self.text[line_start..line_end];
        Position {
            line: self.range.start + i as u32,
            character: byte_offset_to_utf16_column(line_text, offset - line_start),
        }
    }

    /// Byte offset within `text` of a document position, if inside the range.
    pub fn offset_of(&self, position: Position) -> Option<usize> {
        let span = self.line_span(position.line)?;
        let line_text = &self.text[span.clone()];
        Some(span.start + crate::utf16::utf16_column_to_byte_offset(line_text, position.character))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), LineTag::Blank);
        assert_eq!(classify_line("\t% comment"), LineTag::Comment);
        assert_eq!(classify_line("/* block"), LineTag::Comment);
        assert_eq!(classify_line(" * body"), LineTag::Comment);
        assert_eq!(classify_line(":- object(foo,"), LineTag::TermStart);
        assert_eq!(classify_line(":- end_object."), LineTag::SingleLineTerm);
        assert_eq!(classify_line("\tfoo(X) :-"), LineTag::TermStart);
        assert_eq!(classify_line("\tfoo(X) :- bar(X)."), LineTag::SingleLineTerm);
        assert_eq!(classify_line("greeting --> [hello],"), LineTag::TermStart);
        assert_eq!(classify_line("\tbaz(1)."), LineTag::TermEnd);
        assert_eq!(classify_line("\t\tbar(X),"), LineTag::Continuation);
        assert_eq!(classify_line(")."), LineTag::TermEnd);
        assert_eq!(classify_line("\tfoo('a.')"), LineTag::Continuation);
        assert_eq!(classify_line("\tX =.."), LineTag::Continuation);
        assert_eq!(classify_line("\tfoo. % done"), LineTag::TermEnd);
    }

    #[test]
    fn test_code_after_block_comment_is_not_a_comment_line() {
        assert_eq!(classify_line("/* c */ foo(X) :-"), LineTag::TermStart);
        assert_eq!(classify_line("/* c */ foo(a)."), LineTag::TermEnd);
        assert_eq!(classify_line("/* a */ /* b */"), LineTag::Comment);
        let doc = lines("/* c */ foo(X) :-\n\tbar(X).\n");
        assert_eq!(find_term_start(&doc, 1), Some(0));
    }

    #[test]
    fn test_neck_inside_parens_is_not_a_head() {
        assert!(!is_term_start_line("\t\tfindall(X, (a :- b), L),"));
    }

    #[test]
    fn test_find_term_start_on_start_line() {
        let doc = lines(":- public(foo/1).\n");
        assert_eq!(find_term_start(&doc, 0), Some(0));
    }

    #[test]
    fn test_find_term_start_walks_back_over_commas() {
        let doc = lines("foo(X) :-\n\tbar(X),\n\n\t% note\n\tbaz(X).\n");
        assert_eq!(find_term_start(&doc, 4), Some(0));
        assert_eq!(find_term_start(&doc, 1), Some(0));
    }

    #[test]
    fn test_find_term_start_after_period() {
        let doc = lines("a(1).\n\n% facts\nb(1).\nb(2).\n");
        assert_eq!(find_term_start(&doc, 3), Some(3));
        assert_eq!(find_term_start(&doc, 4), Some(4));
    }

    #[test]
    fn test_closing_paren_line_is_continuation() {
        let doc = lines("a.\nfact(\n\tone,\n\ttwo\n).\n");
        assert_eq!(find_term_start(&doc, 4), Some(1));
        assert_eq!(find_term_start(&doc, 3), Some(1));
    }

    #[test]
    fn test_multiline_directive_start() {
        let doc = lines("\t:- public([\n\t\tfoo/1,\n\t\tbar/2\n\t]).\n");
        assert_eq!(find_term_start(&doc, 2), Some(0));
        assert_eq!(find_term_start(&doc, 3), Some(0));
    }

    #[test]
    fn test_find_term_start_blank_and_out_of_range() {
        let doc = lines("a.\n\nb.\n");
        assert_eq!(find_term_start(&doc, 1), None);
        assert_eq!(find_term_start(&doc, 9), None);
    }

    #[test]
    fn test_find_term_start_cap() {
        let mut doc = vec!["head(X) :-".to_string()];
        doc.extend((0..50).map(|i| format!("\tgoal{}(X),", i)));
        doc.push("\tdone.".to_string());
        assert_eq!(find_term_start_with_limit(&doc, 51, 10), None);
        assert_eq!(find_term_start_with_limit(&doc, 51, 100), Some(0));
    }

    #[test]
    fn test_get_directive_range_multiline() {
        let doc = lines(":- uses(list, [\n\tappend/3, % joins\n\tmember/2\n]). % end\nfoo.\n");
        assert_eq!(get_directive_range(&doc, 0), LineRange::new(0, 3));
    }

    #[test]
    fn test_get_directive_range_without_arguments() {
        let doc = lines(":- end_object.\n");
        assert_eq!(get_directive_range(&doc, 0), LineRange::new(0, 0));
    }

    #[test]
    fn test_get_clause_range_ignores_quoted_and_nested_periods() {
        let doc = lines("foo(X) :-\n\tX = 'a.\nb.',\n\tbar([1,\n2.]),\n\tbaz.\nnext.\n");
        assert_eq!(get_clause_range(&doc, 0), LineRange::new(0, 5));
    }

    #[test]
    fn test_get_clause_range_unterminated_extends_to_end() {
        let doc = lines("foo(X) :-\n\tbar(X),\n\tbaz(X)\n");
        assert_eq!(get_clause_range(&doc, 0), LineRange::new(0, 2));
    }

    #[test]
    fn test_get_term_range_kinds() {
        let doc = lines(":- dynamic(a/1).\ngreeting --> [hi],\n\tname.\nfoo :- bar.\n");
        assert_eq!(
            get_term_range(&doc, 0),
            Some((TermKind::Directive, LineRange { start: 0, end: 0 }))
        );
        assert_eq!(
            get_term_range(&doc, 2),
            Some((TermKind::GrammarRule, LineRange { start: 1, end: 2 }))
        );
        assert_eq!(
            get_term_range(&doc, 3),
            Some((TermKind::Clause, LineRange { start: 3, end: 3 }))
        );
    }

    #[test]
    fn test_term_text_positions() {
        let doc = lines("x.\nfoo(é,\n\tbar).\n");
        let range = LineRange::new(1, 2).unwrap();
        let term = TermText::collect(&doc, range).unwrap();
        assert_eq!(term.text, "foo(é,\n\tbar).");
        let bar = term.text.find("bar").unwrap();
        assert_eq!(term.position_of(bar), Position { line: 2, character: 1 });
        let comma = term.text.find(',').unwrap();
        assert_eq!(term.position_of(comma), Position { line: 1, character: 5 });
        assert_eq!(term.offset_of(Position { line: 2, character: 1 }), Some(bar));
        assert_eq!(term.line_span(1), Some(0..7));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(LineRange::new(3, 2).is_none());
    }
}
