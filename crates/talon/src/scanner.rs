//
// scanner.rs
//
// Character-level delimiter scanning for Logtalk source text.
//
// The scanner is a fold over `ScanState`: every character advances a small
// `Copy` state value, so callers can carry state across lines (multi-line
// terms) or discard it after a single call. Nothing here allocates except
// `strip_comments` when a comment is actually present.
//

use std::borrow::Cow;
use std::iter::Peekable;
use std::str::CharIndices;

/// Lexical context between two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lexical {
    /// Ordinary code; delimiters and commas are structural here.
    #[default]
    Code,
    /// Inside `'quoted atom'`.
    SingleQuoted,
    /// Inside `"double-quoted text"`.
    DoubleQuoted,
    /// Inside `` `back-quoted text` ``.
    BackQuoted,
    /// Consumed the `0` of `0'c`; the next character is the quote.
    CharCodeQuote,
    /// Consumed `0'`; the next character is the code character itself.
    CharCodeBody,
    /// Consumed `0'\` (or the first quote of `0'''`); one more character follows.
    CharCodeEscape,
    /// After `%`, up to the end of the line.
    LineComment,
    /// Consumed the `/` of `/*`; the next character is the `*`.
    BlockCommentOpen,
    /// Inside `/* ... */`. `star` records whether the previous character was `*`.
    BlockComment { star: bool },
}

/// Scanner state threaded through a character fold.
///
/// Depths saturate at zero. A closing delimiter seen at depth zero sets
/// `underflow`, which callers treat as malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanState {
    pub paren_depth: u32,
    pub bracket_depth: u32,
    pub brace_depth: u32,
    pub lexical: Lexical,
    pub escape_next: bool,
    pub underflow: bool,
}

impl ScanState {
    pub fn in_code(&self) -> bool {
        self.lexical == Lexical::Code
    }

    pub fn in_quotes(&self) -> bool {
        matches!(
            self.lexical,
            Lexical::SingleQuoted | Lexical::DoubleQuoted | Lexical::BackQuoted
        )
    }

    pub fn in_comment(&self) -> bool {
        matches!(
            self.lexical,
            Lexical::LineComment | Lexical::BlockCommentOpen | Lexical::BlockComment { .. }
        )
    }

    /// True when any of the three nesting depths is open.
    pub fn is_nested(&self) -> bool {
        self.paren_depth > 0 || self.bracket_depth > 0 || self.brace_depth > 0
    }

    /// In code with all three depths at zero.
    pub fn is_top_level(&self) -> bool {
        self.in_code() && !self.is_nested()
    }

    /// Fold step: consume `ch` given its neighbours and return the new state.
    ///
    /// `prev` is needed to tell `0'c` apart from an identifier ending in `0`
    /// (`X0'...` never starts a character code), and `next` to recognise the
    /// two-character openers `0'` and `/*`.
    pub fn advance(self, prev: Option<char>, ch: char, next: Option<char>) -> ScanState {
        let mut state = self;
        match self.lexical {
            Lexical::Code => match ch {
                '%' => state.lexical = Lexical::LineComment,
                '/' if next == Some('*') => state.lexical = Lexical::BlockCommentOpen,
                '0' if next == Some('\'') && !prev.is_some_and(is_identifier_char) => {
                    state.lexical = Lexical::CharCodeQuote;
                }
                '\'' => state.lexical = Lexical::SingleQuoted,
                '"' => state.lexical = Lexical::DoubleQuoted,
                '`' => state.lexical = Lexical::BackQuoted,
                '(' => state.paren_depth += 1,
                '[' => state.bracket_depth += 1,
                '{' => state.brace_depth += 1,
                ')' => state.paren_depth = state.close(self.paren_depth),
                ']' => state.bracket_depth = state.close(self.bracket_depth),
                '}' => state.brace_depth = state.close(self.brace_depth),
                _ => {}
            },
            Lexical::SingleQuoted | Lexical::DoubleQuoted | Lexical::BackQuoted => {
                if self.escape_next {
                    state.escape_next = false;
                } else if ch == '\\' {
                    state.escape_next = true;
                } else if Some(ch) == closing_quote(self.lexical) {
                    state.lexical = Lexical::Code;
                }
            }
            Lexical::CharCodeQuote => state.lexical = Lexical::CharCodeBody,
            Lexical::CharCodeBody => {
                // `0'\n` and the doubled-quote form `0'''` are two-character codes.
                state.lexical = if ch == '\\' || (ch == '\'' && next == Some('\'')) {
                    Lexical::CharCodeEscape
                } else {
                    Lexical::Code
                };
            }
            Lexical::CharCodeEscape => state.lexical = Lexical::Code,
            Lexical::LineComment => {
                if ch == '\n' {
                    state.lexical = Lexical::Code;
                }
            }
            Lexical::BlockCommentOpen => state.lexical = Lexical::BlockComment { star: false },
            Lexical::BlockComment { star } => {
                state.lexical = if star && ch == '/' {
                    Lexical::Code
                } else {
                    Lexical::BlockComment { star: ch == '*' }
                };
            }
        }
        state
    }

    fn close(&mut self, depth: u32) -> u32 {
        if depth == 0 {
            self.underflow = true;
            0
        } else {
            depth - 1
        }
    }
}

fn closing_quote(lexical: Lexical) -> Option<char> {
    match lexical {
        Lexical::SingleQuoted => Some('\''),
        Lexical::DoubleQuoted => Some('"'),
        Lexical::BackQuoted => Some('`'),
        _ => None,
    }
}

/// Characters that may continue an unquoted atom or a variable name.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// One consumed character together with the state on either side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStep {
    /// Byte offset of `ch` in the scanned text.
    pub index: usize,
    pub ch: char,
    pub before: ScanState,
    pub after: ScanState,
}

impl ScanStep {
    /// The character is structural code: not part of a quote, comment, or
    /// character-code literal, and does not open one.
    pub fn is_code(&self) -> bool {
        self.before.in_code() && self.after.in_code()
    }
}

/// Iterator over `ScanStep`s. Created by [`scan`] or [`scan_with_state`].
pub struct Scan<'a> {
    chars: Peekable<CharIndices<'a>>,
    offset: usize,
    prev: Option<char>,
    state: ScanState,
}

impl Scan<'_> {
    /// State after the last consumed character.
    pub fn state(&self) -> ScanState {
        self.state
    }
}

impl Iterator for Scan<'_> {
    type Item = ScanStep;

    fn next(&mut self) -> Option<ScanStep> {
        let (i, ch) = self.chars.next()?;
        let next = self.chars.peek().map(|&(_, c)| c);
        let before = self.state;
        let after = before.advance(self.prev, ch, next);
        self.state = after;
        self.prev = Some(ch);
        Some(ScanStep {
            index: self.offset + i,
            ch,
            before,
            after,
        })
    }
}

/// Scan `text` from byte offset `start` with a fresh state.
///
/// A `start` that is out of range or not on a character boundary yields an
/// empty scan.
pub fn scan(text: &str, start: usize) -> Scan<'_> {
    scan_with_state(text, start, ScanState::default())
}

/// Scan `text` from `start`, continuing from a previously carried state.
pub fn scan_with_state(text: &str, start: usize, state: ScanState) -> Scan<'_> {
    let rest = text.get(start..).unwrap_or("");
    let prev = text.get(..start).and_then(|head| head.chars().next_back());
    Scan {
        chars: rest.char_indices().peekable(),
        offset: start,
        prev,
        state,
    }
}

/// Fold a whole string and return the final state.
pub fn scan_state_after(text: &str, state: ScanState) -> ScanState {
    let mut scan = scan_with_state(text, 0, state);
    for _ in scan.by_ref() {}
    scan.state()
}

/// Find the `)` matching the `(` at `open_index`.
///
/// Returns `None` when `open_index` is not a `(` in code (one inside quotes
/// or a comment does not count), when the parenthesis is never closed, or
/// when the match would lie at or beyond `boundary`.
pub fn find_matching_close_paren(
    text: &str,
    open_index: usize,
    boundary: Option<usize>,
) -> Option<usize> {
    if text.as_bytes().get(open_index) != Some(&b'(') {
        return None;
    }
    let prefix = text.get(..open_index)?;
    if !scan_state_after(prefix, ScanState::default()).in_code() {
        return None;
    }
    let limit = boundary.unwrap_or(text.len()).min(text.len());

    for step in scan(text, open_index) {
        if step.index >= limit {
            return None;
        }
        if step.ch == ')' && step.is_code() && step.after.paren_depth == 0 {
            return Some(step.index);
        }
        if step.after.underflow {
            return None;
        }
    }
    None
}

/// Find the `(` matching the `)` at `close_index`.
///
/// Quotes can only be resolved left to right, so this replays the text from
/// the start with a stack of open offsets.
pub fn find_matching_open_paren(text: &str, close_index: usize) -> Option<usize> {
    if text.as_bytes().get(close_index) != Some(&b')') {
        return None;
    }
    let mut opens: Vec<usize> = Vec::new();
    for step in scan(text, 0) {
        if !step.is_code() {
            continue;
        }
        match step.ch {
            '(' => opens.push(step.index),
            ')' => {
                let open = opens.pop();
                if step.index == close_index {
                    return open;
                }
            }
            _ => {}
        }
        if step.index >= close_index {
            break;
        }
    }
    None
}

/// Byte offsets of the commas that separate top-level arguments in `text`.
pub fn top_level_commas(text: &str) -> Vec<usize> {
    scan(text, 0)
        .filter(|step| step.ch == ',' && step.is_code() && !step.before.is_nested())
        .map(|step| step.index)
        .collect()
}

/// Remove `%` and `/* */` comments from a single line, keeping quoted text.
pub fn strip_comments(line: &str) -> Cow<'_, str> {
    let has_comment = scan(line, 0).any(|step| step.after.in_comment());
    if !has_comment {
        return Cow::Borrowed(line);
    }
    let kept: String = scan(line, 0)
        .filter(|step| !step.before.in_comment() && !step.after.in_comment())
        .map(|step| step.ch)
        .collect();
    Cow::Owned(kept)
}

/// The code portion of a line: everything before a `%` that is not inside
/// quotes. Block comments are left alone; see [`strip_comments`].
pub fn strip_line_comment(line: &str) -> &str {
    match scan(line, 0).find(|step| step.after.lexical == Lexical::LineComment) {
        Some(step) => &line[..step.index],
        None => line,
    }
}

/// True when the character at `index` sits in code with every depth closed.
pub fn is_top_level_at(text: &str, index: usize) -> bool {
    scan(text, 0)
        .find(|step| step.index >= index)
        .is_some_and(|step| step.index == index && step.before.is_top_level())
}

/// Per-byte flags: `true` where the character starting at that byte begins
/// in code context. Quoted atoms count from their opening quote.
pub fn code_starts(text: &str) -> Vec<bool> {
    let mut starts = vec![false; text.len()];
    for step in scan(text, 0) {
        starts[step.index] = step.before.in_code();
    }
    starts
}

/// True when `text` contains any comment.
pub fn contains_comment(text: &str) -> bool {
    scan(text, 0).any(|step| step.after.in_comment())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn final_state(text: &str) -> ScanState {
        scan_state_after(text, ScanState::default())
    }

    #[test]
    fn test_depths_are_independent() {
        let state = final_state("foo([a, {b");
        assert_eq!(state.paren_depth, 1);
        assert_eq!(state.bracket_depth, 1);
        assert_eq!(state.brace_depth, 1);
        assert!(!state.is_top_level());
    }

    #[test]
    fn test_quotes_hide_delimiters() {
        assert!(final_state("foo('(', \")\")").is_top_level());
        assert!(final_state("`(`").is_top_level());
    }

    #[test]
    fn test_quote_inside_other_quote_does_not_toggle() {
        let state = final_state("\"it's\"");
        assert!(state.in_code());
        let state = final_state("'say \"hi'");
        assert!(state.in_code());
    }

    #[test]
    fn test_escaped_quote_stays_quoted() {
        let state = final_state(r"'a\'b");
        assert_eq!(state.lexical, Lexical::SingleQuoted);
        let state = final_state(r"'a\\'");
        assert!(state.in_code());
    }

    #[test]
    fn test_char_code_literal_does_not_open_string() {
        assert!(final_state("X = 0'a, Y = 1").in_code());
        assert!(final_state("X = 0'(").is_top_level());
        assert!(final_state(r"X = 0'\n").in_code());
        assert!(final_state("X = 0''', Y").in_code());
    }

    #[test]
    fn test_identifier_ending_in_zero_is_not_char_code() {
        // `foo0'bar'` is the atom foo0 followed by a quoted atom.
        let state = final_state("foo0'bar");
        assert_eq!(state.lexical, Lexical::SingleQuoted);
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let state = final_state("foo(a, % (\nb)");
        assert!(state.is_top_level());
    }

    #[test]
    fn test_block_comment() {
        assert!(final_state("foo(/* ) */ a)").is_top_level());
        // `/*/` does not close the comment it opens
        let state = final_state("/*/ x");
        assert!(matches!(state.lexical, Lexical::BlockComment { .. }));
    }

    #[test]
    fn test_underflow_is_flagged() {
        let state = final_state("a))");
        assert!(state.underflow);
        assert_eq!(state.paren_depth, 0);
    }

    #[test]
    fn test_find_matching_close_paren_simple() {
        let text = "foo(bar(x), 'y)') :- z.";
        assert_eq!(find_matching_close_paren(text, 3, None), Some(16));
        assert_eq!(find_matching_close_paren(text, 7, None), Some(9));
    }

    #[test]
    fn test_find_matching_close_paren_sentinels() {
        assert_eq!(find_matching_close_paren("foo(a", 3, None), None);
        assert_eq!(find_matching_close_paren("foo(a)", 0, None), None);
        assert_eq!(find_matching_close_paren("foo(a)", 99, None), None);
        // The match lies past the boundary
        assert_eq!(find_matching_close_paren("foo(a)", 3, Some(5)), None);
        assert_eq!(find_matching_close_paren("foo(a)", 3, Some(6)), Some(5));
        // Unterminated quote inside the arguments
        assert_eq!(find_matching_close_paren("foo('a)", 3, None), None);
    }

    #[test]
    fn test_open_paren_outside_code_has_no_match() {
        assert_eq!(find_matching_close_paren("x = \"a(b)\"", 6, None), None);
        assert_eq!(find_matching_close_paren("x = 'a(b)'", 6, None), None);
        assert_eq!(find_matching_close_paren("x % f(a)", 5, None), None);
        assert_eq!(find_matching_close_paren("/* f(a) */ g(b)", 4, None), None);
        assert_eq!(find_matching_close_paren("/* f(a) */ g(b)", 12, None), Some(14));
        assert_eq!(find_matching_close_paren("'a' = f(b)", 7, None), Some(9));
    }

    #[test]
    fn test_find_matching_open_paren() {
        let text = "foo(bar(x), ')')";
        assert_eq!(find_matching_open_paren(text, 15), Some(3));
        assert_eq!(find_matching_open_paren(text, 9), Some(7));
        assert_eq!(find_matching_open_paren(text, 13), None);
    }

    #[test]
    fn test_top_level_commas() {
        assert_eq!(top_level_commas("a, f(b, c), [d, e], 'f,g'"), vec![1, 10, 18]);
        assert!(top_level_commas("").is_empty());
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("foo(a). % done"), "foo(a). ");
        assert_eq!(strip_comments("foo('%'). "), "foo('%'). ");
        assert_eq!(strip_comments("/* c */ foo."), " foo.");
        assert!(matches!(strip_comments("plain."), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_line_comment() {
        assert_eq!(strip_line_comment("\tmember/2 % list"), "\tmember/2 ");
        assert_eq!(strip_line_comment("foo('50%')."), "foo('50%').");
        assert_eq!(strip_line_comment("0'% ."), "0'% .");
    }

    #[test]
    fn test_is_top_level_at() {
        let text = "a, f(b, c)";
        assert!(is_top_level_at(text, 1));
        assert!(!is_top_level_at(text, 6));
        assert!(!is_top_level_at(text, 99));
    }

    #[test]
    fn test_scan_from_offset_reports_absolute_indices() {
        let steps: Vec<_> = scan("ab(c)", 2).map(|s| s.index).collect();
        assert_eq!(steps, vec![2, 3, 4]);
        assert_eq!(scan("ab", 7).count(), 0);
    }

    #[test]
    fn test_code_starts_marks_quoted_atom_opening() {
        let flags = code_starts("a 'b' c");
        assert!(flags[0]);
        assert!(flags[2]);
        assert!(!flags[3]);
        assert!(flags[6]);
    }

    // ========================================================================
    // Property Tests
    // ========================================================================

    /// Balanced terms built from atoms, quoted atoms holding stray
    /// delimiters, lists, and nested compounds.
    fn balanced_term() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            "[a-z][a-z0-9_]{0,4}",
            "'[a-z(),\\[\\]]{0,4}'",
            Just("0'(".to_string()),
            Just("\"x)y\"".to_string()),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                (
                    "[a-z][a-z0-9_]{0,4}",
                    prop::collection::vec(inner.clone(), 1..4)
                )
                    .prop_map(|(name, args)| format!("{}({})", name, args.join(", "))),
                prop::collection::vec(inner, 0..4)
                    .prop_map(|items| format!("[{}]", items.join(", "))),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every code `(` found scanning forward agrees with the backward
        /// replay for its match, and the outermost call closes at the end.
        #[test]
        fn property_matching_paren_directions_agree(term in balanced_term()) {
            let text = format!("wrap({})", term);
            prop_assert_eq!(
                find_matching_close_paren(&text, 4, None),
                Some(text.len() - 1)
            );

            let opens: Vec<usize> = scan(&text, 0)
                .filter(|s| s.ch == '(' && s.is_code())
                .map(|s| s.index)
                .collect();
            for open in opens {
                let close = find_matching_close_paren(&text, open, None);
                prop_assert!(close.is_some(), "no close for {} in {}", open, text);
                let close = close.unwrap();
                prop_assert_eq!(find_matching_open_paren(&text, close), Some(open));
            }
        }

        /// A balanced term always scans back to top level without underflow.
        #[test]
        fn property_balanced_term_returns_to_top_level(term in balanced_term()) {
            let state = final_state(&term);
            prop_assert!(state.is_top_level(), "not top level after {}", term);
            prop_assert!(!state.underflow);
        }
    }
}
