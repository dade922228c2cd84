//
// arguments.rs
//
// Argument-list splitting on top-level commas.
//

use crate::scanner::{find_matching_close_paren, scan, top_level_commas};

/// Trimmed byte range of one argument inside the text it was split from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpan {
    pub start: usize,
    pub end: usize,
}

impl ArgumentSpan {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    fn shifted(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// The parenthesised argument list of a call located in some larger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArguments {
    /// Offset of the opening `(`.
    pub open: usize,
    /// Offset of the matching `)`.
    pub close: usize,
    /// Argument spans, in offsets of the text the call was found in.
    pub spans: Vec<ArgumentSpan>,
}

impl CallArguments {
    pub fn arity(&self) -> usize {
        self.spans.len()
    }

    pub fn texts<'a>(&self, source: &'a str) -> Vec<&'a str> {
        self.spans.iter().map(|span| span.text(source)).collect()
    }
}

/// Split `text` on top-level commas into trimmed argument strings.
///
/// Blank input yields no arguments; otherwise the count is the number of
/// top-level commas plus one (an empty argument between two commas is kept).
///
/// ```
/// use talon::arguments::parse_arguments;
///
/// assert_eq!(parse_arguments("append/3, member/2"), vec!["append/3", "member/2"]);
/// assert_eq!(parse_arguments("member(+term, ?list)"), vec!["member(+term, ?list)"]);
/// assert!(parse_arguments("   ").is_empty());
/// ```
pub fn parse_arguments(text: &str) -> Vec<String> {
    argument_spans(text)
        .iter()
        .map(|span| span.text(text).to_string())
        .collect()
}

/// Same split as [`parse_arguments`], returning trimmed byte ranges.
pub fn argument_spans(text: &str) -> Vec<ArgumentSpan> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut segment_start = 0;
    for comma in top_level_commas(text) {
        spans.push(trimmed_span(text, segment_start, comma));
        segment_start = comma + 1;
    }
    spans.push(trimmed_span(text, segment_start, text.len()));
    spans
}

fn trimmed_span(text: &str, start: usize, end: usize) -> ArgumentSpan {
    let segment = &text[start..end];
    let leading = segment.len() - segment.trim_start().len();
    let trimmed_len = segment.trim().len();
    ArgumentSpan {
        start: start + leading,
        end: start + leading + trimmed_len,
    }
}

/// Arguments of the first call in `text`.
///
/// Locates the first `(` in code, finds its match with the scanner and
/// splits the interior. No parenthesis, or an unbalanced one, yields an
/// empty list.
pub fn extract_arguments_from_call(text: &str) -> Vec<String> {
    let Some(open) = scan(text, 0)
        .find(|step| step.ch == '(' && step.is_code())
        .map(|step| step.index)
    else {
        return Vec::new();
    };

    match find_matching_close_paren(text, open, None) {
        Some(close) => parse_arguments(&text[open + 1..close]),
        None => Vec::new(),
    }
}

/// Argument list of a compound whose name ends at `name_end`.
///
/// The `(` must follow the name immediately, as in standard syntax where
/// `foo (X)` is not a compound term. Returns `None` for atoms and for
/// unbalanced argument lists.
pub fn call_arguments_at(text: &str, name_end: usize) -> Option<CallArguments> {
    if text.as_bytes().get(name_end) != Some(&b'(') {
        return None;
    }
    let close = find_matching_close_paren(text, name_end, None)?;
    let interior_start = name_end + 1;
    let spans = argument_spans(&text[interior_start..close])
        .into_iter()
        .map(|span| span.shifted(interior_start))
        .collect();

    Some(CallArguments {
        open: name_end,
        close,
        spans,
    })
}
