//
// planner/matching.rs
//
// Finding reference shapes inside the text of one term.
//
// All offsets are bytes into a `TermText` (the term's lines joined with
// `\n`). The code mask from `scanner::code_starts` keeps matches out of
// quoted text and comments.
//

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::arguments::{argument_spans, call_arguments_at, CallArguments};
use crate::indicator::{parse_indicator, IndicatorKind};
use crate::scanner::{is_identifier_char, scan};

/// A term's text with its code mask.
pub(crate) struct MaskedText<'a> {
    pub text: &'a str,
    code: Vec<bool>,
}

impl<'a> MaskedText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            code: crate::scanner::code_starts(text),
        }
    }

    fn is_code(&self, offset: usize) -> bool {
        self.code.get(offset).copied().unwrap_or(false)
    }

    /// Start offsets of `name` where it stands as a whole token in code.
    ///
    /// A name that begins or ends with an identifier character must not be
    /// glued to another identifier character on that side, so `foo` never
    /// matches inside `foo_bar`, `my_foo`, or `Foo1`.
    pub fn name_occurrences(&self, name: &str) -> Vec<usize> {
        if name.is_empty() {
            return Vec::new();
        }
        let first_is_ident = name.starts_with(is_identifier_char);
        let last_is_ident = name.ends_with(is_identifier_char);

        self.text
            .match_indices(name)
            .map(|(start, _)| start)
            .filter(|&start| self.is_code(start))
            .filter(|&start| {
                let before = self.text[..start].chars().next_back();
                let after = self.text[start + name.len()..].chars().next();
                !(first_is_ident && before.is_some_and(is_identifier_char))
                    && !(last_is_ident && after.is_some_and(is_identifier_char))
            })
            .collect()
    }
}

/// `name/Arity` or `name//Arity` following a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndicatorMatch {
    pub name: Range<usize>,
    pub kind: IndicatorKind,
    pub arity: u32,
    pub arity_span: Range<usize>,
}

fn indicator_tail() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(//?)\s*(\d+)").unwrap())
}

/// Indicator syntax right after the name at `name`.
pub(crate) fn indicator_at(text: &str, name: Range<usize>) -> Option<IndicatorMatch> {
    let rest = &text[name.end..];
    let caps = indicator_tail().captures(rest)?;
    let separator = caps.get(1)?;
    let digits = caps.get(2)?;
    if rest[digits.end()..].starts_with(is_identifier_char) {
        return None;
    }
    let kind = if separator.as_str() == "//" {
        IndicatorKind::NonTerminal
    } else {
        IndicatorKind::Predicate
    };
    let arity = digits.as_str().parse().ok()?;
    Some(IndicatorMatch {
        arity_span: name.end + digits.start()..name.end + digits.end(),
        name,
        kind,
        arity,
    })
}

/// Call or fact syntax at a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallShape {
    /// `name(Args...)`
    Compound(CallArguments),
    /// A bare atom.
    Atom,
}

impl CallShape {
    pub fn arity(&self) -> usize {
        match self {
            CallShape::Compound(call) => call.arity(),
            CallShape::Atom => 0,
        }
    }

    /// Offset just past the call: after `)` for compounds, after the name
    /// for atoms.
    pub fn end(&self, name: &Range<usize>) -> usize {
        match self {
            CallShape::Compound(call) => call.close + 1,
            CallShape::Atom => name.end,
        }
    }
}

/// Callable syntax at `name`.
///
/// A name followed by an indicator separator is not a call. `qux (x)` is
/// the atom `qux` followed by a separate term.
pub(crate) fn callable_at(text: &str, name: &Range<usize>) -> Option<CallShape> {
    if let Some(call) = call_arguments_at(text, name.end) {
        return Some(CallShape::Compound(call));
    }
    if text.as_bytes().get(name.end) == Some(&b'(') {
        // Unbalanced argument list
        return None;
    }
    let next = text[name.end..].trim_start();
    if next.starts_with('/') && indicator_at(text, name.clone()).is_some() {
        return None;
    }
    Some(CallShape::Atom)
}

/// True when `::` follows `offset` (after optional whitespace).
pub(crate) fn followed_by_message_send(text: &str, offset: usize) -> bool {
    text[offset..].trim_start().starts_with("::")
}

/// Byte length of the atom or variable name starting at `start`.
pub(crate) fn name_len_at(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    if rest.starts_with('\'') {
        // Quoted atom: find the closing quote with the scanner.
        let close = scan(rest, 0)
            .skip(1)
            .find(|step| step.after.in_code() && !rest[step.index + 1..].starts_with('\''))
            .map(|step| step.index)?;
        return Some(close + 1);
    }
    let len = rest
        .char_indices()
        .find(|&(_, c)| !is_identifier_char(c))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    (len > 0).then_some(len)
}

/// Which side of an `Original as Alias` element an offset is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AliasCheck {
    /// Not inside an aliased element.
    Plain,
    Aliased {
        original: Range<usize>,
        alias: Range<usize>,
        /// True when the checked offset is on the alias side.
        on_alias: bool,
    },
    /// Sides of different form or arity.
    Ambiguous,
}

impl AliasCheck {
    /// The side the checked offset is not on.
    pub fn other_side(&self) -> Option<Range<usize>> {
        match self {
            AliasCheck::Aliased {
                original,
                alias,
                on_alias,
            } => Some(if *on_alias {
                original.clone()
            } else {
                alias.clone()
            }),
            _ => None,
        }
    }
}

/// Offsets of the innermost `(`, `[`, or `{` enclosing `offset` and of its
/// matching close.
fn enclosing_group(text: &str, offset: usize) -> Option<(usize, usize)> {
    let mut opens: Vec<usize> = Vec::new();
    for step in scan(text, 0) {
        if step.index >= offset {
            break;
        }
        if !step.is_code() {
            continue;
        }
        match step.ch {
            '(' | '[' | '{' => opens.push(step.index),
            ')' | ']' | '}' => {
                opens.pop();
            }
            _ => {}
        }
    }
    let open = *opens.last()?;

    let mut depth = 0usize;
    for step in scan(text, open) {
        if !step.is_code() {
            continue;
        }
        match step.ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, step.index));
                }
            }
            _ => {}
        }
    }
    None
}

/// Offset of a top-level ` as ` operator in `element`.
fn find_as_operator(element: &str) -> Option<usize> {
    scan(element, 0)
        .filter(|step| step.is_code() && step.before.is_top_level() && step.ch == 'a')
        .map(|step| step.index)
        .find(|&i| {
            element[i..].starts_with("as")
                && element[..i].ends_with(char::is_whitespace)
                && element[i + 2..].starts_with(char::is_whitespace)
        })
}

/// Form of one alias side: indicator kind and arity, or callable arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideForm {
    Indicator(IndicatorKind, u32),
    Callable(usize),
}

fn side_form(side: &str) -> Option<SideForm> {
    if let Some(indicator) = parse_indicator(side) {
        return Some(SideForm::Indicator(indicator.kind, indicator.arity));
    }
    let len = name_len_at(side, 0)?;
    if len == side.len() {
        return Some(SideForm::Callable(0));
    }
    let call = call_arguments_at(side, len)?;
    (call.close + 1 == side.len()).then_some(SideForm::Callable(call.arity()))
}

/// Classify the list element around `offset` for `Original as Alias`.
pub(crate) fn alias_check(text: &str, offset: usize) -> AliasCheck {
    let Some((open, close)) = enclosing_group(text, offset) else {
        return AliasCheck::Plain;
    };
    let interior_start = open + 1;
    let interior = &text[interior_start..close];
    let Some(span) = argument_spans(interior)
        .into_iter()
        .find(|span| span.start + interior_start <= offset && offset < span.end + interior_start)
    else {
        return AliasCheck::Plain;
    };

    let element_start = interior_start + span.start;
    let element = &text[element_start..interior_start + span.end];
    let Some(as_index) = find_as_operator(element) else {
        return AliasCheck::Plain;
    };

    let left = element[..as_index].trim_end();
    let right_text = &element[as_index + 2..];
    let right_start = as_index + 2 + (right_text.len() - right_text.trim_start().len());
    let right = right_text.trim();

    match (side_form(left), side_form(right)) {
        (Some(l), Some(r)) if l == r => {
            let original = element_start..element_start + left.len();
            let alias = element_start + right_start..element_start + right_start + right.len();
            AliasCheck::Aliased {
                on_alias: offset >= alias.start,
                original,
                alias,
            }
        }
        _ => {
            log::debug!("Skipping alias element with mismatched sides: {}", element);
            AliasCheck::Ambiguous
        }
    }
}
