//! Directive list reformatting.
//!
//! Rewrites the list argument of a scope or uses/alias directive so that
//! each element sits on its own line:
//!
//! ```text
//! :- uses(list, [
//! 	append/3,
//! 	member/2
//! ]).
//! ```
//!
//! Only the bracketed interior is replaced; the directive head and the
//! closing `]).` stay where they are.

use tower_lsp::lsp_types::{Range, TextEdit};

use super::rename::directive_arguments;
use crate::config::{FormatConfig, RefactorConfig};
use crate::context::{classify_term_with_limit, SyntacticRole};
use crate::scanner::contains_comment;
use crate::snapshot::LineSource;
use crate::term_boundary::TermText;

/// Reformat the list in the directive containing `line`.
///
/// Returns `None` when the term is not a scope or uses/alias directive, has
/// no list argument, contains comments, or is already formatted.
pub fn format_directive<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    config: &RefactorConfig,
) -> Option<TextEdit> {
    let context = classify_term_with_limit(snapshot, line, config.max_scan_lines)?;
    if !matches!(
        context.role,
        SyntacticRole::ScopeList | SyntacticRole::UsesAliasList
    ) {
        return None;
    }

    let term = TermText::collect(snapshot, context.range)?;
    if contains_comment(&term.text) {
        log::debug!(
            "Not reformatting directive at line {}: it contains comments",
            context.range.start
        );
        return None;
    }

    let arguments = directive_arguments(&term.text)?;
    let list = arguments.spans.iter().rev().find(|span| {
        let text = span.text(&term.text);
        text.starts_with('[') && text.ends_with(']')
    })?;
    let open = list.start;
    let close = list.end - 1;

    let elements = crate::arguments::argument_spans(&term.text[open + 1..close]);
    if elements.is_empty() {
        return None;
    }

    let first_line = snapshot.line_text(context.range.start as usize)?;
    let base_column = indentation_width(&first_line, &config.format);
    let element_indent = generate_whitespace(
        base_column.saturating_add(config.format.tab_size),
        &config.format,
    );
    let closing_indent = generate_whitespace(base_column, &config.format);

    let interior = &term.text[open + 1..close];
    let mut new_text = String::from("\n");
    for (i, element) in elements.iter().enumerate() {
        new_text.push_str(&element_indent);
        new_text.push_str(element.text(interior));
        if i + 1 < elements.len() {
            new_text.push(',');
        }
        new_text.push('\n');
    }
    new_text.push_str(&closing_indent);

    if new_text == interior {
        return None;
    }

    Some(TextEdit {
        range: Range {
            start: term.position_of(open + 1),
            end: term.position_of(close),
        },
        new_text,
    })
}

/// Visual width of a line's leading whitespace, with tabs expanded to
/// `tab_size` columns.
fn indentation_width(line: &str, config: &FormatConfig) -> u32 {
    let tab_size = config.tab_size.max(1);
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .fold(0, |column, c| {
            if c == '\t' {
                (column / tab_size + 1).saturating_mul(tab_size)
            } else {
                column.saturating_add(1)
            }
        })
}

/// Whitespace reaching `target_column`: spaces only when `insert_spaces`,
/// otherwise tabs padded with spaces for alignment.
fn generate_whitespace(target_column: u32, config: &FormatConfig) -> String {
    if config.insert_spaces {
        " ".repeat(target_column as usize)
    } else {
        let tab_size = config.tab_size.max(1);
        let tabs = target_column / tab_size;
        let spaces = target_column % tab_size;
        let mut result = "\t".repeat(tabs as usize);
        result.push_str(&" ".repeat(spaces as usize));
        result
    }
}
