//! Reference edit applier for tests.
//!
//! Applies LSP `TextEdit`s (UTF-16 columns) to a string the way an editor
//! would: all ranges refer to the original text.

use tower_lsp::lsp_types::{Position, TextEdit};

fn byte_offset(text: &str, line_starts: &[usize], position: Position) -> usize {
    let Some(&start) = line_starts.get(position.line as usize) else {
        return text.len();
    };
    let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    let line = &text[start..line_end];

    let mut units = 0usize;
    for (i, ch) in line.char_indices() {
        if units >= position.character as usize {
            return start + i;
        }
        units += ch.len_utf16();
    }
    line_end
}

/// Apply non-overlapping edits to `text`.
///
/// Panics on overlapping edits, which a correct planner never produces.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut line_starts = vec![0];
    line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));

    let mut spans: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            (
                byte_offset(text, &line_starts, edit.range.start),
                byte_offset(text, &line_starts, edit.range.end),
                edit.new_text.as_str(),
            )
        })
        .collect();
    spans.sort_by_key(|&(start, end, _)| (start, end));
    for pair in spans.windows(2) {
        assert!(
            pair[0].1 <= pair[1].0,
            "overlapping edits at bytes {}..{} and {}..{}",
            pair[0].0,
            pair[0].1,
            pair[1].0,
            pair[1].1
        );
    }

    let mut result = text.to_string();
    for &(start, end, new_text) in spans.iter().rev() {
        result.replace_range(start..end, new_text);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Range;

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextEdit {
        TextEdit {
            range: Range {
                start: Position {
                    line: start.0,
                    character: start.1,
                },
                end: Position {
                    line: end.0,
                    character: end.1,
                },
            },
            new_text: text.to_string(),
        }
    }

    #[test]
    fn test_apply_single_line_edits() {
        let text = "foo(a).\nbar(é, b).\n";
        let edits = vec![edit((1, 6), (1, 7), "c"), edit((0, 0), (0, 3), "baz")];
        assert_eq!(apply_edits(text, &edits), "baz(a).\nbar(é, c).\n");
    }

    #[test]
    fn test_apply_multi_line_edit() {
        let text = "foo(a,\n\tb).\n";
        let edits = vec![edit((0, 4), (1, 1), "")];
        assert_eq!(apply_edits(text, &edits), "foo(b).\n");
    }

    #[test]
    #[should_panic(expected = "overlapping")]
    fn test_overlap_panics() {
        let edits = vec![edit((0, 0), (0, 3), "x"), edit((0, 2), (0, 4), "y")];
        apply_edits("abcdef", &edits);
    }
}
