//
// snapshot.rs
//
// Read-only, line-addressable views of a document.
//
// Everything in the engine reads text through `LineSource`, so callers can
// hand over a `ropey::Rope`, a plain string, or a vector of lines. The
// `DocumentSnapshot` type adds a lazily built per-line tag cache that the
// backward term-start walk consults instead of re-classifying lines.
//

use std::borrow::Cow;
use std::sync::OnceLock;

use ropey::Rope;

use crate::term_boundary::{classify_line, LineTag};

/// A read-only document addressed by zero-based line number.
///
/// Line text excludes the line terminator.
pub trait LineSource {
    fn line_count(&self) -> usize;

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;

    /// Structural tag of a line. Out-of-range lines are blank.
    fn line_tag(&self, line: usize) -> LineTag {
        self.line_text(line)
            .map(|text| classify_line(&text))
            .unwrap_or(LineTag::Blank)
    }
}

fn strip_line_terminator(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

impl LineSource for Rope {
    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        if line >= self.len_lines() {
            return None;
        }
        let slice = self.line(line);
        match slice.as_str() {
            Some(text) => Some(Cow::Borrowed(
                text.strip_suffix('\n')
                    .map(|t| t.strip_suffix('\r').unwrap_or(t))
                    .unwrap_or(text),
            )),
            None => Some(Cow::Owned(strip_line_terminator(slice.to_string()))),
        }
    }
}

impl LineSource for str {
    fn line_count(&self) -> usize {
        self.lines().count()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.lines().nth(line).map(Cow::Borrowed)
    }
}

impl LineSource for String {
    fn line_count(&self) -> usize {
        self.as_str().line_count()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.as_str().line_text(line)
    }
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.get(line).map(|text| Cow::Borrowed(text.as_ref()))
    }
}

impl<S: AsRef<str>> LineSource for Vec<S> {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.as_slice().line_text(line)
    }
}

/// Document text plus a lazily built line tag cache.
///
/// The cache is computed on first use and dropped by [`replace_text`], so a
/// snapshot never serves tags for text it no longer holds.
///
/// [`replace_text`]: DocumentSnapshot::replace_text
#[derive(Debug, Default)]
pub struct DocumentSnapshot {
    contents: Rope,
    tags: OnceLock<Vec<LineTag>>,
}

impl DocumentSnapshot {
    pub fn new(text: &str) -> Self {
        Self {
            contents: Rope::from_str(text),
            tags: OnceLock::new(),
        }
    }

    pub fn from_rope(contents: Rope) -> Self {
        Self {
            contents,
            tags: OnceLock::new(),
        }
    }

    pub fn contents(&self) -> &Rope {
        &self.contents
    }

    /// Swap in new text and invalidate the tag cache.
    pub fn replace_text(&mut self, text: &str) {
        self.contents = Rope::from_str(text);
        self.tags.take();
    }

    fn tags(&self) -> &[LineTag] {
        self.tags.get_or_init(|| {
            log::trace!(
                "Building line tag cache for {} lines",
                self.contents.len_lines()
            );
            (0..self.contents.len_lines())
                .map(|line| {
                    self.contents
                        .line_text(line)
                        .map(|text| classify_line(&text))
                        .unwrap_or(LineTag::Blank)
                })
                .collect()
        })
    }
}

impl LineSource for DocumentSnapshot {
    fn line_count(&self) -> usize {
        self.contents.len_lines()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.contents.line_text(line)
    }

    fn line_tag(&self, line: usize) -> LineTag {
        self.tags().get(line).copied().unwrap_or(LineTag::Blank)
    }
}
