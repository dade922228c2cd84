//
// context.rs
//
// Syntactic role of a term: which directive kind it is, or a clause.
//

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::arguments::{call_arguments_at, extract_arguments_from_call};
use crate::scanner::{is_identifier_char, strip_comments};
use crate::snapshot::LineSource;
use crate::term_boundary::{
    get_term_end, get_term_range_with_limit, LineRange, TermKind, TermText,
    DEFAULT_MAX_SCAN_LINES,
};

/// Directive families that differ in how references appear inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `public/1`, `dynamic/1`, ...: a list or conjunction of indicators.
    ScopeList,
    /// `uses/2`, `alias/2`, `use_module/2`: indicators or callable
    /// templates, optionally `Original as Alias`.
    UsesAliasList,
    /// `info/2`, `annotation/1`: one indicator as the first argument.
    SingleIndicator,
    /// `mode/2`, `meta_predicate/1`, ...: a callable template.
    CallableForm,
    /// `object/N`, `protocol/N`, `category/N`.
    EntityOpening,
}

impl DirectiveKind {
    pub fn permits_callable_form(self) -> bool {
        matches!(
            self,
            DirectiveKind::UsesAliasList | DirectiveKind::CallableForm
        )
    }

    pub fn permits_indicator_form(self) -> bool {
        matches!(
            self,
            DirectiveKind::ScopeList
                | DirectiveKind::UsesAliasList
                | DirectiveKind::SingleIndicator
        )
    }
}

/// Ordered rule table mapping directive keywords to kinds.
const DIRECTIVE_RULES: &[(DirectiveKind, &[&str])] = &[
    (
        DirectiveKind::ScopeList,
        &[
            "public",
            "protected",
            "private",
            "dynamic",
            "discontiguous",
            "multifile",
            "synchronized",
            "coinductive",
        ],
    ),
    (
        DirectiveKind::UsesAliasList,
        &["uses", "alias", "use_module"],
    ),
    (DirectiveKind::SingleIndicator, &["info", "annotation"]),
    (
        DirectiveKind::CallableForm,
        &[
            "mode",
            "mode_non_terminal",
            "meta_predicate",
            "meta_non_terminal",
            "initialization",
            "if",
            "elif",
        ],
    ),
    (
        DirectiveKind::EntityOpening,
        &["object", "protocol", "category"],
    ),
];

/// Look up a directive keyword in the rule table.
pub fn directive_kind(keyword: &str) -> Option<DirectiveKind> {
    DIRECTIVE_RULES
        .iter()
        .find(|(_, keywords)| keywords.contains(&keyword))
        .map(|(kind, _)| *kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityKind {
    Object,
    Protocol,
    Category,
    #[default]
    None,
}

impl EntityKind {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "object" | "end_object" => EntityKind::Object,
            "protocol" | "end_protocol" => EntityKind::Protocol,
            "category" | "end_category" => EntityKind::Category,
            _ => EntityKind::None,
        }
    }
}

/// Closed set of roles a referencing term can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntacticRole {
    ScopeList,
    UsesAliasList,
    SingleIndicator,
    CallableForm,
    EntityOpening,
    /// A clause or grammar rule: references are calls, facts, or heads.
    ClauseCall,
}

impl SyntacticRole {
    pub fn directive_kind(self) -> Option<DirectiveKind> {
        match self {
            SyntacticRole::ScopeList => Some(DirectiveKind::ScopeList),
            SyntacticRole::UsesAliasList => Some(DirectiveKind::UsesAliasList),
            SyntacticRole::SingleIndicator => Some(DirectiveKind::SingleIndicator),
            SyntacticRole::CallableForm => Some(DirectiveKind::CallableForm),
            SyntacticRole::EntityOpening => Some(DirectiveKind::EntityOpening),
            SyntacticRole::ClauseCall => None,
        }
    }
}

impl From<DirectiveKind> for SyntacticRole {
    fn from(kind: DirectiveKind) -> Self {
        match kind {
            DirectiveKind::ScopeList => SyntacticRole::ScopeList,
            DirectiveKind::UsesAliasList => SyntacticRole::UsesAliasList,
            DirectiveKind::SingleIndicator => SyntacticRole::SingleIndicator,
            DirectiveKind::CallableForm => SyntacticRole::CallableForm,
            DirectiveKind::EntityOpening => SyntacticRole::EntityOpening,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveContext {
    pub kind: DirectiveKind,
    pub entity_kind: EntityKind,
    pub keyword: String,
}

/// Role and extent of the term around a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermContext {
    pub role: SyntacticRole,
    pub range: LineRange,
    /// Directive keyword; `None` for clauses and grammar rules.
    pub keyword: Option<String>,
    pub entity_kind: EntityKind,
}

impl TermContext {
    pub fn is_directive(&self) -> bool {
        self.role != SyntacticRole::ClauseCall
    }

    pub fn directive(&self) -> Option<DirectiveContext> {
        Some(DirectiveContext {
            kind: self.role.directive_kind()?,
            entity_kind: self.entity_kind,
            keyword: self.keyword.clone()?,
        })
    }
}

fn keyword_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*:-\s*([a-z][a-zA-Z0-9_]*)").unwrap())
}

/// Head keyword of a directive line (`:- public(` → `public`).
pub fn directive_keyword(line: &str) -> Option<String> {
    let code = strip_comments(line);
    keyword_pattern()
        .captures(&code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Classify the term containing `line`.
///
/// Returns `None` when the term boundaries cannot be determined or when a
/// directive's keyword is not one the engine knows how to edit.
pub fn classify_term<S: LineSource + ?Sized>(snapshot: &S, line: u32) -> Option<TermContext> {
    classify_term_with_limit(snapshot, line, DEFAULT_MAX_SCAN_LINES)
}

pub fn classify_term_with_limit<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    max_lines: usize,
) -> Option<TermContext> {
    let (term_kind, range) = get_term_range_with_limit(snapshot, line, max_lines)?;

    if term_kind != TermKind::Directive {
        return Some(TermContext {
            role: SyntacticRole::ClauseCall,
            range,
            keyword: None,
            entity_kind: enclosing_entity_with_limit(snapshot, range.start, max_lines)
                .map(|entity| entity.kind)
                .unwrap_or_default(),
        });
    }

    let start_text = snapshot.line_text(range.start as usize)?;
    let keyword = directive_keyword(&start_text)?;
    let Some(kind) = directive_kind(&keyword) else {
        log::debug!(
            "Unrecognised directive '{}' at line {}; leaving it alone",
            keyword,
            range.start
        );
        return None;
    };

    let entity_kind = if kind == DirectiveKind::EntityOpening {
        EntityKind::from_keyword(&keyword)
    } else {
        enclosing_entity_with_limit(snapshot, range.start, max_lines)
            .map(|entity| entity.kind)
            .unwrap_or_default()
    };

    log::trace!(
        "Line {} is in a {:?} directive '{}' (lines {}..={})",
        line,
        kind,
        keyword,
        range.start,
        range.end
    );
    Some(TermContext {
        role: kind.into(),
        range,
        keyword: Some(keyword),
        entity_kind,
    })
}

/// The opening directive of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHeader {
    pub kind: EntityKind,
    pub name: String,
    /// Number of entity parameters (`foo(_A_, _B_)` has two).
    pub arity: u32,
    /// First line of the opening directive.
    pub line: u32,
    pub range: LineRange,
}

/// Name and parameter count of an entity identifier such as `foo` or
/// `foo(_X_, _Y_)`.
pub fn entity_identifier(text: &str) -> Option<(String, u32)> {
    let text = text.trim();
    let name_end = text
        .char_indices()
        .find(|&(_, c)| !is_identifier_char(c))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let name = &text[..name_end];
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    if name_end == text.len() {
        return Some((name.to_string(), 0));
    }
    let call = call_arguments_at(text, name_end)?;
    if call.close + 1 != text.len() {
        return None;
    }
    Some((name.to_string(), call.arity() as u32))
}

/// Parse the entity opening directive starting at `line`.
pub fn parse_entity_header<S: LineSource + ?Sized>(snapshot: &S, line: u32) -> Option<EntityHeader> {
    let start_text = snapshot.line_text(line as usize)?;
    let keyword = directive_keyword(&start_text)?;
    if directive_kind(&keyword) != Some(DirectiveKind::EntityOpening) {
        return None;
    }
    let range = get_term_end(snapshot, line, DEFAULT_MAX_SCAN_LINES)?;
    let term = TermText::collect(snapshot, range)?;
    let code = strip_comments(&term.text);
    let args = extract_arguments_from_call(&code);
    let (name, arity) = entity_identifier(args.first()?)?;

    Some(EntityHeader {
        kind: EntityKind::from_keyword(&keyword),
        name,
        arity,
        line,
        range,
    })
}

fn is_entity_end(keyword: &str) -> bool {
    matches!(keyword, "end_object" | "end_protocol" | "end_category")
}

fn line_keyword<S: LineSource + ?Sized>(snapshot: &S, line: usize) -> Option<String> {
    let text: Cow<'_, str> = snapshot.line_text(line)?;
    directive_keyword(&text)
}

/// Directive keyword of `line`, looked up only on lines that start a term.
fn directive_keyword_at<S: LineSource + ?Sized>(snapshot: &S, line: usize) -> Option<String> {
    if !snapshot.line_tag(line).starts_term() {
        return None;
    }
    line_keyword(snapshot, line)
}

/// The nearest entity opening directive above (or at) `line` that is not
/// closed before `line`.
///
/// Entities do not nest, so the first opening or closing directive met on
/// the way up decides the answer.
pub fn enclosing_entity<S: LineSource + ?Sized>(snapshot: &S, line: u32) -> Option<EntityHeader> {
    enclosing_entity_with_limit(snapshot, line, DEFAULT_MAX_SCAN_LINES)
}

/// [`enclosing_entity`] walking back at most `max_lines` lines.
pub fn enclosing_entity_with_limit<S: LineSource + ?Sized>(
    snapshot: &S,
    line: u32,
    max_lines: usize,
) -> Option<EntityHeader> {
    let top = (line as usize).min(snapshot.line_count().checked_sub(1)?);
    for (visited, current) in (0..=top).rev().enumerate() {
        if visited >= max_lines {
            log::warn!(
                "enclosing_entity: no entity directive within {} lines above line {}",
                max_lines,
                line
            );
            return None;
        }
        let Some(keyword) = directive_keyword_at(snapshot, current) else {
            continue;
        };
        if is_entity_end(&keyword) {
            if current == line as usize {
                // The closing directive itself still belongs to the entity.
                continue;
            }
            return None;
        }
        if directive_kind(&keyword) == Some(DirectiveKind::EntityOpening) {
            return parse_entity_header(snapshot, current as u32);
        }
    }
    None
}

/// Line of the `:- end_*` directive closing the entity opened at
/// `opening_line`. An unclosed entity ends at the last line.
pub fn find_entity_end<S: LineSource + ?Sized>(snapshot: &S, opening_line: u32) -> u32 {
    let line_count = snapshot.line_count();
    for current in (opening_line as usize + 1)..line_count {
        if let Some(keyword) = directive_keyword_at(snapshot, current) {
            if is_entity_end(&keyword) {
                return current as u32;
            }
        }
    }
    line_count.saturating_sub(1) as u32
}
