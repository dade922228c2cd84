//! Predicate and non-terminal indicators.
//!
//! An indicator names a predicate as `name/Arity` or a grammar non-terminal
//! as `name//Arity`. Names are kept exactly as written, so a quoted atom keeps
//! its quotes and `create_indicator` reproduces the original text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator flavour of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    /// `name/Arity`
    Predicate,
    /// `name//Arity`
    NonTerminal,
}

impl IndicatorKind {
    pub fn separator(self) -> &'static str {
        match self {
            IndicatorKind::Predicate => "/",
            IndicatorKind::NonTerminal => "//",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub arity: u32,
    pub kind: IndicatorKind,
}

impl Indicator {
    pub fn new(name: impl Into<String>, arity: u32, kind: IndicatorKind) -> Self {
        Self {
            name: name.into(),
            arity,
            kind,
        }
    }

    pub fn predicate(name: impl Into<String>, arity: u32) -> Self {
        Self::new(name, arity, IndicatorKind::Predicate)
    }

    pub fn non_terminal(name: impl Into<String>, arity: u32) -> Self {
        Self::new(name, arity, IndicatorKind::NonTerminal)
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.arity, self.kind)
    }

    pub fn with_arity(&self, arity: u32) -> Self {
        Self::new(self.name.clone(), arity, self.kind)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, self.kind.separator(), self.arity)
    }
}

impl FromStr for Indicator {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_indicator(s).ok_or_else(|| anyhow::anyhow!("Invalid indicator: '{}'", s.trim()))
    }
}

/// Parse `name/Arity` or `name//Arity`.
///
/// Whitespace around the separator is tolerated; the two slashes of `//`
/// must be adjacent. Returns `None` for anything that is not a valid atom
/// followed by a non-negative integer arity.
pub fn parse_indicator(text: &str) -> Option<Indicator> {
    let text = text.trim();
    let slash = text.rfind('/')?;
    let arity_text = text[slash + 1..].trim();
    if arity_text.is_empty() || !arity_text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let arity: u32 = arity_text.parse().ok()?;

    let (name, kind) = match text[..slash].strip_suffix('/') {
        Some(name) => (name, IndicatorKind::NonTerminal),
        None => (&text[..slash], IndicatorKind::Predicate),
    };
    let name = name.trim_end();
    if !is_atom(name) {
        return None;
    }

    Some(Indicator::new(name, arity, kind))
}

/// Build the textual form of an indicator.
pub fn create_indicator(name: &str, arity: u32, kind: IndicatorKind) -> String {
    Indicator::new(name, arity, kind).to_string()
}

/// True for an unquoted atom (`foo_bar`), a quoted atom (`'foo bar'`), a
/// symbolic atom (`=..`), or one of the solo atoms `[]`, `{}`, `!`, `;`.
pub fn is_atom(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if first.is_ascii_lowercase() {
        return chars.all(crate::scanner::is_identifier_char);
    }
    if first == '\'' {
        return is_quoted_atom(text);
    }
    if matches!(text, "[]" | "{}" | "!" | ";" | ",") {
        return true;
    }
    text.chars().all(is_symbol_char)
}

fn is_quoted_atom(text: &str) -> bool {
    if text.len() < 2 || !text.ends_with('\'') {
        return false;
    }
    // The closing quote must not be escaped or doubled into the contents.
    let inner = &text[1..text.len() - 1];
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '\'' => {
                if chars.next() != Some('\'') {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '\\' | '^' | '<' | '>' | '=' | '~' | ':' | '.' | '?' | '@' | '#'
            | '&' | '$'
    )
}

/// True for a variable name: uppercase-initial, or `_` followed by
/// identifier characters.
pub fn is_variable(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() || c == '_' => chars.all(crate::scanner::is_identifier_char),
        _ => false,
    }
}

/// True for a parameter variable such as `_Name_`: an uppercase-initial
/// identifier wrapped in single underscores.
pub fn is_parameter_variable(text: &str) -> bool {
    let Some(inner) = text
        .strip_prefix('_')
        .and_then(|rest| rest.strip_suffix('_'))
    else {
        return false;
    };
    let mut chars = inner.chars();
    matches!(chars.next(), Some(c) if c.is_uppercase())
        && chars.all(crate::scanner::is_identifier_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_predicate_indicator() {
        let ind = parse_indicator("append/3").unwrap();
        assert_eq!(ind, Indicator::predicate("append", 3));
    }

    #[test]
    fn test_parse_non_terminal_indicator() {
        let ind = parse_indicator(" digits//1 ").unwrap();
        assert_eq!(ind, Indicator::non_terminal("digits", 1));
    }

    #[test]
    fn test_parse_with_spaces_and_zero_arity() {
        assert_eq!(
            parse_indicator("foo / 0"),
            Some(Indicator::predicate("foo", 0))
        );
    }

    #[test]
    fn test_parse_quoted_and_symbolic_names() {
        assert_eq!(
            parse_indicator("'hello world'/2"),
            Some(Indicator::predicate("'hello world'", 2))
        );
        assert_eq!(parse_indicator("=../2"), Some(Indicator::predicate("=..", 2)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in [
            "", "foo", "foo/", "foo/x", "/2", "Foo/2", "foo/-1", "list::append/3", "foo/ /2",
            "'open/1",
        ] {
            assert_eq!(parse_indicator(text), None, "accepted {:?}", text);
        }
    }

    #[test]
    fn test_create_indicator() {
        assert_eq!(create_indicator("foo", 2, IndicatorKind::Predicate), "foo/2");
        assert_eq!(create_indicator("foo", 2, IndicatorKind::NonTerminal), "foo//2");
    }

    #[test]
    fn test_from_str() {
        let ind: Indicator = "member/2".parse().unwrap();
        assert_eq!(ind.arity, 2);
        assert!("member".parse::<Indicator>().is_err());
    }

    #[test]
    fn test_variable_predicates() {
        assert!(is_variable("X"));
        assert!(is_variable("_Tail"));
        assert!(is_variable("_"));
        assert!(!is_variable("x"));
        assert!(is_parameter_variable("_Name_"));
        assert!(is_parameter_variable("_N1_"));
        assert!(!is_parameter_variable("_name_"));
        assert!(!is_parameter_variable("_Name"));
        assert!(!is_parameter_variable("__"));
    }

    fn atom_name() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-zA-Z0-9_]{0,8}",
            "'[a-z ]{1,6}'",
        ]
    }

    fn indicator_kind() -> impl Strategy<Value = IndicatorKind> {
        prop_oneof![Just(IndicatorKind::Predicate), Just(IndicatorKind::NonTerminal)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// create(parse(i)) == i for every valid indicator text.
        #[test]
        fn property_indicator_round_trip(
            name in atom_name(),
            arity in 0u32..20,
            kind in indicator_kind(),
        ) {
            let text = create_indicator(&name, arity, kind);
            let parsed = parse_indicator(&text);
            prop_assert!(parsed.is_some(), "failed to parse {}", text);
            let parsed = parsed.unwrap();
            prop_assert_eq!(&parsed.name, &name);
            prop_assert_eq!(
                create_indicator(&parsed.name, parsed.arity, parsed.kind),
                text
            );
        }
    }
}
