//
// config.rs
//
// Configuration for refactoring edits
//

use anyhow::Context;

/// Largest accepted `tabSize`; larger values keep the default.
pub const MAX_TAB_SIZE: u32 = 16;

/// Whitespace settings used when a directive is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConfig {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: false,
        }
    }
}

/// Refactoring configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorConfig {
    /// Edit every matching occurrence in a directive instead of stopping at
    /// the first one
    pub all_occurrences_per_term: bool,
    /// Cap on lines visited by backward and forward term walks
    pub max_scan_lines: usize,
    /// Cap on matches collected from one term
    pub max_matches_per_term: usize,
    /// Whitespace for reformatted directives
    pub format: FormatConfig,
}

impl Default for RefactorConfig {
    /// Conservative defaults: one edit per directive, 1000-line walks.
    ///
    /// # Examples
    ///
    /// ```
    /// use talon::config::RefactorConfig;
    ///
    /// let cfg = RefactorConfig::default();
    /// assert!(!cfg.all_occurrences_per_term);
    /// assert_eq!(cfg.max_scan_lines, 1000);
    /// ```
    fn default() -> Self {
        Self {
            all_occurrences_per_term: false,
            max_scan_lines: crate::term_boundary::DEFAULT_MAX_SCAN_LINES,
            max_matches_per_term: 256,
            format: FormatConfig::default(),
        }
    }
}

impl RefactorConfig {
    /// Read the `refactor` section of a settings object.
    ///
    /// Returns `None` when the section is absent. Missing or mistyped fields
    /// keep their defaults.
    pub fn from_json(settings: &serde_json::Value) -> Option<Self> {
        let refactor = settings.get("refactor")?;
        let mut config = RefactorConfig::default();

        if let Some(v) = refactor
            .get("allOccurrencesPerTerm")
            .and_then(|v| v.as_bool())
        {
            config.all_occurrences_per_term = v;
        }
        if let Some(v) = refactor
            .get("maxScanLines")
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
        {
            config.max_scan_lines = v;
        }
        if let Some(v) = refactor
            .get("maxMatchesPerTerm")
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
        {
            config.max_matches_per_term = v;
        }

        if let Some(format) = refactor.get("format") {
            match format
                .get("tabSize")
                .and_then(|v| v.as_u64())
                .map(u32::try_from)
            {
                Some(Ok(v)) if (1..=MAX_TAB_SIZE).contains(&v) => config.format.tab_size = v,
                Some(_) => log::warn!(
                    "Ignoring tabSize outside 1..={}; using {}",
                    MAX_TAB_SIZE,
                    config.format.tab_size
                ),
                None => {}
            }
            if let Some(v) = format.get("insertSpaces").and_then(|v| v.as_bool()) {
                config.format.insert_spaces = v;
            }
        }

        log::trace!("Parsed refactor config: {:?}", config);
        Some(config)
    }

    /// Parse settings JSON text. An absent `refactor` section yields the
    /// defaults; malformed JSON is an error.
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let settings: serde_json::Value =
            serde_json::from_str(text).context("Invalid refactor settings JSON")?;
        Ok(Self::from_json(&settings).unwrap_or_default())
    }
}
