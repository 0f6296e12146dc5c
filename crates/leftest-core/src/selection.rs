//! Global include/exclude tag selection and flag resolution.

use std::collections::BTreeSet;

use leftest_protocols::Flag;

/// Environment variable holding the tag selection.
pub const TAGS_ENV_VAR: &str = "LEFTEST_TAGS";

pub const ONLY_TAG: &str = "only";
pub const SKIP_TAG: &str = "skip";
pub const TODO_TAG: &str = "todo";

/// Prefix marking an excluded tag in a selection string.
pub const EXCLUDE_PREFIX: char = '^';

/// Tags to include and exclude, usually from `LEFTEST_TAGS`.
///
/// A selection string is a comma or whitespace separated list of tokens.
/// Bare tokens are included, `^`-prefixed tokens are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a selection string such as `"a,b,^c"`.
    pub fn parse(spec: &str) -> Self {
        Self::from_tokens([spec])
    }

    /// Build from several selection strings.
    pub fn from_tokens<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::default();
        for spec in specs {
            for token in split_tokens(spec.as_ref()) {
                match token.strip_prefix(EXCLUDE_PREFIX) {
                    Some("") => {}
                    Some(name) => {
                        selection.exclude.insert(name.to_string());
                    }
                    None => {
                        selection.include.insert(token.to_string());
                    }
                }
            }
        }
        selection
    }

    /// Selection from `LEFTEST_TAGS`, empty when unset.
    pub fn from_env() -> Self {
        std::env::var(TAGS_ENV_VAR)
            .map(|spec| Self::parse(&spec))
            .unwrap_or_default()
    }

    pub fn is_included(&self, tag: &str) -> bool {
        self.include.contains(tag)
    }

    pub fn is_excluded(&self, tag: &str) -> bool {
        self.exclude.contains(tag)
    }

    pub fn includes(&self) -> &BTreeSet<String> {
        &self.include
    }

    pub fn excludes(&self) -> &BTreeSet<String> {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Resolve the flag of a node from its effective tags.
    ///
    /// Exclusion wins over `only`, which wins over `skip`/`todo`. With
    /// `no_default_exclude` set, a node is not excluded merely for lacking
    /// an included tag; features use this when a descendant survives.
    pub fn flag_for(&self, tags: &BTreeSet<String>, no_default_exclude: bool) -> Flag {
        let excluded = tags.iter().any(|t| self.is_excluded(t));
        let not_included = !no_default_exclude
            && !self.include.is_empty()
            && !tags.iter().any(|t| self.is_included(t));

        if excluded || not_included {
            Flag::Exclude
        } else if tags.contains(ONLY_TAG) {
            Flag::Only
        } else if tags.contains(SKIP_TAG) || tags.contains(TODO_TAG) {
            Flag::Skip
        } else {
            Flag::Default
        }
    }
}

/// Split a selection string into non-empty tokens.
pub fn split_tokens(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
