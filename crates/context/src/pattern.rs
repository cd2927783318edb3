//! Glob-style URL pattern matching.
//!
//! A pattern is literal text where `*` stands for "zero or more of any
//! character". Matching is case-insensitive and unanchored, and is tried
//! against both the hostname and the full URL (without fragment).

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

/// A user-authored URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn compile(&self) -> CompiledPattern {
        CompiledPattern::compile(&self.0)
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pattern compiled into a case-insensitive regex.
///
/// Compilation never fails from the caller's point of view: blank patterns
/// and patterns the regex engine rejects become matchers that match nothing.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Option<Regex>,
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        if pattern.trim().is_empty() {
            return Self { regex: None };
        }

        let source = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "pattern failed to compile, treating as no-match");
                None
            }
        };

        Self { regex }
    }

    /// Test against an already parsed URL.
    pub fn matches_url(&self, url: &ParsedUrl) -> bool {
        let Some(regex) = &self.regex else {
            return false;
        };
        regex.is_match(&url.hostname) || regex.is_match(&url.normalized)
    }
}

/// The two strings a pattern is tested against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Lowercased host, empty for host-less URLs.
    pub hostname: String,
    /// Scheme, host, path and query. The fragment is dropped.
    pub normalized: String,
}

impl ParsedUrl {
    /// Parse an absolute URL. Relative or malformed input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut url = Url::parse(raw.trim()).ok()?;
        url.set_fragment(None);
        Some(Self {
            hostname: url.host_str().unwrap_or_default().to_string(),
            normalized: url.into(),
        })
    }
}

/// Whether `pattern` matches `url`. Unparseable URLs never match.
pub fn matches(pattern: &str, url: &str) -> bool {
    match ParsedUrl::parse(url) {
        Some(parsed) => CompiledPattern::compile(pattern).matches_url(&parsed),
        None => false,
    }
}

/// Whether any of `patterns` matches `url`. Unparseable URLs never match.
pub fn matches_any<P: AsRef<str>>(patterns: &[P], url: &str) -> bool {
    let Some(parsed) = ParsedUrl::parse(url) else {
        return false;
    };
    patterns
        .iter()
        .any(|p| CompiledPattern::compile(p.as_ref()).matches_url(&parsed))
}
