//! Allow/deny rule lists and their curated defaults.

use crate::pattern::{CompiledPattern, ParsedUrl, Pattern};
use serde::{Deserialize, Serialize};

/// Patterns that put the pet in a focused mood by default.
pub const DEFAULT_ALLOW: &[&str] = &[
    "*.edu",
    "*.edu.cn",
    "scholar.google.com",
    "arxiv.org",
    "pubmed.ncbi.nlm.nih.gov",
    "stackoverflow.com",
    "github.com",
    "developer.mozilla.org",
    "docs.python.org",
    "leetcode.com",
    "notion.so",
    "obsidian.md",
];

/// Patterns that make the pet distracted by default.
pub const DEFAULT_DENY: &[&str] = &[
    "*.netflix.com",
    "*.tiktok.com",
    "*.douyin.com",
    // watch pages only, so tutorial channels stay neutral
    "youtube.com/watch*",
    "bilibili.com",
    "*.twitch.tv",
    "weibo.com",
    "tieba.baidu.com",
    "*.game*",
    "steamcommunity.com",
];

/// Which of the two lists an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleList {
    Allow,
    Deny,
}

impl RuleList {
    /// Storage key holding this list.
    pub fn key(&self) -> &'static str {
        match self {
            RuleList::Allow => "allow",
            RuleList::Deny => "deny",
        }
    }
}

impl std::fmt::Display for RuleList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The pair of ordered pattern lists.
///
/// Entries are identified by value. Order is kept for display but has no
/// effect on matching.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub allow: Vec<Pattern>,
    #[serde(default)]
    pub deny: Vec<Pattern>,
}

impl RuleSet {
    pub fn new(allow: Vec<Pattern>, deny: Vec<Pattern>) -> Self {
        Self { allow, deny }
    }

    /// The curated lists shipped with the extension.
    pub fn defaults() -> Self {
        Self {
            allow: DEFAULT_ALLOW.iter().map(|p| Pattern::from(*p)).collect(),
            deny: DEFAULT_DENY.iter().map(|p| Pattern::from(*p)).collect(),
        }
    }

    pub fn list(&self, list: RuleList) -> &[Pattern] {
        match list {
            RuleList::Allow => &self.allow,
            RuleList::Deny => &self.deny,
        }
    }

    fn list_mut(&mut self, list: RuleList) -> &mut Vec<Pattern> {
        match list {
            RuleList::Allow => &mut self.allow,
            RuleList::Deny => &mut self.deny,
        }
    }

    /// Append a trimmed pattern. Returns false for blank input or duplicates.
    pub fn add(&mut self, list: RuleList, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return false;
        }
        let entries = self.list_mut(list);
        if entries.iter().any(|p| p.as_str() == trimmed) {
            return false;
        }
        entries.push(Pattern::from(trimmed));
        true
    }

    /// Remove every entry equal to `raw` (after trimming). Returns whether
    /// anything was removed.
    pub fn remove(&mut self, list: RuleList, raw: &str) -> bool {
        let trimmed = raw.trim();
        let entries = self.list_mut(list);
        let before = entries.len();
        entries.retain(|p| p.as_str() != trimmed);
        entries.len() != before
    }

    /// Compile every pattern once for repeated matching.
    pub fn compile(&self) -> CompiledRules {
        CompiledRules {
            allow: self.allow.iter().map(Pattern::compile).collect(),
            deny: self.deny.iter().map(Pattern::compile).collect(),
        }
    }
}

/// A `RuleSet` with every pattern already compiled.
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    allow: Vec<CompiledPattern>,
    deny: Vec<CompiledPattern>,
}

impl CompiledRules {
    pub fn allows(&self, url: &ParsedUrl) -> bool {
        self.allow.iter().any(|p| p.matches_url(url))
    }

    pub fn denies(&self, url: &ParsedUrl) -> bool {
        self.deny.iter().any(|p| p.matches_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_populated() {
        let rules = RuleSet::defaults();
        assert_eq!(rules.allow.len(), DEFAULT_ALLOW.len());
        assert!(rules.deny.contains(&Pattern::from("youtube.com/watch*")));
    }

    #[test]
    fn test_add_trims_and_dedupes() {
        let mut rules = RuleSet::default();
        assert!(rules.add(RuleList::Allow, "  docs.rs "));
        assert!(!rules.add(RuleList::Allow, "docs.rs"));
        assert!(!rules.add(RuleList::Allow, "   "));
        assert_eq!(rules.allow, vec![Pattern::from("docs.rs")]);
        assert!(rules.deny.is_empty());
    }

    #[test]
    fn test_same_pattern_may_live_in_both_lists() {
        let mut rules = RuleSet::default();
        assert!(rules.add(RuleList::Allow, "youtube.com/watch*"));
        assert!(rules.add(RuleList::Deny, "youtube.com/watch*"));
    }

    #[test]
    fn test_remove_by_value() {
        let mut rules = RuleSet::defaults();
        assert!(rules.remove(RuleList::Deny, "bilibili.com"));
        assert!(!rules.remove(RuleList::Deny, "bilibili.com"));
        assert!(!rules.deny.contains(&Pattern::from("bilibili.com")));
        assert_eq!(rules.allow.len(), DEFAULT_ALLOW.len());
    }

    #[test]
    fn test_serde_shape() {
        let rules = RuleSet::new(vec!["a.com".into()], vec![]);
        let json = serde_json::to_value(&rules).unwrap();
        assert_eq!(json, serde_json::json!({"allow": ["a.com"], "deny": []}));
    }

    #[test]
    fn test_compiled_rules() {
        let compiled = RuleSet::defaults().compile();
        let netflix = ParsedUrl::parse("https://www.netflix.com/watch/1").unwrap();
        let github = ParsedUrl::parse("https://GitHub.com/tokio-rs").unwrap();

        assert!(compiled.denies(&netflix));
        assert!(!compiled.allows(&netflix));
        assert!(compiled.allows(&github));
        assert!(!CompiledRules::default().denies(&netflix));
    }

    #[test]
    fn test_list_keys() {
        assert_eq!(RuleList::Allow.key(), "allow");
        assert_eq!(RuleList::Deny.to_string(), "deny");
    }
}
