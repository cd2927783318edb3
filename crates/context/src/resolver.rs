//! Mood resolution logic.
//!
//! Pure business logic - no I/O.

use crate::mode::{Mode, Mood};
use crate::pattern::ParsedUrl;
use crate::rules::{CompiledRules, RuleSet};

/// URL prefixes for browser-internal pages. No renderer runs on these and
/// they are never matched against rules.
pub const INTERNAL_URL_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "chrome-search://",
    "chrome-untrusted://",
    "devtools://",
    "edge://",
    "brave://",
    "opera://",
    "vivaldi://",
    "about:",
    "moz-extension://",
    "view-source:",
];

/// Whether `url` is empty or points at a browser-internal page.
pub fn is_internal_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return true;
    }
    let lower = url.to_ascii_lowercase();
    INTERNAL_URL_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Resolve the mood for a page.
///
/// Priority:
/// 1. Idle for empty or internal URLs
/// 2. Idle in leisure mode (the renderer cycles its own animations)
/// 3. Focused if an allow pattern matches
/// 4. Distracted if a deny pattern matches
/// 5. Idle (neutral page)
///
/// Allow is checked first so a narrow allow entry can carve an exception out
/// of a broad deny entry.
pub fn compute_mood(url: &str, mode: Mode, rules: &RuleSet) -> Mood {
    // Patterns are only compiled when the rule lists are actually consulted
    neutral_mood(url, mode).unwrap_or_else(|| classify(url, &rules.compile()))
}

/// `compute_mood` against rules compiled ahead of time.
pub fn compute_mood_with(url: &str, mode: Mode, rules: &CompiledRules) -> Mood {
    neutral_mood(url, mode).unwrap_or_else(|| classify(url, rules))
}

fn neutral_mood(url: &str, mode: Mode) -> Option<Mood> {
    if is_internal_url(url) || mode == Mode::Leisure {
        Some(Mood::Idle)
    } else {
        None
    }
}

fn classify(url: &str, rules: &CompiledRules) -> Mood {
    let Some(parsed) = ParsedUrl::parse(url) else {
        return Mood::Idle;
    };
    if rules.allows(&parsed) {
        Mood::Focused
    } else if rules.denies(&parsed) {
        Mood::Distracted
    } else {
        Mood::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::rules::RuleList;

    fn deny_only(patterns: &[&str]) -> RuleSet {
        RuleSet::new(vec![], patterns.iter().map(|p| Pattern::from(*p)).collect())
    }

    #[test]
    fn test_leisure_is_always_idle() {
        let rules = RuleSet::defaults();
        for url in [
            "https://www.netflix.com/watch/1",
            "https://github.com/",
            "https://example.com/",
            "garbage",
        ] {
            assert_eq!(compute_mood(url, Mode::Leisure, &rules), Mood::Idle);
        }
    }

    #[test]
    fn test_empty_and_internal_urls_are_idle() {
        let rules = RuleSet::new(vec!["*".into()], vec!["*".into()]);
        assert_eq!(compute_mood("", Mode::Work, &rules), Mood::Idle);
        assert_eq!(compute_mood("chrome://settings", Mode::Work, &rules), Mood::Idle);
        assert_eq!(compute_mood("about:blank", Mode::Work, &rules), Mood::Idle);
        assert_eq!(compute_mood("EDGE://flags", Mode::Work, &rules), Mood::Idle);
    }

    #[test]
    fn test_netflix_is_distracted() {
        let rules = deny_only(&["*.netflix.com"]);
        let mood = compute_mood("https://www.netflix.com/watch/123", Mode::Work, &rules);
        assert_eq!(mood, Mood::Distracted);
    }

    #[test]
    fn test_allow_takes_precedence_over_deny() {
        let mut rules = deny_only(&["youtube.com/watch*"]);
        let url = "https://youtube.com/watch?v=abc";
        assert_eq!(compute_mood(url, Mode::Work, &rules), Mood::Distracted);

        rules.add(RuleList::Allow, "youtube.com/watch*");
        assert_eq!(compute_mood(url, Mode::Work, &rules), Mood::Focused);
    }

    #[test]
    fn test_unmatched_page_is_idle() {
        let rules = RuleSet::defaults();
        assert_eq!(
            compute_mood("https://example.org/", Mode::Work, &rules),
            Mood::Idle
        );
    }

    #[test]
    fn test_allowed_page_is_focused() {
        let rules = RuleSet::defaults();
        assert_eq!(
            compute_mood("https://github.com/tokio-rs/tokio", Mode::Work, &rules),
            Mood::Focused
        );
    }

    #[test]
    fn test_malformed_url_is_idle_in_work_mode() {
        let rules = RuleSet::new(vec![], vec!["*".into()]);
        assert_eq!(compute_mood("not a url", Mode::Work, &rules), Mood::Idle);
    }

    #[test]
    fn test_precompiled_rules_agree() {
        let rules = RuleSet::defaults();
        let compiled = rules.compile();
        for url in [
            "https://www.netflix.com/watch/1",
            "https://github.com/",
            "https://example.org/",
            "chrome://settings",
            "not a url",
        ] {
            for mode in [Mode::Work, Mode::Leisure] {
                assert_eq!(
                    compute_mood_with(url, mode, &compiled),
                    compute_mood(url, mode, &rules),
                    "{url} in {mode}"
                );
            }
        }
    }

    #[test]
    fn test_compute_mood_is_idempotent() {
        let rules = RuleSet::defaults();
        let url = "https://www.bilibili.com/video/BV1";
        let first = compute_mood(url, Mode::Work, &rules);
        let second = compute_mood(url, Mode::Work, &rules);
        assert_eq!(first, second);
        assert_eq!(rules, RuleSet::defaults());
    }
}
