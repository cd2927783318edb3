//! Mood decision logic for FocusMeow.
//!
//! This crate decides how the pet should feel about the page the user is on.
//! It covers:
//! - URL pattern matching (`*` wildcards, case-insensitive)
//! - Allow/deny rule lists and their curated defaults
//! - Mood resolution from (url, mode, rules)
//! - The renderer-local leisure animation cycle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer (pure)                      │
//! │  pattern.rs  - Pattern compile + hostname/URL matching      │
//! │  rules.rs    - RuleSet (allow, deny) and defaults           │
//! │  mode.rs     - Mode and Mood enums                          │
//! │  resolver.rs - compute_mood                                 │
//! │  leisure.rs  - Timed idle/stretch/sleep sequence            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use focusmeow_context::{compute_mood, Mode, Mood, RuleSet};
//!
//! let rules = RuleSet::defaults();
//! let mood = compute_mood("https://www.netflix.com/watch/1", Mode::Work, &rules);
//! assert_eq!(mood, Mood::Distracted);
//! ```

mod leisure;
mod mode;
mod pattern;
mod resolver;
mod rules;

// Re-export main types
pub use leisure::{LeisureCycle, LeisureStep, LEISURE_SEQUENCE};
pub use mode::{Mode, Mood};
pub use pattern::{matches, matches_any, CompiledPattern, ParsedUrl, Pattern};
pub use resolver::{compute_mood, compute_mood_with, is_internal_url, INTERNAL_URL_PREFIXES};
pub use rules::{CompiledRules, RuleList, RuleSet, DEFAULT_ALLOW, DEFAULT_DENY};
