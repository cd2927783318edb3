//! Renderer-local leisure animation cycle.
//!
//! The authority only ever reports `idle` in leisure mode. Renderers that
//! want the pet to nap and stretch on their own walk this sequence.

use crate::mode::Mood;
use std::time::Duration;

/// One step of the leisure cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeisureStep {
    pub mood: Mood,
    pub duration: Duration,
}

const fn step(mood: Mood, secs: u64) -> LeisureStep {
    LeisureStep {
        mood,
        duration: Duration::from_secs(secs),
    }
}

/// Default sequence: idle, stretch, idle, nap. Repeats forever.
pub const LEISURE_SEQUENCE: &[LeisureStep] = &[
    step(Mood::Idle, 8),
    step(Mood::Stretch, 4),
    step(Mood::Idle, 6),
    step(Mood::Sleep, 10),
];

/// Endless iterator over a leisure sequence.
#[derive(Debug, Clone)]
pub struct LeisureCycle {
    steps: &'static [LeisureStep],
    index: usize,
}

impl LeisureCycle {
    pub fn new() -> Self {
        Self::with_steps(LEISURE_SEQUENCE)
    }

    pub fn with_steps(steps: &'static [LeisureStep]) -> Self {
        Self { steps, index: 0 }
    }

    /// Restart from the first step, as a renderer does when leisure mode is
    /// re-entered.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Total length of one pass through the sequence.
    pub fn period(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

impl Default for LeisureCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for LeisureCycle {
    type Item = LeisureStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.steps.is_empty() {
            return None;
        }
        let step = self.steps[self.index % self.steps.len()];
        self.index = self.index.wrapping_add(1);
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_repeats() {
        let moods: Vec<Mood> = LeisureCycle::new().take(6).map(|s| s.mood).collect();
        assert_eq!(
            moods,
            vec![
                Mood::Idle,
                Mood::Stretch,
                Mood::Idle,
                Mood::Sleep,
                Mood::Idle,
                Mood::Stretch
            ]
        );
    }

    #[test]
    fn test_cycle_never_leaves_leisure_moods() {
        assert!(LeisureCycle::new()
            .take(20)
            .all(|s| !s.mood.is_work_only()));
    }

    #[test]
    fn test_reset_and_period() {
        let mut cycle = LeisureCycle::new();
        cycle.next();
        cycle.next();
        cycle.reset();
        assert_eq!(cycle.next().map(|s| s.mood), Some(Mood::Idle));
        assert_eq!(cycle.period(), Duration::from_secs(28));
    }

    #[test]
    fn test_empty_sequence_ends() {
        assert!(LeisureCycle::with_steps(&[]).next().is_none());
    }
}
