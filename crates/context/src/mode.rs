//! Mode and mood definitions.
//!
//! Pure domain types - no I/O, no platform dependencies.

use serde::{Deserialize, Serialize};

/// User-selected top-level behaviour toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Rule lists drive the pet's mood.
    Work,

    /// Rule lists are ignored; the renderer cycles relaxed animations.
    #[default]
    Leisure,
}

impl Mode {
    /// Returns the wire/storage name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::Leisure => "leisure",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Mode::Work),
            "leisure" => Ok(Mode::Leisure),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Externally visible animation state of the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Relaxed default. Also the neutral outcome in work mode.
    #[default]
    Idle,

    /// Leisure-only, chosen by the renderer's local cycle.
    Sleep,

    /// Leisure-only, chosen by the renderer's local cycle.
    Stretch,

    /// Work mode on an allowed page.
    Focused,

    /// Work mode on a denied page.
    Distracted,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Idle => "idle",
            Mood::Sleep => "sleep",
            Mood::Stretch => "stretch",
            Mood::Focused => "focused",
            Mood::Distracted => "distracted",
        }
    }

    /// Whether this mood can only be produced while in work mode.
    pub fn is_work_only(&self) -> bool {
        matches!(self, Mood::Focused | Mood::Distracted)
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_leisure() {
        assert_eq!(Mode::default(), Mode::Leisure);
        assert_eq!(Mood::default(), Mood::Idle);
    }

    #[test]
    fn test_mode_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Work).unwrap(), "\"work\"");
        let mode: Mode = serde_json::from_str("\"leisure\"").unwrap();
        assert_eq!(mode, Mode::Leisure);
    }

    #[test]
    fn test_mood_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Mood::Distracted).unwrap(),
            "\"distracted\""
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(" Work ".parse::<Mode>(), Ok(Mode::Work));
        assert!("play".parse::<Mode>().is_err());
    }

    #[test]
    fn test_work_only_moods() {
        assert!(Mood::Focused.is_work_only());
        assert!(Mood::Distracted.is_work_only());
        assert!(!Mood::Sleep.is_work_only());
    }
}
