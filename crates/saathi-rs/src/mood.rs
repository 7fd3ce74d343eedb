//! The six moods the companion tracks, with their scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tracked mood. Scores run from -2 (hardest) to 2 (best).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Calm,
    #[default]
    Neutral,
    Sad,
    Angry,
    Anxious,
}

impl Mood {
    /// All moods, in the order they are offered for selection.
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Neutral,
        Mood::Sad,
        Mood::Angry,
        Mood::Anxious,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Anxious => "Anxious",
        }
    }

    pub fn score(self) -> i32 {
        match self {
            Mood::Happy => 2,
            Mood::Calm => 1,
            Mood::Neutral => 0,
            Mood::Sad => -1,
            Mood::Angry | Mood::Anxious => -2,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😀",
            Mood::Calm => "🙂",
            Mood::Neutral => "😐",
            Mood::Sad => "😔",
            Mood::Angry => "😡",
            Mood::Anxious => "😰",
        }
    }

    /// ASCII case-insensitive exact lookup, the same comparison the mood
    /// choice in the output schema uses. `" Happy"` does not match.
    pub fn from_name(name: &str) -> Option<Mood> {
        Mood::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Like [`from_name`](Self::from_name), falling back to `Neutral`.
    pub fn from_name_or_neutral(name: &str) -> Mood {
        Mood::from_name(name).unwrap_or(Mood::Neutral)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::from_name(s).ok_or_else(|| {
            let names: Vec<&str> = Mood::ALL.iter().map(|m| m.name()).collect();
            format!("unknown mood {s:?} (expected one of {})", names.join(", "))
        })
    }
}
