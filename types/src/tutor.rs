//! Inputs for the tutoring features (hints, review, study plan).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Study topics accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Arrays,
    Strings,
    LinkedList,
    Trees,
    DynamicProgramming,
    Graphs,
    Sorting,
    Searching,
    Math,
    Greedy,
}

impl Topic {
    #[must_use]
    pub const fn all() -> &'static [Topic] {
        &[
            Topic::Arrays,
            Topic::Strings,
            Topic::LinkedList,
            Topic::Trees,
            Topic::DynamicProgramming,
            Topic::Graphs,
            Topic::Sorting,
            Topic::Searching,
            Topic::Math,
            Topic::Greedy,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::Arrays => "arrays",
            Topic::Strings => "strings",
            Topic::LinkedList => "linked_list",
            Topic::Trees => "trees",
            Topic::DynamicProgramming => "dynamic_programming",
            Topic::Graphs => "graphs",
            Topic::Sorting => "sorting",
            Topic::Searching => "searching",
            Topic::Math => "math",
            Topic::Greedy => "greedy",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Topic::Arrays => "Arrays",
            Topic::Strings => "Strings",
            Topic::LinkedList => "Linked Lists",
            Topic::Trees => "Trees",
            Topic::DynamicProgramming => "Dynamic Programming",
            Topic::Graphs => "Graphs",
            Topic::Sorting => "Sorting",
            Topic::Searching => "Searching",
            Topic::Math => "Math",
            Topic::Greedy => "Greedy Algorithms",
        }
    }

    /// Accepts the wire name, with `-` or spaces in place of `_`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::all()
            .iter()
            .copied()
            .find(|topic| topic.as_str() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Languages offered for code review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Java,
    Cpp,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Javascript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "javascript" | "js" => Some(Language::Javascript),
            "java" => Some(Language::Java),
            "cpp" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }
}

pub const DEFAULT_STUDY_WEEKS: u32 = 4;

/// Study-plan length in weeks. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct StudyWeeks(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("study plan duration must be at least one week")]
pub struct ZeroWeeksError;

impl StudyWeeks {
    pub fn new(weeks: u32) -> Result<Self, ZeroWeeksError> {
        if weeks == 0 {
            Err(ZeroWeeksError)
        } else {
            Ok(Self(weeks))
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for StudyWeeks {
    fn default() -> Self {
        Self(DEFAULT_STUDY_WEEKS)
    }
}

impl TryFrom<u32> for StudyWeeks {
    type Error = ZeroWeeksError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudyWeeks> for u32 {
    fn from(value: StudyWeeks) -> Self {
        value.0
    }
}

/// Numeric form of a problem reference, if it has one.
///
/// The code-review endpoint takes an optional integer id. An optional sign
/// and the leading digits are used ("42-two-sum" is 42, "-5" is -5); a
/// reference with no digits ("two-sum") is absent, as is one outside `i64`.
#[must_use]
pub fn numeric_problem_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let sign = trimmed.len() - unsigned.len();
    trimmed[..sign + digits].parse().ok()
}
