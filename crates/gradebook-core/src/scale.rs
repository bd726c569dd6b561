//! Percentage, letter grade, and GPA point conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A letter grade on the five-tier scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

/// One row of the grade scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tier {
    /// Lowest percentage that earns this letter.
    pub min_percentage: f64,
    /// GPA points for the letter.
    pub gpa_points: f64,
    pub letter: LetterGrade,
}

/// Highest threshold first. The last entry is the catch-all.
static TIERS: [Tier; 5] = [
    Tier {
        min_percentage: 90.0,
        gpa_points: 4.0,
        letter: LetterGrade::A,
    },
    Tier {
        min_percentage: 80.0,
        gpa_points: 3.0,
        letter: LetterGrade::B,
    },
    Tier {
        min_percentage: 70.0,
        gpa_points: 2.0,
        letter: LetterGrade::C,
    },
    Tier {
        min_percentage: 60.0,
        gpa_points: 1.0,
        letter: LetterGrade::D,
    },
    Tier {
        min_percentage: 0.0,
        gpa_points: 0.0,
        letter: LetterGrade::F,
    },
];

/// The static conversion table between percentages, letters and GPA points.
pub struct GradeScale;

impl GradeScale {
    /// All tiers, highest threshold first.
    pub fn tiers() -> &'static [Tier] {
        &TIERS
    }

    /// The catch-all tier.
    pub fn lowest() -> &'static Tier {
        &TIERS[TIERS.len() - 1]
    }

    /// Convert a percentage to a letter.
    ///
    /// Negative and NaN percentages fall through to the lowest tier.
    pub fn from_percentage(percentage: f64) -> LetterGrade {
        TIERS
            .iter()
            .find(|tier| tier.min_percentage <= percentage)
            .unwrap_or_else(Self::lowest)
            .letter
    }

    /// Look up a letter by name, ignoring case and surrounding whitespace.
    ///
    /// Unrecognised input resolves to the lowest tier instead of failing, so a
    /// mistyped letter reads as an F. Use [`LetterGrade::from_str`] where a
    /// typo must be reported.
    pub fn from_letter(letter: &str) -> LetterGrade {
        letter
            .parse::<LetterGrade>()
            .unwrap_or(Self::lowest().letter)
    }

    fn tier(letter: LetterGrade) -> &'static Tier {
        TIERS
            .iter()
            .find(|tier| tier.letter == letter)
            .unwrap_or_else(Self::lowest)
    }
}

impl LetterGrade {
    /// GPA points for this letter.
    pub fn gpa_points(self) -> f64 {
        GradeScale::tier(self).gpa_points
    }

    /// Lowest percentage that earns this letter.
    pub fn min_percentage(self) -> f64 {
        GradeScale::tier(self).min_percentage
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "F" => Ok(LetterGrade::F),
            other => Err(format!("unknown letter grade: {other}")),
        }
    }
}
