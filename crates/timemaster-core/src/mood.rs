//! End-of-session mood check-in.
//!
//! The check-in is cosmetic: an entry is validated, logged and handed back to
//! the caller. Nothing in the session depends on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoodLabel {
    Awful,
    Bad,
    Okay,
    Good,
    Amazing,
}

impl MoodLabel {
    pub const ALL: [MoodLabel; 5] = [
        MoodLabel::Awful,
        MoodLabel::Bad,
        MoodLabel::Okay,
        MoodLabel::Good,
        MoodLabel::Amazing,
    ];

    /// Canonical label for a 1..=5 rating.
    pub fn for_rating(rating: u8) -> Option<Self> {
        match rating {
            1..=5 => Some(Self::ALL[usize::from(rating - 1)]),
            _ => None,
        }
    }

    pub fn rating(&self) -> u8 {
        match self {
            MoodLabel::Awful => 1,
            MoodLabel::Bad => 2,
            MoodLabel::Okay => 3,
            MoodLabel::Good => 4,
            MoodLabel::Amazing => 5,
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoodLabel::Awful => "Awful",
            MoodLabel::Bad => "Bad",
            MoodLabel::Okay => "Okay",
            MoodLabel::Good => "Good",
            MoodLabel::Amazing => "Amazing",
        };
        f.write_str(s)
    }
}

impl FromStr for MoodLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodLabel::ALL
            .into_iter()
            .find(|label| label.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("unknown mood '{s}'"),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub rating: u8,
    pub label: MoodLabel,
    pub at: DateTime<Utc>,
}

/// Validate a check-in and log it.
///
/// The label must be the canonical one for the rating.
pub fn select_mood(rating: u8, label: MoodLabel) -> Result<MoodEntry, ValidationError> {
    let expected = MoodLabel::for_rating(rating).ok_or(ValidationError::OutOfRange {
        field: "rating".into(),
        min: 1,
        max: 5,
        value: i64::from(rating),
    })?;
    if expected != label {
        return Err(ValidationError::InvalidValue {
            field: "mood".into(),
            message: format!("rating {rating} is '{expected}', not '{label}'"),
        });
    }

    let entry = MoodEntry {
        rating,
        label,
        at: Utc::now(),
    };
    tracing::info!(rating, %label, "mood check-in");
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_map_to_labels() {
        assert_eq!(MoodLabel::for_rating(1), Some(MoodLabel::Awful));
        assert_eq!(MoodLabel::for_rating(5), Some(MoodLabel::Amazing));
        assert_eq!(MoodLabel::for_rating(0), None);
        assert_eq!(MoodLabel::for_rating(6), None);
        for label in MoodLabel::ALL {
            assert_eq!(MoodLabel::for_rating(label.rating()), Some(label));
        }
    }

    #[test]
    fn select_accepts_matching_pair() {
        let entry = select_mood(4, MoodLabel::Good).unwrap();
        assert_eq!(entry.rating, 4);
        assert_eq!(entry.label, MoodLabel::Good);
    }

    #[test]
    fn select_rejects_mismatch() {
        assert!(select_mood(1, MoodLabel::Amazing).is_err());
    }

    #[test]
    fn select_rejects_out_of_range() {
        assert!(matches!(
            select_mood(9, MoodLabel::Amazing),
            Err(ValidationError::OutOfRange { value: 9, .. })
        ));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("okay".parse::<MoodLabel>().unwrap(), MoodLabel::Okay);
        assert!("meh".parse::<MoodLabel>().is_err());
    }
}
