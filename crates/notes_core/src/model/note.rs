//! Note entity and title rules.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row id. Never reused after deletion.
pub type NoteId = i64;

/// Maximum title length in characters (not bytes).
pub const TITLE_MAX_CHARS: usize = 255;

/// Persisted personal note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free-form body; may be empty.
    pub content: String,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed by every successful update.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    TitleTooLong { chars: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { chars } => write!(
                f,
                "title must be at most {TITLE_MAX_CHARS} characters, got {chars}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Checks a title against the boundary rules.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong { chars });
    }
    Ok(())
}

/// Current UTC time at the precision timestamps are persisted with.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::{now_utc, validate_title, NoteValidationError, TITLE_MAX_CHARS};
    use chrono::Timelike;

    #[test]
    fn title_rules_accept_boundary_lengths() {
        assert!(validate_title("a").is_ok());
        assert!(validate_title(&"x".repeat(TITLE_MAX_CHARS)).is_ok());
    }

    #[test]
    fn title_rules_reject_empty_and_long_titles() {
        assert_eq!(validate_title(""), Err(NoteValidationError::EmptyTitle));
        assert_eq!(
            validate_title(&"x".repeat(TITLE_MAX_CHARS + 1)),
            Err(NoteValidationError::TitleTooLong {
                chars: TITLE_MAX_CHARS + 1
            })
        );
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(title.len() > TITLE_MAX_CHARS);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn now_is_truncated_to_microseconds() {
        assert_eq!(now_utc().nanosecond() % 1_000, 0);
    }
}
