//! Client-side start guards. These duplicate the backend's own checks so a
//! bad request is rejected before any network call.
use std::ops::RangeInclusive;

use validator::ValidateEmail;

use crate::form::{GenerationForm, ResearchForm, ResearchRequest};

pub const MAX_RESULTS_RANGE: RangeInclusive<u32> = 1..=50;
pub const SELECTION_RANGE: RangeInclusive<usize> = 1..=100;
pub const SUBJECT_CHARS_RANGE: RangeInclusive<usize> = 3..=120;
pub const TAKE_RANGE: RangeInclusive<u32> = 1..=100;
pub const RATE_LIMIT_RANGE: RangeInclusive<u32> = 1..=100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("keyword is required")]
    EmptyKeyword,
    #[error("max results must be between 1 and 50 (got {0})")]
    MaxResultsOutOfRange(u32),
    #[error("research has not completed")]
    ResearchNotDone,
    #[error("please select between 1 and 100 rows (selected {0})")]
    SelectionOutOfRange(usize),
    #[error("selected rows must have valid contact emails; add or edit them in the research results")]
    NoContactEmails,
    #[error("subject must be 3-120 characters (got {0})")]
    SubjectLength(usize),
    #[error("take must be between 1 and 100 (got {0})")]
    TakeOutOfRange(u32),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("email generation has not completed")]
    GenerationNotDone,
    #[error("no drafts to send")]
    NoDrafts,
    #[error("no valid recipient emails in drafts")]
    NoRecipients,
    #[error("draft {index} has an invalid recipient address: {address}")]
    InvalidRecipient { index: usize, address: String },
    #[error("please enter a sender address")]
    MissingSender,
    #[error("rate limit must be between 1 and 100 per second (got {0})")]
    RateLimitOutOfRange(u32),
}

/// Syntactic address check on the trimmed input; empty is invalid.
pub fn is_valid_email(address: &str) -> bool {
    let address = address.trim();
    !address.is_empty() && !address.contains(char::is_whitespace) && address.validate_email()
}

pub(crate) fn research_request(form: &ResearchForm) -> Result<ResearchRequest, ValidationError> {
    let keyword = form.keyword.trim();
    if keyword.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    if !MAX_RESULTS_RANGE.contains(&form.max_results) {
        return Err(ValidationError::MaxResultsOutOfRange(form.max_results));
    }
    Ok(ResearchRequest {
        keyword: keyword.to_string(),
        max_results: form.max_results,
    })
}

pub(crate) fn selection(count: usize) -> Result<(), ValidationError> {
    if SELECTION_RANGE.contains(&count) {
        Ok(())
    } else {
        Err(ValidationError::SelectionOutOfRange(count))
    }
}

/// Checks subject, take and the optional sender address of the generation form.
pub(crate) fn generation_form(form: &GenerationForm) -> Result<(), ValidationError> {
    let subject_chars = form.subject.trim().chars().count();
    if !SUBJECT_CHARS_RANGE.contains(&subject_chars) {
        return Err(ValidationError::SubjectLength(subject_chars));
    }
    if !TAKE_RANGE.contains(&form.take) {
        return Err(ValidationError::TakeOutOfRange(form.take));
    }
    let your_email = form.your_email.trim();
    if !your_email.is_empty() && !is_valid_email(your_email) {
        return Err(ValidationError::InvalidEmail(your_email.to_string()));
    }
    Ok(())
}

pub(crate) fn sender(from_email: &str) -> Result<String, ValidationError> {
    let from_email = from_email.trim();
    if from_email.is_empty() {
        return Err(ValidationError::MissingSender);
    }
    if !is_valid_email(from_email) {
        return Err(ValidationError::InvalidEmail(from_email.to_string()));
    }
    Ok(from_email.to_string())
}

pub(crate) fn rate_limit(rate: u32) -> Result<(), ValidationError> {
    if RATE_LIMIT_RANGE.contains(&rate) {
        Ok(())
    } else {
        Err(ValidationError::RateLimitOutOfRange(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(subject: &str, take: u32) -> GenerationForm {
        GenerationForm {
            subject: subject.to_string(),
            take,
            ..GenerationForm::default()
        }
    }

    #[test]
    fn subject_and_take_bounds() {
        assert_eq!(
            generation_form(&form("Hi", 5)),
            Err(ValidationError::SubjectLength(2))
        );
        assert_eq!(
            generation_form(&form(&"x".repeat(121), 5)),
            Err(ValidationError::SubjectLength(121))
        );
        assert_eq!(
            generation_form(&form("Guest post", 0)),
            Err(ValidationError::TakeOutOfRange(0))
        );
        assert_eq!(generation_form(&form("Guest post", 1)), Ok(()));
        assert_eq!(generation_form(&form(&"x".repeat(120), 100)), Ok(()));
        // Trimmed before counting.
        assert_eq!(
            generation_form(&form("  ab  ", 5)),
            Err(ValidationError::SubjectLength(2))
        );
    }

    #[test]
    fn subject_length_counts_characters_not_bytes() {
        assert_eq!(generation_form(&form("äöü", 5)), Ok(()));
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("x@example.com"));
        assert!(is_valid_email("  me@x.com "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.com"));
    }

    #[test]
    fn research_keyword_is_trimmed_and_required() {
        let request = research_request(&ResearchForm {
            keyword: "  ai writers ".to_string(),
            max_results: 10,
        })
        .unwrap();
        assert_eq!(request.keyword, "ai writers");

        let err = research_request(&ResearchForm {
            keyword: "   ".to_string(),
            max_results: 10,
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyKeyword);
    }

    #[test]
    fn sender_requires_valid_address() {
        assert_eq!(sender(""), Err(ValidationError::MissingSender));
        assert_eq!(
            sender("me"),
            Err(ValidationError::InvalidEmail("me".to_string()))
        );
        assert_eq!(sender(" me@x.com "), Ok("me@x.com".to_string()));
    }
}
