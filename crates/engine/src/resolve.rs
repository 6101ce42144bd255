//! Parsing of raw Q&A model output into an answer/timestamp pair.
//!
//! The prompt asks the model for a two-part response ("Answer: ..." then
//! "Timestamp: <seconds>"), but nothing upstream guarantees that shape. This
//! module is the single place that grammar lives; everything else either gets
//! a [`ResolvedAnswer`] or the untouched raw text back for fallback display.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::ResolvedAnswer;

// The answer segment is everything between the first answer marker and the
// first timestamp marker that follows it, newlines included.
static ANSWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Answer:(.*?)Timestamp:").unwrap());

// First integer-or-decimal number after the first timestamp marker. With a
// lazy skip, leftmost-first matching means duplicate markers resolve to the
// earliest one in the text.
static TIMESTAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Timestamp:.*?(\d+\.?\d*)").unwrap());

/// Raised when the raw response did not contain both a recognizable answer
/// segment and a parseable timestamp. Carries the original text unmodified so
/// callers can fall back to showing it instead of fabricating a timestamp.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not extract an answer and timestamp from the model response")]
pub struct Unresolvable {
    pub raw: String,
}

/// Extract `(answer, timestamp)` from a raw Q&A response.
///
/// Succeeds only when both parts are found; a response with an answer but no
/// usable number (or the reverse) is unresolvable as a whole.
pub fn resolve_answer(raw: &str) -> Result<ResolvedAnswer, Unresolvable> {
    let answer = ANSWER_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| trim_decoration(m.as_str()));

    let timestamp = TIMESTAMP_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match (answer, timestamp) {
        (Some(answer), Some(timestamp)) if !answer.is_empty() => {
            Ok(ResolvedAnswer { answer, timestamp })
        }
        _ => Err(Unresolvable {
            raw: raw.to_string(),
        }),
    }
}

// Models frequently echo the markers with markdown emphasis ("**Answer:**"),
// which leaves stray asterisks on the segment boundaries.
fn trim_decoration(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_two_part_response() {
        let raw = "Answer: The phone is revealed in the second scene. Timestamp: 42.5";
        let resolved = resolve_answer(raw).unwrap();
        assert_eq!(resolved.answer, "The phone is revealed in the second scene.");
        assert_eq!(resolved.timestamp, 42.5);
    }

    #[test]
    fn resolves_multiline_answer() {
        let raw = "Answer: First line.\nSecond line.\n\nTimestamp: 12";
        let resolved = resolve_answer(raw).unwrap();
        assert_eq!(resolved.answer, "First line.\nSecond line.");
        assert_eq!(resolved.timestamp, 12.0);
    }

    #[test]
    fn resolves_markdown_decorated_markers() {
        let raw = "**Answer:** The demo starts here.\n**Timestamp:** 93.25";
        let resolved = resolve_answer(raw).unwrap();
        assert_eq!(resolved.answer, "The demo starts here.");
        assert_eq!(resolved.timestamp, 93.25);
    }

    #[test]
    fn first_timestamp_marker_wins() {
        let raw = "Answer: X Timestamp: 10 and again Timestamp: 99";
        let resolved = resolve_answer(raw).unwrap();
        assert_eq!(resolved.timestamp, 10.0);
    }

    #[test]
    fn fractional_timestamps_keep_precision() {
        let raw = "Answer: a moment. Timestamp: 0.125";
        assert_eq!(resolve_answer(raw).unwrap().timestamp, 0.125);
    }

    #[test]
    fn timestamp_with_prose_before_the_number() {
        let raw = "Answer: here. Timestamp: around 17.5 seconds in";
        assert_eq!(resolve_answer(raw).unwrap().timestamp, 17.5);
    }

    #[test]
    fn missing_timestamp_marker_preserves_raw() {
        let raw = "The model rambled and never gave a timestamp.";
        let err = resolve_answer(raw).unwrap_err();
        assert_eq!(err.raw, raw);
    }

    #[test]
    fn answer_marker_without_timestamp_is_unresolvable() {
        let raw = "Answer: something happened but no marker follows";
        assert!(resolve_answer(raw).is_err());
    }

    #[test]
    fn timestamp_marker_without_number_is_unresolvable() {
        let raw = "Answer: something. Timestamp: unknown";
        assert!(resolve_answer(raw).is_err());
    }

    #[test]
    fn empty_answer_segment_is_unresolvable() {
        let raw = "Answer: Timestamp: 5";
        assert!(resolve_answer(raw).is_err());
    }

    #[test]
    fn empty_input_is_unresolvable() {
        assert!(resolve_answer("").is_err());
    }
}
