//! JSON recovery over raw completion text.
//!
//! The model is instructed not to fence its output, but sometimes does it
//! anyway. Matching the first `{` through the last `}` strips whatever fence
//! or prose surrounds the object without caring about its exact syntax; a
//! completion with no braces at all gets one whole-text parse attempt.

use crate::event::ExtractedEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

#[derive(Debug, Error)]
pub enum RecoverError {
    #[error("JSON object in model output does not parse: {0}")]
    InvalidObject(#[source] serde_json::Error),
    #[error("model output contains no JSON object and is not itself JSON: {0}")]
    NotJson(#[source] serde_json::Error),
}

/// Isolate and parse the event object out of one completion.
pub fn recover_event(completion: &str) -> Result<ExtractedEvent, RecoverError> {
    match JSON_OBJECT.find(completion) {
        Some(object) => serde_json::from_str(object.as_str()).map_err(RecoverError::InvalidObject),
        None => serde_json::from_str(completion.trim()).map_err(RecoverError::NotJson),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const EVENT_JSON: &str = r#"{"title":"年级大会","start_time":"2026-01-16 15:00:00","end_time":"2026-01-16 16:00:00","location":"主楼203","description":"年级大会"}"#;

    #[test_case(EVENT_JSON; "bare object")]
    #[test_case("```json\n{\"title\":\"年级大会\",\"start_time\":\"2026-01-16 15:00:00\",\"end_time\":\"2026-01-16 16:00:00\",\"location\":\"主楼203\",\"description\":\"年级大会\"}\n```"; "fenced object")]
    #[test_case("Here is the event you asked for:\n{\"title\":\"年级大会\",\"start_time\":\"2026-01-16 15:00:00\",\"end_time\":\"2026-01-16 16:00:00\",\"location\":\"主楼203\",\"description\":\"年级大会\"} hope that helps"; "object wrapped in prose")]
    fn test_recovers_object_regardless_of_wrapping(completion: &str) {
        let event = recover_event(completion).unwrap();
        assert_eq!(event.title.as_deref(), Some("年级大会"));
        assert_eq!(event.start_time.as_deref(), Some("2026-01-16 15:00:00"));
        assert_eq!(event.end_time.as_deref(), Some("2026-01-16 16:00:00"));
        assert_eq!(event.location, "主楼203");
        assert_eq!(event.description, "年级大会");
    }

    #[test]
    fn test_multiline_pretty_printed_object() {
        let completion = "{\n  \"title\": \"Standup\",\n  \"start_time\": \"2026-02-02 09:30:00\"\n}";
        let event = recover_event(completion).unwrap();
        assert_eq!(event.title.as_deref(), Some("Standup"));
        assert_eq!(event.end_time, None);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let event = recover_event(r#"{"title":"Standup"}"#).unwrap();
        assert_eq!(event.start_time, None);
        assert_eq!(event.end_time, None);
        assert_eq!(event.location, "");
        assert_eq!(event.description, "");
    }

    #[test]
    fn test_no_braces_at_all() {
        let err = recover_event("not json at all").unwrap_err();
        assert!(matches!(err, RecoverError::NotJson(_)));
    }

    #[test]
    fn test_braces_around_garbage() {
        let err = recover_event("{this is not an object}").unwrap_err();
        assert!(matches!(err, RecoverError::InvalidObject(_)));
    }

    #[test]
    fn test_unterminated_object_falls_through_to_whole_text() {
        // No closing brace, so the pattern never matches and the whole text
        // gets the parse attempt.
        let err = recover_event("{\"title\": \"Standup\"").unwrap_err();
        assert!(matches!(err, RecoverError::NotJson(_)));
    }
}
