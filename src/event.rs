use crate::config::EventConfig;
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact pattern the model is asked to use for time fields.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields recovered from the model output. Anything the completion leaves
/// out deserializes to its default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedEvent {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

/// A time field after normalization: an absolute instant when the field
/// matched the expected pattern and resolved in the source timezone, or the
/// verbatim text for the consuming calendar application to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    Utc(DateTime<Utc>),
    Raw(String),
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Utc(instant) => write!(f, "{}", instant.to_rfc3339()),
            EventTime::Raw(text) => f.write_str(text),
        }
    }
}

/// One normalized event, ready for serialization. Built once per run and
/// discarded after the artifact is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub name: String,
    pub begin: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: String,
    pub description: String,
}

/// Resolve the configured source timezone.
pub fn source_timezone(settings: &EventConfig) -> Result<Tz> {
    Tz::from_str(&settings.timezone)
        .map_err(|e| anyhow!("Invalid event timezone '{}': {}", settings.timezone, e))
}

/// Normalize one extracted time field.
///
/// A string matching `YYYY-MM-DD HH:MM:SS` is read as wall-clock time in
/// `tz` and converted to UTC. Anything else passes through unchanged.
pub fn normalize_time(raw: &str, tz: Tz) -> EventTime {
    match NaiveDateTime::parse_from_str(raw, TIME_FORMAT) {
        Ok(naive) => match tz.from_local_datetime(&naive).single() {
            Some(zoned) => EventTime::Utc(zoned.with_timezone(&Utc)),
            None => {
                debug!("Time '{}' is ambiguous or nonexistent in {}, keeping raw text", raw, tz);
                EventTime::Raw(raw.to_string())
            }
        },
        Err(e) => {
            debug!("Time '{}' does not match the expected pattern ({}), keeping raw text", raw, e);
            EventTime::Raw(raw.to_string())
        }
    }
}

/// Map an extraction result onto a calendar event.
///
/// A missing end time stays missing. The prompt asks the model to default it
/// to one hour after the start; nothing is synthesized here.
pub fn normalize(extracted: ExtractedEvent, settings: &EventConfig, tz: Tz) -> CalendarEvent {
    let name = extracted
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| settings.default_title.clone());

    let begin = extracted.start_time.as_deref().map(|raw| normalize_time(raw, tz));
    let end = extracted.end_time.as_deref().map(|raw| normalize_time(raw, tz));

    let description = if extracted.description.is_empty() {
        settings.provenance.clone()
    } else {
        format!("{}\n{}", extracted.description, settings.provenance)
    };

    CalendarEvent { name, begin, end, location: extracted.location, description }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use chrono_tz::Asia::Shanghai;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn extracted(
        title: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        location: &str,
        description: &str,
    ) -> ExtractedEvent {
        ExtractedEvent {
            title: title.map(String::from),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            location: location.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_matching_time_converts_to_utc() {
        let time = normalize_time("2026-01-16 15:00:00", Shanghai);
        let expected = Utc.with_ymd_and_hms(2026, 1, 16, 7, 0, 0).unwrap();
        assert_eq!(time, EventTime::Utc(expected));
    }

    #[test]
    fn test_midnight_crosses_the_date_line_backwards() {
        let time = normalize_time("2026-01-16 01:30:00", Shanghai);
        let expected = Utc.with_ymd_and_hms(2026, 1, 15, 17, 30, 0).unwrap();
        assert_eq!(time, EventTime::Utc(expected));
    }

    #[test_case("本周五下午3点"; "relative phrase")]
    #[test_case("2026-01-16T15:00:00"; "iso T separator")]
    #[test_case("2026-01-16 15:00"; "missing seconds")]
    #[test_case("Friday 3pm"; "english phrase")]
    fn test_non_matching_time_passes_through(raw: &str) {
        assert_eq!(normalize_time(raw, Shanghai), EventTime::Raw(raw.to_string()));
    }

    #[test]
    fn test_normalize_full_extraction() {
        let settings = EventConfig::default();
        let event = normalize(
            extracted(
                Some("年级大会"),
                Some("2026-01-16 15:00:00"),
                Some("2026-01-16 16:00:00"),
                "主楼203",
                "年级大会",
            ),
            &settings,
            Shanghai,
        );

        assert_eq!(event.name, "年级大会");
        assert_eq!(
            event.begin,
            Some(EventTime::Utc(Utc.with_ymd_and_hms(2026, 1, 16, 7, 0, 0).unwrap()))
        );
        assert_eq!(
            event.end,
            Some(EventTime::Utc(Utc.with_ymd_and_hms(2026, 1, 16, 8, 0, 0).unwrap()))
        );
        assert_eq!(event.location, "主楼203");
        assert_eq!(event.description, "年级大会\n(Generated by SmartCal)");
    }

    #[test]
    fn test_missing_title_takes_the_default() {
        let settings = EventConfig::default();
        let event = normalize(extracted(None, None, None, "", ""), &settings, Shanghai);
        assert_eq!(event.name, "New Event");

        let event = normalize(extracted(Some("   "), None, None, "", ""), &settings, Shanghai);
        assert_eq!(event.name, "New Event");
    }

    #[test]
    fn test_missing_end_time_stays_missing() {
        let settings = EventConfig::default();
        let event = normalize(
            extracted(Some("Standup"), Some("2026-02-02 09:30:00"), None, "", ""),
            &settings,
            Shanghai,
        );
        assert!(event.begin.is_some());
        assert_eq!(event.end, None);
    }

    #[test]
    fn test_empty_description_is_just_the_provenance_note() {
        let settings = EventConfig::default();
        let event = normalize(extracted(Some("Standup"), None, None, "", ""), &settings, Shanghai);
        assert_eq!(event.description, "(Generated by SmartCal)");
    }

    #[test]
    fn test_source_timezone_rejects_unknown_names() {
        let mut settings = EventConfig::default();
        assert!(source_timezone(&settings).is_ok());

        settings.timezone = "Mars/Olympus_Mons".to_string();
        assert!(source_timezone(&settings).is_err());
    }
}
