use chrono::{DateTime, TimeZone};

/// Build the extraction instruction for one pipeline run.
///
/// The timestamp carries the weekday so the model can resolve relative
/// expressions like "this Friday". Pure function of its input: the same
/// timestamp always produces the same prompt.
pub fn build_system_prompt<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        r#"You are a schedule extraction assistant. The current date and time is: {}.
Extract the event described in the user's text and reply with a bare JSON string.

Important: do NOT wrap the output in markdown markers (such as ```json ... ```). Output {{ ... }} directly.

JSON fields:
- title: event title
- start_time: start time (format YYYY-MM-DD HH:MM:SS)
- end_time: end time (format YYYY-MM-DD HH:MM:SS). If not mentioned, default to one hour after the start.
- location: the place (empty string if none)
- description: notes or a short summary of the original text"#,
        now.format("%Y-%m-%d %A %H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;

    fn monday_afternoon() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 12, 14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let now = monday_afternoon();
        assert_eq!(build_system_prompt(&now), build_system_prompt(&now));
    }

    #[test]
    fn test_prompt_states_date_and_weekday() {
        let prompt = build_system_prompt(&monday_afternoon());
        assert!(prompt.contains("2026-01-12 Monday 14:30"));
    }

    #[test]
    fn test_prompt_pins_the_field_schema() {
        let prompt = build_system_prompt(&monday_afternoon());
        for field in ["title", "start_time", "end_time", "location", "description"] {
            assert!(prompt.contains(field), "prompt is missing field {}", field);
        }
        assert!(prompt.contains("YYYY-MM-DD HH:MM:SS"));
        assert!(prompt.contains("do NOT wrap the output in markdown"));
    }
}
