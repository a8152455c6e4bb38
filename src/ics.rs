//! iCalendar serialization: one normalized event in, one VCALENDAR stream
//! with a single VEVENT out.

use crate::event::{CalendarEvent, EventTime};
use chrono::{DateTime, Utc};
use ical::generator::{Emitter, IcalCalendarBuilder};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;

/// File name the artifact is offered under.
pub const ARTIFACT_FILE_NAME: &str = "smartcal_event.ics";

/// MIME type of the artifact.
pub const ARTIFACT_MIME_TYPE: &str = "text/calendar";

const PRODID: &str = "-//SmartCal//smartcal//EN";

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

fn property(name: &str, value: impl Into<String>) -> Property {
    Property { name: name.to_string(), params: None, value: Some(value.into()) }
}

/// RFC 5545 TEXT escaping: backslash, comma, semicolon and newlines.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str(r"\\"),
            ',' => escaped.push_str(r"\,"),
            ';' => escaped.push_str(r"\;"),
            '\n' => escaped.push_str(r"\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_time(time: &EventTime) -> String {
    match time {
        EventTime::Utc(instant) => instant.format(UTC_FORMAT).to_string(),
        // Verbatim fallback: the consuming application gets to apply its own
        // heuristics to text we could not parse.
        EventTime::Raw(text) => text.clone(),
    }
}

/// Serialize one event as an iCalendar byte stream.
///
/// Total for any well-formed normalized record: there is no failure path
/// here, only string assembly.
pub fn serialize_event(event: &CalendarEvent, uid: &str, stamp: DateTime<Utc>) -> String {
    let mut vevent = IcalEvent { properties: Vec::new(), alarms: Vec::new() };
    vevent.properties.push(property("UID", uid));
    vevent.properties.push(property("DTSTAMP", stamp.format(UTC_FORMAT).to_string()));
    vevent.properties.push(property("SUMMARY", escape_text(&event.name)));
    if let Some(begin) = &event.begin {
        vevent.properties.push(property("DTSTART", format_time(begin)));
    }
    if let Some(end) = &event.end {
        vevent.properties.push(property("DTEND", format_time(end)));
    }
    if !event.location.is_empty() {
        vevent.properties.push(property("LOCATION", escape_text(&event.location)));
    }
    vevent.properties.push(property("DESCRIPTION", escape_text(&event.description)));

    let mut calendar =
        IcalCalendarBuilder::version("2.0").gregorian().prodid(PRODID).build();
    calendar.events.push(vevent);
    calendar.generate()
}
