//! XML payload encoding for BambooHR write endpoints.
//!
//! # Design
//! The gateway accepts small, flat XML documents built from
//! `<field id="...">value</field>` fragments. They are formatted directly
//! rather than through an XML writer so that the byte layout (notably the
//! `<field id="x" />` form for empty values) stays exactly what the remote
//! API documents. All text and attribute values go through `escape`.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{ReportFormat, TimeOffRequest};

/// Wire format of the `lastChanged` report filter.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Escape `& < > ' "`. Each character of the input is replaced at most once,
/// so the `&` of an inserted entity is never escaped again.
pub fn escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Encode one field. `None` and empty strings produce the self-closing form.
pub fn encode_field(id: &str, value: Option<&str>, prefix: &str, suffix: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => {
            format!("{prefix}<field id=\"{}\">{}</field>{suffix}", escape(id), escape(v))
        }
        _ => format!("{prefix}<field id=\"{}\" />{suffix}", escape(id)),
    }
}

/// Text form of a JSON scalar as sent to the gateway. Nested values are
/// serialized as JSON text; `null` has no text.
pub fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

fn encode_fields(record: &Map<String, Value>) -> String {
    record
        .iter()
        .map(|(id, value)| encode_field(id, value_text(value).as_deref(), "\t", "\n"))
        .collect()
}

/// `<employee>` document for employee create and update.
pub fn encode_employee(record: &Map<String, Value>) -> String {
    format!("<employee>\n{}</employee>", encode_fields(record))
}

/// `<row>` document for table row create and update.
pub fn encode_row(record: &Map<String, Value>) -> String {
    format!("<row>\n{}</row>", encode_fields(record))
}

/// `<report>` document for custom reports. Every requested field is listed
/// with an empty value; `last_changed` adds a `lastChanged` filter.
pub fn encode_report<S: AsRef<str>>(
    fields: &[S],
    title: &str,
    format: ReportFormat,
    last_changed: Option<DateTime<Utc>>,
) -> String {
    let mut xml = format!(
        "<report output=\"{}\">\n\t<title>{}</title>\n",
        format.as_str(),
        escape(title)
    );
    if let Some(ts) = last_changed {
        xml.push_str(&format!(
            "\t<filters>\n\t\t<lastChanged includeNull=\"no\">{}</lastChanged>\n\t</filters>\n",
            ts.format(REPORT_TIMESTAMP_FORMAT)
        ));
    }
    xml.push_str("\t<fields>\n");
    for field in fields {
        xml.push_str(&encode_field(field.as_ref(), None, "\t\t", "\n"));
    }
    xml.push_str("\t</fields>\n</report>");
    xml
}

/// `<request>` document for time-off request create and update.
pub fn encode_time_off_request(request: &TimeOffRequest) -> String {
    let mut xml = String::from("<request>\n");
    xml.push_str(&format!("\t<status>{}</status>\n", request.status.as_str()));
    xml.push_str(&format!("\t<start>{}</start>\n", request.start.format("%Y-%m-%d")));
    xml.push_str(&format!("\t<end>{}</end>\n", request.end.format("%Y-%m-%d")));
    xml.push_str(&format!(
        "\t<timeOffTypeId>{}</timeOffTypeId>\n",
        escape(&request.time_off_type_id)
    ));
    xml.push_str(&format!("\t<amount>{}</amount>\n", escape(&request.amount)));
    if !request.notes.is_empty() {
        xml.push_str("\t<notes>\n");
        for note in &request.notes {
            xml.push_str(&format!(
                "\t\t<note from=\"{}\">{}</note>\n",
                note.from.as_str(),
                escape(&note.text)
            ));
        }
        xml.push_str("\t</notes>\n");
    }
    if !request.dates.is_empty() {
        xml.push_str("\t<dates>\n");
        for day in &request.dates {
            xml.push_str(&format!(
                "\t\t<date ymd=\"{}\" amount=\"{}\" />\n",
                day.date.format("%Y-%m-%d"),
                escape(&day.amount)
            ));
        }
        xml.push_str("\t</dates>\n");
    }
    if let Some(previous) = &request.previous_request {
        xml.push_str(&format!(
            "\t<previousRequest>{}</previousRequest>\n",
            escape(previous)
        ));
    }
    xml.push_str("</request>");
    xml
}
