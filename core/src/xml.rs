//! XML response parsing.
//!
//! # Design
//! Responses are small, so the whole document is first read into an
//! `XmlElement` tree with `quick_xml`'s pull reader, then each endpoint's
//! transformer walks the tree. Element text is accumulated across text,
//! CDATA and entity events and trimmed once the element closes, so
//! `T &amp; C` reads back as `T & C`.
//!
//! Every collection the remote side may repeat comes back as a `Vec` (or a
//! JSON array), even when the document holds a single element, and a missing
//! collection is an empty one.

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::{
    ChangeAction, ChangeEvent, EmployeeFile, FileCategory, TabularData, TabularRow,
    TimeOffSummary, WhosOutEntry,
};

/// Wire format of `lastChanged` in the changes feed.
pub const CHANGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One parsed XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Trimmed text content; `None` when empty or whitespace only.
    pub text: Option<String>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    fn require_attr(&self, name: &str) -> Result<&str, ApiError> {
        self.attr(name).ok_or_else(|| {
            ApiError::Format(format!("<{}> is missing attribute '{name}'", self.name))
        })
    }
}

/// Parse a whole document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, ApiError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ApiError::Format(format!("malformed XML at byte {}: {e}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| ApiError::Format("unbalanced closing tag".to_string()))?;
                element.text = element
                    .text
                    .take()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty());
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let raw = utf8(&text)?;
                let unescaped = quick_xml::escape::unescape(raw)
                    .map_err(|e| ApiError::Format(format!("bad entity in text: {e}")))?;
                push_text(&mut stack, &unescaped);
            }
            Event::CData(data) => {
                let raw = utf8(&data)?;
                push_text(&mut stack, raw);
            }
            Event::GeneralRef(reference) => {
                let entity = format!("&{};", utf8(&reference)?);
                let resolved = quick_xml::escape::unescape(&entity)
                    .map_err(|e| ApiError::Format(format!("unknown entity {entity}: {e}")))?;
                push_text(&mut stack, &resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ApiError::Format(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ApiError::Format("document has no root element".to_string()))
}

fn utf8(bytes: &[u8]) -> Result<&str, ApiError> {
    std::str::from_utf8(bytes).map_err(|e| ApiError::Format(format!("invalid UTF-8: {e}")))
}

fn open_element(start: &BytesStart<'_>) -> Result<XmlElement, ApiError> {
    let name = utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ApiError::Format(format!("bad attribute on <{name}>: {e}")))?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = quick_xml::escape::unescape(utf8(&attr.value)?)
            .map_err(|e| ApiError::Format(format!("bad entity in attribute '{key}': {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        text: None,
    })
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.text.get_or_insert_with(String::new).push_str(text);
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ApiError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ApiError::Format("document has more than one root".to_string())),
    }
    Ok(())
}

fn expect_root<'a>(root: &'a XmlElement, name: &str) -> Result<&'a XmlElement, ApiError> {
    if root.name == name {
        Ok(root)
    } else {
        Err(ApiError::Format(format!("expected <{name}> root, found <{}>", root.name)))
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|e| ApiError::Format(format!("bad date '{s}': {e}")))
        })
        .transpose()
}

/// Convert an element into a JSON value with plain attribute names.
///
/// An element with only text becomes a string, an empty one `null`, and
/// anything else a mapping of attributes and children, with its text under
/// `"text"`. Repeated children become arrays; children named in
/// `force_list` are always arrays.
pub fn element_to_value(element: &XmlElement, force_list: &[&str]) -> Value {
    if element.attributes.is_empty() && element.children.is_empty() {
        return element
            .text
            .as_ref()
            .map(|t| Value::String(t.clone()))
            .unwrap_or(Value::Null);
    }

    let mut map = Map::new();
    for (key, value) in &element.attributes {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    for child in &element.children {
        let value = element_to_value(child, force_list);
        match map.get_mut(&child.name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if force_list.contains(&child.name.as_str()) => {
                map.insert(child.name.clone(), Value::Array(vec![value]));
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }
    if let Some(text) = &element.text {
        map.insert("text".to_string(), Value::String(text.clone()));
    }
    Value::Object(map)
}

/// `element_to_value` for a whole document, keyed by the root name.
pub fn document_to_value(xml: &str, force_list: &[&str]) -> Result<Value, ApiError> {
    let root = parse_document(xml)?;
    let value = element_to_value(&root, force_list);
    let value = if force_list.contains(&root.name.as_str()) {
        Value::Array(vec![value])
    } else {
        value
    };
    let mut map = Map::new();
    map.insert(root.name, value);
    Ok(Value::Object(map))
}

/// Rows of `employees/{id}/tables/{table}` grouped by employee id, in
/// document order.
pub fn transform_tabular_data(xml: &str) -> Result<TabularData, ApiError> {
    let root = parse_document(xml)?;
    let table = expect_root(&root, "table")?;

    let mut grouped = TabularData::new();
    for row in table.children_named("row") {
        let row_id = row.require_attr("id")?.to_string();
        let employee_id = row.require_attr("employeeId")?.to_string();
        let mut fields = std::collections::BTreeMap::new();
        for field in row.children_named("field") {
            fields.insert(field.require_attr("id")?.to_string(), field.text.clone());
        }
        grouped.entry(employee_id.clone()).or_default().push(TabularRow {
            row_id,
            employee_id,
            fields,
        });
    }
    Ok(grouped)
}

/// The `meta/tables/` document as a JSON value. Tables and fields are
/// always arrays.
pub fn transform_table_data(xml: &str) -> Result<Value, ApiError> {
    document_to_value(xml, &["table", "field"])
}

/// Entries of the who's-out calendar.
pub fn transform_whos_out(xml: &str) -> Result<Vec<WhosOutEntry>, ApiError> {
    let root = parse_document(xml)?;
    let calendar = expect_root(&root, "calendar")?;

    calendar
        .children_named("item")
        .map(|item| {
            let kind = item.require_attr("type")?.to_string();
            let (employee_id, employee_name) = if kind == "timeOff" {
                let employee = item.child("employee");
                (
                    employee.and_then(|e| e.attr("id")).map(str::to_string),
                    employee.and_then(|e| e.text.clone()),
                )
            } else {
                (None, None)
            };
            Ok(WhosOutEntry {
                start: parse_date(item.child_text("start"))?,
                end: parse_date(item.child_text("end"))?,
                kind,
                employee_id,
                employee_name,
            })
        })
        .collect()
}

/// Entries of the `employees/changed/` feed.
pub fn transform_change_list(xml: &str) -> Result<Vec<ChangeEvent>, ApiError> {
    let root = parse_document(xml)?;
    let list = expect_root(&root, "changeList")?;

    list.children_named("employee")
        .map(|employee| {
            let raw = employee.require_attr("lastChanged")?;
            let last_changed = NaiveDateTime::parse_from_str(raw, CHANGE_TIMESTAMP_FORMAT)
                .map_err(|e| ApiError::Format(format!("bad lastChanged '{raw}': {e}")))?
                .and_utc();
            Ok(ChangeEvent {
                id: employee.require_attr("id")?.to_string(),
                action: ChangeAction::from(employee.require_attr("action")?),
                last_changed,
            })
        })
        .collect()
}

/// Flattened entries of the XML `time_off/requests/` listing.
pub fn transform_time_off(xml: &str) -> Result<Vec<TimeOffSummary>, ApiError> {
    let root = parse_document(xml)?;
    let requests = expect_root(&root, "requests")?;

    requests
        .children_named("request")
        .map(|request| {
            let employee = request.child("employee");
            let amount = request.child("amount");
            Ok(TimeOffSummary {
                id: request.attr("id").map(str::to_string),
                employee_id: employee.and_then(|e| e.attr("id")).map(str::to_string),
                employee_name: employee.and_then(|e| e.text.clone()),
                status: request.child_text("status").map(str::to_string),
                kind: request.child_text("type").map(str::to_string),
                amount: amount.and_then(|a| a.text.clone()),
                unit: amount.and_then(|a| a.attr("unit")).map(str::to_string),
                start: parse_date(request.child_text("start"))?,
                end: parse_date(request.child_text("end"))?,
            })
        })
        .collect()
}

/// Categories and files of `employees/{id}/files/view/`.
pub fn transform_employee_files(xml: &str) -> Result<Vec<FileCategory>, ApiError> {
    let root = parse_document(xml)?;
    let employee = expect_root(&root, "employee")?;

    employee
        .children_named("category")
        .map(|category| {
            let files = category
                .children_named("file")
                .map(parse_file)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FileCategory {
                id: category.require_attr("id")?.to_string(),
                name: category.child_text("name").unwrap_or_default().to_string(),
                files,
            })
        })
        .collect()
}

fn parse_file(file: &XmlElement) -> Result<EmployeeFile, ApiError> {
    let size = file
        .child_text("size")
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| ApiError::Format(format!("bad file size '{s}': {e}")))
        })
        .transpose()?;
    Ok(EmployeeFile {
        id: file.require_attr("id")?.to_string(),
        name: file.child_text("name").unwrap_or_default().to_string(),
        original_file_name: file.child_text("originalFileName").map(str::to_string),
        size,
        date_created: file.child_text("dateCreated").map(str::to_string),
        created_by: file.child_text("createdBy").map(str::to_string),
        share_with_employee: file.child_text("shareWithEmployee") == Some("yes"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn parse_builds_tree_with_entities_resolved() {
        let root = parse_document(
            r#"<?xml version="1.0"?><a x="1 &amp; 2"><b>T &amp; C</b><c/><d><![CDATA[<raw>]]></d></a>"#,
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attr("x"), Some("1 & 2"));
        assert_eq!(root.child_text("b"), Some("T & C"));
        assert_eq!(root.child("c").unwrap().text, None);
        assert_eq!(root.child_text("d"), Some("<raw>"));
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        assert!(matches!(parse_document("<a><b></a>"), Err(ApiError::Format(_))));
        assert!(matches!(parse_document("<a>"), Err(ApiError::Format(_))));
        assert!(matches!(parse_document(""), Err(ApiError::Format(_))));
    }

    #[test]
    fn empty_table_yields_empty_map() {
        assert!(transform_tabular_data("<table/>").unwrap().is_empty());
        assert!(transform_tabular_data("<table></table>").unwrap().is_empty());
    }

    #[test]
    fn empty_field_maps_to_none() {
        let xml = r#"<table>
            <row id="1" employeeId="100">
                <field id="customLevel">Senior</field>
                <field id="customNote"></field>
                <field id="customOther"/>
            </row>
        </table>"#;
        let data = transform_tabular_data(xml).unwrap();
        let row = &data["100"][0];
        assert_eq!(row.row_id, "1");
        assert_eq!(row.fields["customLevel"].as_deref(), Some("Senior"));
        assert_eq!(row.fields.get("customNote"), Some(&None));
        assert_eq!(row.fields.get("customOther"), Some(&None));
    }

    #[test]
    fn rows_are_grouped_by_employee() {
        let xml = r#"<table>
            <row id="1" employeeId="100"><field id="a">x</field></row>
            <row id="2" employeeId="200"><field id="a">y</field></row>
        </table>"#;
        let data = transform_tabular_data(xml).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["100"].len(), 1);
        assert_eq!(data["100"][0].row_id, "1");
        assert_eq!(data["200"].len(), 1);
        assert_eq!(data["200"][0].row_id, "2");
        assert_eq!(data["200"][0].employee_id, "200");
    }

    #[test]
    fn rows_keep_document_order_per_employee() {
        let xml = r#"<table>
            <row id="9" employeeId="1"/>
            <row id="3" employeeId="2"/>
            <row id="5" employeeId="1"/>
        </table>"#;
        let data = transform_tabular_data(xml).unwrap();
        let ids: Vec<&str> = data["1"].iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, ["9", "5"]);
    }

    #[test]
    fn row_without_employee_is_a_format_error() {
        let err = transform_tabular_data(r#"<table><row id="1"/></table>"#).unwrap_err();
        assert!(matches!(err, ApiError::Format(_)));
    }

    #[test]
    fn table_metadata_forces_lists() {
        let xml = r#"<tables>
            <table alias="customLevels">
                <field id="4001" alias="customLevel" type="list">Level</field>
            </table>
        </tables>"#;
        let value = transform_table_data(xml).unwrap();
        assert_eq!(
            value,
            json!({"tables": {"table": [{
                "alias": "customLevels",
                "field": [{"id": "4001", "alias": "customLevel", "type": "list", "text": "Level"}]
            }]}})
        );
    }

    #[test]
    fn repeated_children_become_arrays() {
        let xml = r#"<tables>
            <table alias="a"><field id="1">One</field><field id="2">Two</field></table>
            <table alias="b"/>
        </tables>"#;
        let value = transform_table_data(xml).unwrap();
        let tables = value["tables"]["table"].as_array().unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0]["field"][1]["text"], "Two");
        assert_eq!(tables[1], json!({"alias": "b"}));
    }

    #[test]
    fn whos_out_only_time_off_carries_employee() {
        let xml = r#"<calendar>
            <item type="timeOff">
                <request id="1"/>
                <employee id="7">Jon Doe</employee>
                <start>2024-01-01</start>
                <end>2024-01-06</end>
            </item>
            <item type="holiday">
                <holiday id="1">New Year's Day</holiday>
                <start>2024-01-01</start>
                <end>2024-01-01</end>
            </item>
        </calendar>"#;
        let entries = transform_whos_out(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "timeOff");
        assert_eq!(entries[0].employee_id.as_deref(), Some("7"));
        assert_eq!(entries[0].employee_name.as_deref(), Some("Jon Doe"));
        assert_eq!(entries[0].end, NaiveDate::from_ymd_opt(2024, 1, 6));
        assert_eq!(entries[1].kind, "holiday");
        assert!(entries[1].employee_id.is_none());
        assert!(entries[1].employee_name.is_none());
    }

    #[test]
    fn whos_out_empty_calendar() {
        assert!(transform_whos_out("<calendar/>").unwrap().is_empty());
    }

    #[test]
    fn change_list_parses_timestamps() {
        let xml = r#"<changeList latest="2024-06-02T19:26:23+00:00">
            <employee id="1" action="Inserted" lastChanged="2024-06-02T19:26:23+00:00"/>
            <employee id="2" action="Deleted" lastChanged="2024-06-01T00:00:00+00:00"/>
        </changeList>"#;
        let events = transform_change_list(xml).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[0].action, ChangeAction::Inserted);
        assert_eq!(events[0].last_changed, Utc.with_ymd_and_hms(2024, 6, 2, 19, 26, 23).unwrap());
        assert_eq!(events[1].action, ChangeAction::Deleted);
    }

    #[test]
    fn change_list_bad_timestamp_is_a_format_error() {
        let xml = r#"<changeList><employee id="1" action="Updated" lastChanged="2024-06-02 19:26"/></changeList>"#;
        assert!(matches!(transform_change_list(xml), Err(ApiError::Format(_))));
    }

    #[test]
    fn time_off_requests_are_flattened() {
        let xml = r#"<requests>
            <request id="1342">
                <employee id="4">Charlotte Abbott</employee>
                <status lastChanged="2019-09-12" lastChangedByUserId="2369">approved</status>
                <start>2019-05-30</start>
                <end>2019-06-01</end>
                <created>2019-09-11</created>
                <type id="78">Vacation</type>
                <amount unit="hours">24</amount>
                <notes><note from="manager">Home sick with the flu.</note></notes>
            </request>
        </requests>"#;
        let requests = transform_time_off(xml).unwrap();
        assert_eq!(requests.len(), 1);
        let r = &requests[0];
        assert_eq!(r.id.as_deref(), Some("1342"));
        assert_eq!(r.employee_id.as_deref(), Some("4"));
        assert_eq!(r.employee_name.as_deref(), Some("Charlotte Abbott"));
        assert_eq!(r.status.as_deref(), Some("approved"));
        assert_eq!(r.kind.as_deref(), Some("Vacation"));
        assert_eq!(r.amount.as_deref(), Some("24"));
        assert_eq!(r.unit.as_deref(), Some("hours"));
        assert_eq!(r.start, NaiveDate::from_ymd_opt(2019, 5, 30));
    }

    #[test]
    fn employee_files_listing() {
        let xml = r#"<employee id="1">
            <category id="1">
                <name>New Hire Docs</name>
                <file id="1234">
                    <name>New Hire Packet</name>
                    <originalFileName>packet.pdf</originalFileName>
                    <size>23432</size>
                    <dateCreated>2011-06-28 16:31:22</dateCreated>
                    <createdBy>John Doe</createdBy>
                    <shareWithEmployee>yes</shareWithEmployee>
                </file>
            </category>
            <category id="2"><name>Empty</name></category>
        </employee>"#;
        let categories = transform_employee_files(xml).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "New Hire Docs");
        let file = &categories[0].files[0];
        assert_eq!(file.id, "1234");
        assert_eq!(file.size, Some(23432));
        assert!(file.share_with_employee);
        assert!(categories[1].files.is_empty());
    }

    #[test]
    fn wrong_root_is_a_format_error() {
        assert!(matches!(transform_whos_out("<requests/>"), Err(ApiError::Format(_))));
    }
}
