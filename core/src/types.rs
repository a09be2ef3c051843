//! Domain types for the BambooHR API.
//!
//! # Design
//! Employee records and most metadata endpoints are opaque to this crate and
//! stay `serde_json` values. Only the shapes the XML transformer produces,
//! and the inputs the codec encodes, get dedicated structs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// An employee record: field name -> scalar value.
pub type Employee = Map<String, Value>;

/// Rows of a custom table grouped by employee id.
pub type TabularData = BTreeMap<String, Vec<TabularRow>>;

/// Result of `add_employee`, taken from the `Location` response header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEmployee {
    pub url: String,
    pub id: String,
}

/// Photo sizes served by `employees/{id}/photo/{size}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoSize {
    Original,
    Large,
    Medium,
    #[default]
    Small,
    Xs,
    Tiny,
}

impl PhotoSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSize::Original => "original",
            PhotoSize::Large => "large",
            PhotoSize::Medium => "medium",
            PhotoSize::Small => "small",
            PhotoSize::Xs => "xs",
            PhotoSize::Tiny => "tiny",
        }
    }
}

impl FromStr for PhotoSize {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(PhotoSize::Original),
            "large" => Ok(PhotoSize::Large),
            "medium" => Ok(PhotoSize::Medium),
            "small" => Ok(PhotoSize::Small),
            "xs" => Ok(PhotoSize::Xs),
            "tiny" => Ok(PhotoSize::Tiny),
            other => Err(ApiError::Validation(format!("invalid photo size: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeePhoto {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A file category from the employee files listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCategory {
    pub id: String,
    pub name: String,
    pub files: Vec<EmployeeFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFile {
    pub id: String,
    pub name: String,
    pub original_file_name: Option<String>,
    pub size: Option<u64>,
    pub date_created: Option<String>,
    pub created_by: Option<String>,
    pub share_with_employee: bool,
}

/// A local file to attach to an employee record.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub path: PathBuf,
    pub category_id: String,
    pub share_with_employee: bool,
    /// Name shown in BambooHR; defaults to the local file name.
    pub file_name: Option<String>,
}

/// One row of a custom table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRow {
    pub row_id: String,
    pub employee_id: String,
    /// Field id -> text; `None` when the remote field is empty.
    pub fields: BTreeMap<String, Option<String>>,
}

/// What happened to an employee record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    Inserted,
    Updated,
    Deleted,
    #[serde(untagged)]
    Other(String),
}

impl ChangeAction {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeAction::Inserted => "Inserted",
            ChangeAction::Updated => "Updated",
            ChangeAction::Deleted => "Deleted",
            ChangeAction::Other(s) => s,
        }
    }

    /// Value of the `type` query parameter of the changes feed.
    pub fn query_value(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl From<&str> for ChangeAction {
    fn from(s: &str) -> Self {
        match s {
            "Inserted" | "inserted" => ChangeAction::Inserted,
            "Updated" | "updated" => ChangeAction::Updated,
            "Deleted" | "deleted" => ChangeAction::Deleted,
            other => ChangeAction::Other(other.to_string()),
        }
    }
}

/// An entry of the employee changes feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: String,
    pub action: ChangeAction,
    pub last_changed: DateTime<Utc>,
}

/// An entry of the who's-out calendar. `employee_id` and `employee_name`
/// are only set for `timeOff` entries; holidays carry just a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhosOutEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

/// A flattened time-off request from the XML requests listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffSummary {
    pub id: Option<String>,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<String>,
    pub unit: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOffStatus {
    Approved,
    Denied,
    Superceded,
    Requested,
    Canceled,
}

impl TimeOffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOffStatus::Approved => "approved",
            TimeOffStatus::Denied => "denied",
            TimeOffStatus::Superceded => "superceded",
            TimeOffStatus::Requested => "requested",
            TimeOffStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for TimeOffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAuthor {
    Employee,
    Manager,
}

impl NoteAuthor {
    pub fn as_str(self) -> &'static str {
        match self {
            NoteAuthor::Employee => "employee",
            NoteAuthor::Manager => "manager",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffNote {
    pub from: NoteAuthor,
    pub text: String,
}

/// Amount booked on a single day of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffDay {
    pub date: NaiveDate,
    pub amount: String,
}

/// Input for creating or superseding a time-off request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffRequest {
    pub employee_id: String,
    pub status: TimeOffStatus,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub time_off_type_id: String,
    pub amount: String,
    pub notes: Vec<TimeOffNote>,
    pub dates: Vec<TimeOffDay>,
    /// Id of the request this one replaces.
    pub previous_request: Option<String>,
}

/// Query filters for `time_off/requests`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeOffFilter {
    pub id: Option<String>,
    pub action: Option<String>,
    pub employee_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub statuses: Vec<TimeOffStatus>,
    pub type_ids: Vec<String>,
}

impl TimeOffFilter {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.clone()));
        }
        if let Some(action) = &self.action {
            pairs.push(("action", action.clone()));
        }
        if let Some(employee_id) = &self.employee_id {
            pairs.push(("employeeId", employee_id.clone()));
        }
        if let Some(start) = self.start {
            pairs.push(("start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.format("%Y-%m-%d").to_string()));
        }
        if !self.statuses.is_empty() {
            let statuses: Vec<&str> = self.statuses.iter().map(|s| s.as_str()).collect();
            pairs.push(("status", statuses.join(",")));
        }
        if !self.type_ids.is_empty() {
            pairs.push(("type", self.type_ids.join(",")));
        }
        pairs
    }
}

/// Report output formats accepted by the reports endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Pdf,
    Xls,
    Xml,
    Json,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Xls => "xls",
            ReportFormat::Xml => "xml",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "pdf" => Ok(ReportFormat::Pdf),
            "xls" => Ok(ReportFormat::Xls),
            "xml" => Ok(ReportFormat::Xml),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ApiError::Validation(format!("invalid report format: {s}"))),
        }
    }
}

/// A report as returned by the API. JSON reports are decoded; every other
/// format is handed back as raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    Json(Value),
    Raw { content_type: String, data: Vec<u8> },
}
