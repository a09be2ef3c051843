//! Company and custom reports.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{check_status, parse_json, Accept, BambooClient};
use crate::codec::encode_report;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Employee, ReportFormat, ReportOutput};

pub const DEFAULT_REPORT_TITLE: &str = "My Custom Report";

impl BambooClient {
    /// A saved company report. `filter_duplicates` maps to `fd=yes|no`.
    pub fn build_request_company_report(
        &self,
        report_id: &str,
        format: ReportFormat,
        filter_duplicates: bool,
    ) -> HttpRequest {
        let query = [
            ("format", format.as_str().to_string()),
            ("fd", (if filter_duplicates { "yes" } else { "no" }).to_string()),
        ];
        let url = self.url(&["reports", report_id], &query);
        self.request(HttpMethod::Get, url, report_accept(format))
    }

    /// An ad-hoc report over `fields`, optionally limited to records changed
    /// after `last_changed`.
    pub fn build_request_custom_report(
        &self,
        fields: &[&str],
        format: ReportFormat,
        title: Option<&str>,
        last_changed: Option<DateTime<Utc>>,
    ) -> Result<HttpRequest, ApiError> {
        if fields.is_empty() {
            return Err(ApiError::Validation("a custom report needs at least one field".to_string()));
        }
        let fields = self.prepare_field_list(fields)?;
        let xml = encode_report(&fields, title.unwrap_or(DEFAULT_REPORT_TITLE), format, last_changed);
        let url = self.url(&["reports", "custom", ""], &[("format", format.as_str().to_string())]);
        Ok(self.xml_request(HttpMethod::Post, url, report_accept(format), xml))
    }

    /// Decode a JSON report, or hand back the raw bytes of any other format.
    pub fn parse_report(&self, response: HttpResponse, format: ReportFormat) -> Result<ReportOutput, ApiError> {
        if format == ReportFormat::Json {
            return Ok(ReportOutput::Json(self.present(parse_json(&response)?)));
        }
        check_status(&response)?;
        let content_type = response
            .header("content-type")
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(ReportOutput::Raw {
            content_type,
            data: response.body,
        })
    }
}

fn report_accept(format: ReportFormat) -> Accept {
    if format == ReportFormat::Json {
        Accept::Json
    } else {
        Accept::Any
    }
}

/// Employee records of a JSON report, in report order.
pub fn employees_from_report(report: &ReportOutput) -> Result<Vec<Employee>, ApiError> {
    let ReportOutput::Json(value) = report else {
        return Err(ApiError::Format("report is not JSON".to_string()));
    };
    match value.get("employees") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .ok_or_else(|| ApiError::Format(format!("report row is not an object: {item}")))
            })
            .collect(),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(other) => Err(ApiError::Format(format!("report employees is not an array: {other}"))),
    }
}
