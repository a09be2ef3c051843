//! Time off: who's out, requests, policies and types.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{check_status, parse_json, xml_body, Accept, BambooClient, JSON};
use crate::codec::encode_time_off_request;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TimeOffFilter, TimeOffRequest, TimeOffStatus, TimeOffSummary, WhosOutEntry};
use crate::xml::{transform_time_off, transform_whos_out};

impl BambooClient {
    /// Who's out between `start` and `end`. The gateway defaults to the next
    /// two weeks when either bound is missing.
    pub fn build_get_whos_out(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<HttpRequest, ApiError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ApiError::Validation(format!("end {end} is before start {start}")));
            }
        }
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(("start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = end {
            query.push(("end", end.format("%Y-%m-%d").to_string()));
        }
        let url = self.url(&["time_off", "whos_out", ""], &query);
        Ok(self.request(HttpMethod::Get, url, Accept::Xml))
    }

    pub fn parse_get_whos_out(&self, response: HttpResponse) -> Result<Vec<WhosOutEntry>, ApiError> {
        transform_whos_out(xml_body(&response)?)
    }

    /// Full time-off requests as JSON.
    pub fn build_get_time_off_requests(&self, filter: &TimeOffFilter) -> HttpRequest {
        let url = self.url(&["time_off", "requests", ""], &filter.query_pairs());
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    pub fn parse_get_time_off_requests(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        match self.present(parse_json(&response)?) {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ApiError::Format(format!("time off requests is not an array: {other}"))),
        }
    }

    /// The same listing as XML, flattened to one summary per request.
    pub fn build_get_time_off_summaries(&self, filter: &TimeOffFilter) -> HttpRequest {
        let url = self.url(&["time_off", "requests", ""], &filter.query_pairs());
        self.request(HttpMethod::Get, url, Accept::Xml)
    }

    pub fn parse_get_time_off_summaries(&self, response: HttpResponse) -> Result<Vec<TimeOffSummary>, ApiError> {
        transform_time_off(xml_body(&response)?)
    }

    pub fn build_get_time_off_policies(&self) -> HttpRequest {
        let url = self.url(&["meta", "time_off", "policies"], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    pub fn parse_get_time_off_policies(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        match self.present(parse_json(&response)?) {
            Value::Array(items) => Ok(items),
            other => Err(ApiError::Format(format!("time off policies is not an array: {other}"))),
        }
    }

    pub fn build_get_time_off_types(&self) -> HttpRequest {
        let url = self.url(&["meta", "time_off", "types"], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    /// The `timeOffTypes` array of the response.
    pub fn parse_get_time_off_types(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        let body = parse_json(&response)?;
        match body.get("timeOffTypes") {
            Some(Value::Array(items)) => Ok(items.iter().cloned().map(|v| self.present(v)).collect()),
            _ => Err(ApiError::Format("response has no timeOffTypes array".to_string())),
        }
    }

    /// Submit a new request for `request.employee_id`.
    pub fn build_create_time_off_request(&self, request: &TimeOffRequest) -> Result<HttpRequest, ApiError> {
        validate_time_off_request(request)?;
        let url = self.url(&["employees", request.employee_id.as_str(), "time_off", "request"], &[]);
        Ok(self.xml_request(HttpMethod::Put, url, Accept::Json, encode_time_off_request(request)))
    }

    /// Replace an existing request; `previous_request` must name it.
    pub fn build_update_time_off_request(&self, request: &TimeOffRequest) -> Result<HttpRequest, ApiError> {
        if request.previous_request.as_deref().is_none_or(str::is_empty) {
            return Err(ApiError::Validation("updating a request needs previous_request".to_string()));
        }
        self.build_create_time_off_request(request)
    }

    /// The request as stored by the gateway.
    pub fn parse_time_off_request(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(self.present(parse_json(&response)?))
    }

    pub fn build_update_time_off_request_status(
        &self,
        request_id: &str,
        status: TimeOffStatus,
        note: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let mut body = json!({ "status": status.as_str() });
        if let Some(note) = note {
            body["note"] = Value::String(note.to_string());
        }
        let body = serde_json::to_vec(&body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let url = self.url(&["time_off", "requests", request_id, "status"], &[]);
        Ok(self.request_with_body(HttpMethod::Put, url, Accept::Json, JSON, body))
    }

    pub fn parse_update_time_off_request_status(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }
}

fn validate_time_off_request(request: &TimeOffRequest) -> Result<(), ApiError> {
    if request.employee_id.trim().is_empty() {
        return Err(ApiError::Validation("time off request needs an employee id".to_string()));
    }
    if request.time_off_type_id.trim().is_empty() {
        return Err(ApiError::Validation("time off request needs a type id".to_string()));
    }
    if request.end < request.start {
        return Err(ApiError::Validation(format!(
            "end {} is before start {}",
            request.end, request.start
        )));
    }
    if let Some(day) = request
        .dates
        .iter()
        .find(|d| d.date < request.start || d.date > request.end)
    {
        return Err(ApiError::Validation(format!("date {} is outside the request", day.date)));
    }
    Ok(())
}
