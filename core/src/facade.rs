//! One method per BambooHR endpoint.
//!
//! # Design
//! `BambooHr` runs `build_* -> Transport::execute -> parse_*` for every
//! operation. Validation failures surface before the transport is called.
//! The optional employee cache is filled only by `get_all_employees` and
//! `reload_employees`; mutating it takes `&mut self`, so a facade shared
//! across threads needs outside synchronisation.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::all_field_names;
use crate::client::{employees_from_report, BambooClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    ChangeAction, ChangeEvent, CreatedEmployee, Employee, EmployeePhoto, FileCategory, FileUpload,
    PhotoSize, ReportFormat, ReportOutput, TabularData, TimeOffFilter, TimeOffRequest,
    TimeOffStatus, TimeOffSummary, WhosOutEntry,
};

const ALL_EMPLOYEES_REPORT: &str = "All Employees";

pub struct BambooHr<T: Transport = UreqTransport> {
    client: BambooClient,
    transport: T,
    employees: Option<HashMap<String, Employee>>,
}

impl BambooHr<UreqTransport> {
    /// Facade over a blocking HTTP transport using `config.timeout`.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> BambooHr<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        Ok(Self {
            client: BambooClient::new(config)?,
            transport,
            employees: None,
        })
    }

    pub fn client(&self) -> &BambooClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(
            %method,
            %url,
            body_len = request.body.as_ref().map_or(0, Vec::len),
            "sending request"
        );
        let response = self.transport.execute(request)?;
        if response.is_success() {
            debug!(%method, %url, status = response.status, "received response");
        } else {
            warn!(%method, %url, status = response.status, "request failed");
        }
        Ok(response)
    }

    pub fn get_employee_directory(&self) -> Result<Vec<Employee>, ApiError> {
        let response = self.send(self.client.build_get_employee_directory())?;
        self.client.parse_get_employee_directory(response)
    }

    /// One employee record. An empty `fields` slice requests every catalog
    /// field.
    pub fn get_employee(&self, employee_id: &str, fields: &[&str]) -> Result<Employee, ApiError> {
        let request = self.client.build_get_employee(employee_id, fields)?;
        self.client.parse_get_employee(self.send(request)?)
    }

    pub fn add_employee(&self, employee: &Employee) -> Result<CreatedEmployee, ApiError> {
        let request = self.client.build_add_employee(employee)?;
        self.client.parse_add_employee(self.send(request)?)
    }

    pub fn update_employee(&self, employee_id: &str, employee: &Employee) -> Result<bool, ApiError> {
        let request = self.client.build_update_employee(employee_id, employee)?;
        self.client.parse_update_employee(self.send(request)?)
    }

    pub fn get_employee_photo(&self, employee_id: &str, size: PhotoSize) -> Result<EmployeePhoto, ApiError> {
        let response = self.send(self.client.build_get_employee_photo(employee_id, size))?;
        self.client.parse_get_employee_photo(response)
    }

    pub fn get_employee_files(&self, employee_id: &str) -> Result<Vec<FileCategory>, ApiError> {
        let response = self.send(self.client.build_get_employee_files(employee_id))?;
        self.client.parse_get_employee_files(response)
    }

    pub fn upload_employee_file(&self, employee_id: &str, upload: &FileUpload) -> Result<bool, ApiError> {
        let request = self.client.build_upload_employee_file(employee_id, upload)?;
        self.client.parse_upload_employee_file(self.send(request)?)
    }

    pub fn get_employee_changes(
        &self,
        since: DateTime<Utc>,
        action: Option<&ChangeAction>,
    ) -> Result<Vec<ChangeEvent>, ApiError> {
        let response = self.send(self.client.build_get_employee_changes(since, action))?;
        self.client.parse_get_employee_changes(response)
    }

    pub fn get_tabular_data(&self, table: &str, employee_id: Option<&str>) -> Result<TabularData, ApiError> {
        let response = self.send(self.client.build_get_tabular_data(table, employee_id))?;
        self.client.parse_get_tabular_data(response)
    }

    pub fn add_row(&self, table: &str, employee_id: &str, row: &Employee) -> Result<bool, ApiError> {
        let request = self.client.build_add_row(table, employee_id, row)?;
        self.client.parse_add_row(self.send(request)?)
    }

    pub fn update_row(&self, table: &str, employee_id: &str, row_id: &str, row: &Employee) -> Result<bool, ApiError> {
        let request = self.client.build_update_row(table, employee_id, row_id, row)?;
        self.client.parse_update_row(self.send(request)?)
    }

    pub fn get_meta_fields(&self) -> Result<Value, ApiError> {
        let response = self.send(self.client.build_get_meta_fields())?;
        self.client.parse_get_meta_fields(response)
    }

    pub fn get_meta_lists(&self) -> Result<Value, ApiError> {
        let response = self.send(self.client.build_get_meta_lists())?;
        self.client.parse_get_meta_lists(response)
    }

    pub fn get_meta_tables(&self) -> Result<Value, ApiError> {
        let response = self.send(self.client.build_get_meta_tables())?;
        self.client.parse_get_meta_tables(response)
    }

    pub fn get_meta_users(&self) -> Result<Value, ApiError> {
        let response = self.send(self.client.build_get_meta_users())?;
        self.client.parse_get_meta_users(response)
    }

    /// Run a saved report. When `output_file` is given the raw response body
    /// is also written there.
    pub fn request_company_report(
        &self,
        report_id: &str,
        format: ReportFormat,
        filter_duplicates: bool,
        output_file: Option<&Path>,
    ) -> Result<ReportOutput, ApiError> {
        let request = self
            .client
            .build_request_company_report(report_id, format, filter_duplicates);
        self.run_report(request, format, output_file)
    }

    pub fn request_custom_report(
        &self,
        fields: &[&str],
        format: ReportFormat,
        title: Option<&str>,
        last_changed: Option<DateTime<Utc>>,
        output_file: Option<&Path>,
    ) -> Result<ReportOutput, ApiError> {
        let request = self
            .client
            .build_request_custom_report(fields, format, title, last_changed)?;
        self.run_report(request, format, output_file)
    }

    fn run_report(
        &self,
        request: HttpRequest,
        format: ReportFormat,
        output_file: Option<&Path>,
    ) -> Result<ReportOutput, ApiError> {
        let response = self.send(request)?;
        let raw = output_file.map(|_| response.body.clone());
        let output = self.client.parse_report(response, format)?;
        if let (Some(path), Some(raw)) = (output_file, raw) {
            let mut file = File::create(path)?;
            file.write_all(&raw)?;
            file.flush()?;
            debug!(path = %path.display(), bytes = raw.len(), "report written");
        }
        Ok(output)
    }

    /// Every employee with every catalog field, served from the cache once
    /// it has been filled.
    pub fn get_all_employees(&mut self) -> Result<&HashMap<String, Employee>, ApiError> {
        match self.employees {
            Some(ref employees) => Ok(employees),
            None => self.reload_employees(),
        }
    }

    /// Refill the cache from a fresh custom report.
    pub fn reload_employees(&mut self) -> Result<&HashMap<String, Employee>, ApiError> {
        let fields: Vec<&str> = all_field_names().collect();
        let report = self.request_custom_report(
            &fields,
            ReportFormat::Json,
            Some(ALL_EMPLOYEES_REPORT),
            None,
            None,
        )?;
        let mut employees = HashMap::new();
        for employee in employees_from_report(&report)? {
            let id = match employee.get("id") {
                Some(Value::String(id)) => id.clone(),
                Some(Value::Number(id)) => id.to_string(),
                _ => return Err(ApiError::Format("report row has no id".to_string())),
            };
            employees.insert(id, employee);
        }
        debug!(count = employees.len(), "employee cache filled");
        Ok(&*self.employees.insert(employees))
    }

    /// A cached employee; `None` when absent or the cache was never filled.
    pub fn cached_employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.as_ref()?.get(employee_id)
    }

    pub fn get_whos_out(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<WhosOutEntry>, ApiError> {
        let request = self.client.build_get_whos_out(start, end)?;
        self.client.parse_get_whos_out(self.send(request)?)
    }

    pub fn get_time_off_requests(&self, filter: &TimeOffFilter) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.client.build_get_time_off_requests(filter))?;
        self.client.parse_get_time_off_requests(response)
    }

    pub fn get_time_off_summaries(&self, filter: &TimeOffFilter) -> Result<Vec<TimeOffSummary>, ApiError> {
        let response = self.send(self.client.build_get_time_off_summaries(filter))?;
        self.client.parse_get_time_off_summaries(response)
    }

    pub fn get_time_off_policies(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.client.build_get_time_off_policies())?;
        self.client.parse_get_time_off_policies(response)
    }

    pub fn get_time_off_types(&self) -> Result<Vec<Value>, ApiError> {
        let response = self.send(self.client.build_get_time_off_types())?;
        self.client.parse_get_time_off_types(response)
    }

    pub fn create_time_off_request(&self, request: &TimeOffRequest) -> Result<Value, ApiError> {
        let http = self.client.build_create_time_off_request(request)?;
        self.client.parse_time_off_request(self.send(http)?)
    }

    pub fn update_time_off_request(&self, request: &TimeOffRequest) -> Result<Value, ApiError> {
        let http = self.client.build_update_time_off_request(request)?;
        self.client.parse_time_off_request(self.send(http)?)
    }

    pub fn update_time_off_request_status(
        &self,
        request_id: &str,
        status: TimeOffStatus,
        note: Option<&str>,
    ) -> Result<bool, ApiError> {
        let http = self
            .client
            .build_update_time_off_request_status(request_id, status, note)?;
        self.client.parse_update_time_off_request_status(self.send(http)?)
    }
}
