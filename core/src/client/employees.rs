//! Employee directory, records, photos, files and the changes feed.

use std::fs::File;
use std::io::Read;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{check_status, parse_json, xml_body, Accept, BambooClient};
use crate::catalog::all_field_names;
use crate::codec::{encode_employee, REPORT_TIMESTAMP_FORMAT};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartForm;
use crate::types::{
    ChangeAction, ChangeEvent, CreatedEmployee, Employee, EmployeePhoto, FileCategory, FileUpload,
    PhotoSize,
};
use crate::xml::{transform_change_list, transform_employee_files};

const REQUIRED_ON_CREATE: [&str; 2] = ["firstName", "lastName"];

impl BambooClient {
    pub fn build_get_employee_directory(&self) -> HttpRequest {
        let url = self.url(&["employees", "directory"], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    /// The `employees` array of the directory.
    pub fn parse_get_employee_directory(&self, response: HttpResponse) -> Result<Vec<Employee>, ApiError> {
        let directory = parse_json(&response)?;
        match directory.get("employees") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match self.present(item.clone()) {
                    Value::Object(map) => Ok(map),
                    other => Err(ApiError::Format(format!("directory entry is not an object: {other}"))),
                })
                .collect(),
            _ => Err(ApiError::Format("directory has no employees array".to_string())),
        }
    }

    /// Fetch one employee. An empty `fields` list asks for every catalog
    /// field.
    pub fn build_get_employee(&self, employee_id: &str, fields: &[&str]) -> Result<HttpRequest, ApiError> {
        let fields = if fields.is_empty() {
            all_field_names().map(str::to_string).collect()
        } else {
            self.prepare_field_list(fields)?
        };
        let mut query = vec![("fields", fields.join(","))];
        if !self.config.only_current {
            query.push(("onlyCurrent", "false".to_string()));
        }
        let url = self.url(&["employees", employee_id], &query);
        Ok(self.request(HttpMethod::Get, url, Accept::Json))
    }

    pub fn parse_get_employee(&self, response: HttpResponse) -> Result<Employee, ApiError> {
        match self.present(parse_json(&response)?) {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::Format(format!("employee is not an object: {other}"))),
        }
    }

    /// Create an employee. `firstName` and `lastName` are mandatory.
    pub fn build_add_employee(&self, employee: &Employee) -> Result<HttpRequest, ApiError> {
        let employee = self.prepare_record(employee, true)?;
        for required in REQUIRED_ON_CREATE {
            let present = employee
                .get(required)
                .and_then(Value::as_str)
                .is_some_and(|v| !v.trim().is_empty());
            if !present {
                return Err(ApiError::Validation(format!("'{required}' is required")));
            }
        }
        let url = self.url(&["employees", ""], &[]);
        Ok(self.xml_request(HttpMethod::Post, url, Accept::Any, encode_employee(&employee)))
    }

    /// The new employee's URL and id, from the `Location` header.
    pub fn parse_add_employee(&self, response: HttpResponse) -> Result<CreatedEmployee, ApiError> {
        check_status(&response)?;
        let location = response
            .header("location")
            .ok_or_else(|| ApiError::Format("create response has no Location header".to_string()))?;
        let id = location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if id.is_empty() {
            return Err(ApiError::Format(format!("no employee id in Location '{location}'")));
        }
        Ok(CreatedEmployee {
            url: location.to_string(),
            id,
        })
    }

    pub fn build_update_employee(&self, employee_id: &str, employee: &Employee) -> Result<HttpRequest, ApiError> {
        let employee = self.prepare_record(employee, true)?;
        let url = self.url(&["employees", employee_id], &[]);
        Ok(self.xml_request(HttpMethod::Post, url, Accept::Any, encode_employee(&employee)))
    }

    /// `true` once the gateway accepted the update.
    pub fn parse_update_employee(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }

    pub fn build_get_employee_photo(&self, employee_id: &str, size: PhotoSize) -> HttpRequest {
        let url = self.url(&["employees", employee_id, "photo", size.as_str()], &[]);
        self.request(HttpMethod::Get, url, Accept::Any)
    }

    pub fn parse_get_employee_photo(&self, response: HttpResponse) -> Result<EmployeePhoto, ApiError> {
        check_status(&response)?;
        let content_type = response
            .header("content-type")
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(EmployeePhoto {
            content_type,
            data: response.body,
        })
    }

    pub fn build_get_employee_files(&self, employee_id: &str) -> HttpRequest {
        let url = self.url(&["employees", employee_id, "files", "view", ""], &[]);
        self.request(HttpMethod::Get, url, Accept::Xml)
    }

    pub fn parse_get_employee_files(&self, response: HttpResponse) -> Result<Vec<FileCategory>, ApiError> {
        transform_employee_files(xml_body(&response)?)
    }

    /// Multipart upload of a local file. The file is read and closed before
    /// this returns.
    pub fn build_upload_employee_file(&self, employee_id: &str, upload: &FileUpload) -> Result<HttpRequest, ApiError> {
        let local_name = upload
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::Validation(format!("not a file path: {}", upload.path.display())))?
            .to_string();
        let data = {
            let mut file = File::open(&upload.path)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            data
        };

        let mut form = MultipartForm::new();
        form.text("category", &upload.category_id);
        form.text("fileName", upload.file_name.as_deref().unwrap_or(&local_name));
        form.text("share", if upload.share_with_employee { "yes" } else { "no" });
        form.file("file", &local_name, data);

        let url = self.url(&["employees", employee_id, "files"], &[]);
        let content_type = form.content_type();
        Ok(self.request_with_body(HttpMethod::Post, url, Accept::Any, &content_type, form.finish()))
    }

    pub fn parse_upload_employee_file(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }

    /// Employees changed since `since`, optionally only one kind of change.
    pub fn build_get_employee_changes(&self, since: DateTime<Utc>, action: Option<&ChangeAction>) -> HttpRequest {
        let mut query = vec![("since", since.format(REPORT_TIMESTAMP_FORMAT).to_string())];
        if let Some(action) = action {
            query.push(("type", action.query_value()));
        }
        let url = self.url(&["employees", "changed", ""], &query);
        self.request(HttpMethod::Get, url, Accept::Xml)
    }

    pub fn parse_get_employee_changes(&self, response: HttpResponse) -> Result<Vec<ChangeEvent>, ApiError> {
        transform_change_list(xml_body(&response)?)
    }
}
