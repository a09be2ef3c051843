//! Custom tables (`employees/{id}/tables/{table}`).

use super::{check_status, xml_body, Accept, BambooClient};
use crate::codec::encode_row;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Employee, TabularData};
use crate::xml::transform_tabular_data;

/// Employee id segment that selects every employee.
pub const ALL_EMPLOYEES: &str = "all";

impl BambooClient {
    /// Rows of `table` for one employee, or for everyone when
    /// `employee_id` is `None`.
    pub fn build_get_tabular_data(&self, table: &str, employee_id: Option<&str>) -> HttpRequest {
        let employee_id = employee_id.unwrap_or(ALL_EMPLOYEES);
        let url = self.url(&["employees", employee_id, "tables", table], &[]);
        self.request(HttpMethod::Get, url, Accept::Xml)
    }

    pub fn parse_get_tabular_data(&self, response: HttpResponse) -> Result<TabularData, ApiError> {
        let mut data = transform_tabular_data(xml_body(&response)?)?;
        if self.config.underscore_keys {
            for row in data.values_mut().flatten() {
                let fields = std::mem::take(&mut row.fields);
                row.fields = fields
                    .into_iter()
                    .map(|(k, v)| (self.present_key(k), v))
                    .collect();
            }
        }
        Ok(data)
    }

    /// Append a row. Table fields are not in the employee catalog, so only
    /// key casing is applied.
    pub fn build_add_row(&self, table: &str, employee_id: &str, row: &Employee) -> Result<HttpRequest, ApiError> {
        let row = self.prepare_row(row)?;
        let url = self.url(&["employees", employee_id, "tables", table], &[]);
        Ok(self.xml_request(HttpMethod::Post, url, Accept::Any, encode_row(&row)))
    }

    pub fn parse_add_row(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }

    pub fn build_update_row(
        &self,
        table: &str,
        employee_id: &str,
        row_id: &str,
        row: &Employee,
    ) -> Result<HttpRequest, ApiError> {
        let row = self.prepare_row(row)?;
        let url = self.url(&["employees", employee_id, "tables", table, row_id], &[]);
        Ok(self.xml_request(HttpMethod::Post, url, Accept::Any, encode_row(&row)))
    }

    pub fn parse_update_row(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response)?;
        Ok(true)
    }

    fn prepare_row(&self, row: &Employee) -> Result<Employee, ApiError> {
        if row.is_empty() {
            return Err(ApiError::Validation("row has no fields".to_string()));
        }
        self.prepare_record(row, false)
    }
}
