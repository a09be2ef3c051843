//! Account metadata (`meta/...`).

use serde_json::Value;

use super::{parse_json, xml_body, Accept, BambooClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::xml::transform_table_data;

impl BambooClient {
    pub fn build_get_meta_fields(&self) -> HttpRequest {
        let url = self.url(&["meta", "fields", ""], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    pub fn parse_get_meta_fields(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(self.present(parse_json(&response)?))
    }

    pub fn build_get_meta_lists(&self) -> HttpRequest {
        let url = self.url(&["meta", "lists", ""], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    pub fn parse_get_meta_lists(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(self.present(parse_json(&response)?))
    }

    /// Table definitions; served as XML only.
    pub fn build_get_meta_tables(&self) -> HttpRequest {
        let url = self.url(&["meta", "tables", ""], &[]);
        self.request(HttpMethod::Get, url, Accept::Xml)
    }

    pub fn parse_get_meta_tables(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(self.present(transform_table_data(xml_body(&response)?)?))
    }

    pub fn build_get_meta_users(&self) -> HttpRequest {
        let url = self.url(&["meta", "users", ""], &[]);
        self.request(HttpMethod::Get, url, Accept::Json)
    }

    pub fn parse_get_meta_users(&self, response: HttpResponse) -> Result<Value, ApiError> {
        Ok(self.present(parse_json(&response)?))
    }
}
