//! Stateless HTTP request builder and response parser for the BambooHR API.
//!
//! # Design
//! `BambooClient` holds only the validated configuration and never touches
//! the network. Every endpoint is split into a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming an `HttpResponse`; the
//! facade (or any other caller) executes the round-trip in between. Input
//! validation happens in `build_*`, so a rejected call never reaches the
//! transport.

mod employees;
mod meta;
mod reports;
mod tables;
mod time_off;

pub use reports::employees_from_report;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;
use url::Url;

use crate::casing::{convert_map, to_camel, underscore_keys};
use crate::catalog::validate_fields;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Employee;

const JSON: &str = "application/json";
const XML: &str = "application/xml";
const XML_BODY: &str = "text/xml";

/// What the request asks the gateway to respond with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    Json,
    Xml,
    Any,
}

/// Synchronous, stateless client for the BambooHR API.
#[derive(Debug, Clone)]
pub struct BambooClient {
    config: ClientConfig,
    root: Url,
    authorization: String,
}

impl BambooClient {
    /// Validate `config` and precompute the API root and auth header.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let root = Url::parse(&config.api_root())
            .map_err(|e| ApiError::Config(format!("invalid API root: {e}")))?;
        if root.cannot_be_a_base() {
            return Err(ApiError::Config(format!("invalid API root: {root}")));
        }
        // BambooHR uses the API key as user name with an empty password.
        let authorization = format!("Basic {}", STANDARD.encode(format!("{}:", config.api_key)));
        Ok(Self {
            config,
            root,
            authorization,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for `segments` below the API root. An empty last segment
    /// produces a trailing slash.
    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> String {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url.into()
    }

    fn request(&self, method: HttpMethod, url: String, accept: Accept) -> HttpRequest {
        let mut headers = vec![("authorization".to_string(), self.authorization.clone())];
        match accept {
            Accept::Json => headers.push(("accept".to_string(), JSON.to_string())),
            Accept::Xml => headers.push(("accept".to_string(), XML.to_string())),
            Accept::Any => {}
        }
        HttpRequest {
            method,
            url,
            headers,
            body: None,
        }
    }

    fn request_with_body(
        &self,
        method: HttpMethod,
        url: String,
        accept: Accept,
        content_type: &str,
        body: Vec<u8>,
    ) -> HttpRequest {
        let mut request = self.request(method, url, accept);
        request
            .headers
            .push(("content-type".to_string(), content_type.to_string()));
        request.body = Some(body);
        request
    }

    fn xml_request(&self, method: HttpMethod, url: String, accept: Accept, xml: String) -> HttpRequest {
        self.request_with_body(method, url, accept, XML_BODY, xml.into_bytes())
    }

    /// Bring caller-supplied field names to the wire's camelCase.
    fn wire_name(&self, name: &str) -> String {
        if self.config.underscore_keys {
            to_camel(name)
        } else {
            name.to_string()
        }
    }

    /// Field list converted to wire names and checked against the catalog.
    fn prepare_field_list(&self, fields: &[&str]) -> Result<Vec<String>, ApiError> {
        let names: Vec<String> = fields.iter().map(|f| self.wire_name(f)).collect();
        if self.config.verify_fields {
            validate_fields(names.iter().map(String::as_str))?;
        }
        Ok(names)
    }

    /// Record converted to wire keys; catalog-checked when `verify` is set
    /// and field verification is enabled.
    fn prepare_record(&self, record: &Employee, verify: bool) -> Result<Employee, ApiError> {
        let record = if self.config.underscore_keys {
            convert_map(record.clone(), &to_camel)
        } else {
            record.clone()
        };
        if verify && self.config.verify_fields {
            validate_fields(record.keys().map(String::as_str))?;
        }
        Ok(record)
    }

    /// Apply the configured key casing to a decoded response.
    fn present(&self, value: Value) -> Value {
        if self.config.underscore_keys {
            underscore_keys(value)
        } else {
            value
        }
    }

    fn present_key(&self, key: String) -> String {
        if self.config.underscore_keys {
            crate::casing::to_snake(&key)
        } else {
            key
        }
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.text(),
    })
}

/// Decode a JSON body. An empty body decodes to `null`.
fn parse_json(response: &HttpResponse) -> Result<Value, ApiError> {
    check_status(response)?;
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Body of a successful XML response.
fn xml_body(response: &HttpResponse) -> Result<&str, ApiError> {
    check_status(response)?;
    std::str::from_utf8(&response.body).map_err(|e| ApiError::Format(format!("XML body is not UTF-8: {e}")))
}
