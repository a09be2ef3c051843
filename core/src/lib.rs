//! Synchronous client for the BambooHR REST API.
//!
//! # Overview
//! `BambooClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. `BambooHr` pairs it with a
//! `Transport` and exposes one method per endpoint. Much of the API speaks
//! XML, so the crate carries its own field codec (`codec`) and response
//! transformer (`xml`), plus a key-case converter (`casing`) for callers who
//! prefer snake_case keys.
//!
//! # Design
//! - `BambooClient` is stateless; it holds only the validated `ClientConfig`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and testable without a server.
//! - Field names are checked against the static `catalog` before any request
//!   leaves the process.
//! - Records are `serde_json` maps; the API returns arbitrary custom fields.

pub mod casing;
pub mod catalog;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
pub mod http;
mod multipart;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::BambooClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use facade::BambooHr;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{
    ChangeAction, ChangeEvent, CreatedEmployee, Employee, PhotoSize, ReportFormat, ReportOutput,
    TabularData, TabularRow, TimeOffFilter, TimeOffRequest, TimeOffStatus, WhosOutEntry,
};
