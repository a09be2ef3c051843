//! In-memory stand-in for the BambooHR API gateway.
//!
//! Serves `/api/gateway.php/{company}/v1/...` with canned JSON and XML
//! documents shaped like the real service. Employee records and table rows
//! live in memory, so writes are visible to later reads.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use quick_xml::{
    escape::unescape,
    events::{BytesStart, Event},
    Reader,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Updates to this employee are refused with 403, like the account owner
/// record on a real account.
pub const LOCKED_EMPLOYEE_ID: &str = "100";

const FIRST_NEW_EMPLOYEE_ID: u64 = 333;
const JPEG_STUB: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xff, 0xd9];
const PHOTO_SIZES: [&str; 6] = ["original", "large", "medium", "small", "xs", "tiny"];
const REPORT_FORMATS: [&str; 5] = ["csv", "pdf", "xls", "xml", "json"];
const DIRECTORY_FIELDS: [&str; 6] = ["id", "displayName", "firstName", "lastName", "workEmail", "jobTitle"];

#[derive(Clone, Debug)]
struct TableRow {
    id: String,
    employee_id: String,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
struct TimeOffEntry {
    id: String,
    employee_id: String,
    name: String,
    status: String,
    type_id: String,
    type_name: String,
    amount: String,
    start: String,
    end: String,
}

#[derive(Debug)]
pub struct Account {
    employees: BTreeMap<String, Map<String, Value>>,
    tables: BTreeMap<String, Vec<TableRow>>,
    time_off: Vec<TimeOffEntry>,
    uploads: Vec<(String, String)>,
    next_employee_id: u64,
    next_row_id: u64,
    next_request_id: u64,
}

impl Account {
    fn seeded() -> Self {
        let mut employees = BTreeMap::new();
        for (id, first, last, email, title) in [
            ("100", "Account", "Owner", "owner@example.com", "Administrator"),
            ("123", "Test", "Person", "test.person@example.com", "Engineer"),
            ("124", "Someother", "Guy", "someother.guy@example.com", "Designer"),
        ] {
            let record = json!({
                "id": id,
                "firstName": first,
                "lastName": last,
                "displayName": format!("{first} {last}"),
                "workEmail": email,
                "jobTitle": title,
                "status": "Active",
            });
            if let Value::Object(map) = record {
                employees.insert(id.to_string(), map);
            }
        }

        let mut tables = BTreeMap::new();
        tables.insert(
            "customLevels".to_string(),
            vec![
                TableRow {
                    id: "1".to_string(),
                    employee_id: "123".to_string(),
                    fields: vec![
                        ("customLevel".to_string(), "Senior".to_string()),
                        ("customNote".to_string(), String::new()),
                    ],
                },
                TableRow {
                    id: "2".to_string(),
                    employee_id: "124".to_string(),
                    fields: vec![
                        ("customLevel".to_string(), "Junior".to_string()),
                        ("customNote".to_string(), "Probation".to_string()),
                    ],
                },
            ],
        );
        tables.insert("jobInfo".to_string(), Vec::new());

        let time_off = vec![
            TimeOffEntry {
                id: "1342".to_string(),
                employee_id: "123".to_string(),
                name: "Test Person".to_string(),
                status: "approved".to_string(),
                type_id: "78".to_string(),
                type_name: "Vacation".to_string(),
                amount: "24".to_string(),
                start: "2024-05-29".to_string(),
                end: "2024-05-31".to_string(),
            },
            TimeOffEntry {
                id: "1343".to_string(),
                employee_id: "124".to_string(),
                name: "Someother Guy".to_string(),
                status: "requested".to_string(),
                type_id: "77".to_string(),
                type_name: "Sick".to_string(),
                amount: "8".to_string(),
                start: "2024-06-03".to_string(),
                end: "2024-06-03".to_string(),
            },
        ];

        Self {
            employees,
            tables,
            time_off,
            uploads: Vec::new(),
            next_employee_id: FIRST_NEW_EMPLOYEE_ID,
            next_row_id: 3,
            next_request_id: 1500,
        }
    }
}

pub type Db = Arc<RwLock<Account>>;

type Params = Query<HashMap<String, String>>;

fn api(path: &str) -> String {
    format!("/api/gateway.php/{{company}}/v1{path}")
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Account::seeded()));
    Router::new()
        .route(&api("/employees/directory"), get(directory))
        .route(&api("/employees/"), post(create_employee))
        .route(&api("/employees/changed/"), get(changed_employees))
        .route(&api("/employees/{id}"), get(get_employee).post(update_employee))
        .route(&api("/employees/{id}/photo/{size}"), get(employee_photo))
        .route(&api("/employees/{id}/files/view/"), get(employee_files))
        .route(&api("/employees/{id}/files"), post(upload_file))
        .route(&api("/employees/{id}/tables/{table}"), get(table_rows).post(add_row))
        .route(&api("/employees/{id}/tables/{table}/{row}"), post(update_row))
        .route(&api("/employees/{id}/time_off/request"), put(time_off_request))
        .route(&api("/meta/fields/"), get(meta_fields))
        .route(&api("/meta/lists/"), get(meta_lists))
        .route(&api("/meta/tables/"), get(meta_tables))
        .route(&api("/meta/users/"), get(meta_users))
        .route(&api("/meta/time_off/policies"), get(time_off_policies))
        .route(&api("/meta/time_off/types"), get(time_off_types))
        .route(&api("/reports/custom/"), post(custom_report))
        .route(&api("/reports/{id}"), get(company_report))
        .route(&api("/time_off/whos_out/"), get(whos_out))
        .route(&api("/time_off/requests/"), get(time_off_requests))
        .route(&api("/time_off/requests/{id}/status"), put(time_off_status))
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic ") && v.len() > "Basic ".len());
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

fn wants_xml(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("xml"))
}

// --- employees ---

async fn directory(State(db): State<Db>) -> Json<Value> {
    let account = db.read().await;
    let employees: Vec<Value> = account
        .employees
        .values()
        .map(|e| {
            let entry: Map<String, Value> = DIRECTORY_FIELDS
                .iter()
                .map(|f| (f.to_string(), e.get(*f).cloned().unwrap_or(Value::Null)))
                .collect();
            Value::Object(entry)
        })
        .collect();
    Json(json!({
        "fields": [
            {"id": "displayName", "type": "text", "name": "Display name"},
            {"id": "firstName", "type": "text", "name": "First name"},
            {"id": "lastName", "type": "text", "name": "Last name"},
            {"id": "workEmail", "type": "email", "name": "Work Email"},
            {"id": "jobTitle", "type": "list", "name": "Job title"},
        ],
        "employees": employees,
    }))
}

async fn get_employee(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    let account = db.read().await;
    let employee = account.employees.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let mut out = Map::new();
    out.insert("id".to_string(), Value::String(id.clone()));
    for field in params.get("fields").map(String::as_str).unwrap_or("").split(',') {
        if !field.is_empty() && field != "id" {
            out.insert(field.to_string(), employee.get(field).cloned().unwrap_or(Value::Null));
        }
    }
    Ok(Json(Value::Object(out)))
}

async fn create_employee(
    State(db): State<Db>,
    Path(company): Path<String>,
    body: String,
) -> Response {
    if !body.trim_start().starts_with("<employee>") {
        return (StatusCode::BAD_REQUEST, "expected an <employee> document").into_response();
    }
    let fields = field_values(&body);
    let has = |name: &str| fields.iter().any(|(id, v)| id == name && !v.trim().is_empty());
    if !has("firstName") || !has("lastName") {
        return (StatusCode::BAD_REQUEST, "firstName and lastName are required").into_response();
    }

    let mut account = db.write().await;
    let id = account.next_employee_id.to_string();
    account.next_employee_id += 1;
    let mut record = Map::new();
    record.insert("id".to_string(), Value::String(id.clone()));
    for (name, value) in fields {
        record.insert(name, Value::String(value));
    }
    account.employees.insert(id.clone(), record);
    tracing::info!(%id, "employee created");

    let location = format!("/api/gateway.php/{company}/v1/employees/{id}");
    (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
}

async fn update_employee(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    body: String,
) -> StatusCode {
    if id == LOCKED_EMPLOYEE_ID {
        return StatusCode::FORBIDDEN;
    }
    let mut account = db.write().await;
    let Some(record) = account.employees.get_mut(&id) else {
        return StatusCode::NOT_FOUND;
    };
    for (name, value) in field_values(&body) {
        record.insert(name, Value::String(value));
    }
    tracing::info!(%id, "employee updated");
    StatusCode::OK
}

async fn employee_photo(
    State(db): State<Db>,
    Path((_company, id, size)): Path<(String, String, String)>,
) -> Response {
    if !PHOTO_SIZES.contains(&size.as_str()) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if !db.read().await.employees.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/jpeg")], JPEG_STUB).into_response()
}

async fn employee_files(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
) -> Response {
    let account = db.read().await;
    if !account.employees.contains_key(&id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut out = format!(
        "<employee id=\"{id}\"><category id=\"1\"><name>Signed Documents</name>\
         <file id=\"1234\"><name>Employee Handbook</name><originalFileName>handbook.pdf</originalFileName>\
         <size>23552</size><dateCreated>2024-01-05 16:13:05</dateCreated><createdBy>Account Owner</createdBy>\
         <shareWithEmployee>yes</shareWithEmployee></file></category><category id=\"2\"><name>Uploads</name>"
    );
    for (n, (owner, name)) in account.uploads.iter().enumerate() {
        if owner == &id {
            out.push_str(&format!(
                "<file id=\"{}\"><name>{}</name><shareWithEmployee>no</shareWithEmployee></file>",
                2000 + n,
                escape(name)
            ));
        }
    }
    out.push_str("</category></employee>");
    xml(out)
}

async fn upload_file(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let multipart = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data; boundary="));
    if !multipart || !body.contains("name=\"file\"") || !body.contains("name=\"category\"") {
        return StatusCode::BAD_REQUEST;
    }
    let mut account = db.write().await;
    if !account.employees.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    let name = form_value(&body, "fileName").unwrap_or_else(|| "upload".to_string());
    tracing::info!(%id, %name, "file uploaded");
    account.uploads.push((id, name));
    StatusCode::CREATED
}

async fn changed_employees(Query(params): Params) -> Response {
    let Some(since) = params.get("since") else {
        return (StatusCode::BAD_REQUEST, "since is required").into_response();
    };
    let kind = params.get("type").map(|t| t.to_ascii_lowercase());
    let since = since.get(..19).unwrap_or(since.as_str());
    let changes = [
        ("123", "Updated", "2024-01-20T12:00:00+00:00"),
        ("333", "Inserted", "2024-02-01T08:30:00+00:00"),
        ("90", "Deleted", "2024-02-03T17:45:10+00:00"),
    ];
    let mut out = String::from("<changeList latest=\"2024-02-03T17:45:10+00:00\">");
    for (id, action, last_changed) in changes {
        let recent = last_changed.get(..19).unwrap_or(last_changed) >= since;
        let wanted = kind.as_deref().is_none_or(|k| k == action.to_ascii_lowercase());
        if recent && wanted {
            out.push_str(&format!(
                "<employee id=\"{id}\" action=\"{action}\" lastChanged=\"{last_changed}\" />"
            ));
        }
    }
    out.push_str("</changeList>");
    xml(out)
}

// --- tables ---

async fn table_rows(
    State(db): State<Db>,
    Path((_company, id, table)): Path<(String, String, String)>,
) -> Response {
    let account = db.read().await;
    let Some(rows) = account.tables.get(&table) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mut out = String::from("<table>");
    for row in rows.iter().filter(|r| id == "all" || r.employee_id == id) {
        out.push_str(&format!("<row id=\"{}\" employeeId=\"{}\">", row.id, row.employee_id));
        for (name, value) in &row.fields {
            if value.is_empty() {
                out.push_str(&format!("<field id=\"{name}\" />"));
            } else {
                out.push_str(&format!("<field id=\"{name}\">{}</field>", escape(value)));
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</table>");
    xml(out)
}

async fn add_row(
    State(db): State<Db>,
    Path((_company, id, table)): Path<(String, String, String)>,
    body: String,
) -> StatusCode {
    let fields = field_values(&body);
    if fields.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    let mut account = db.write().await;
    if !account.employees.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    let row_id = account.next_row_id.to_string();
    account.next_row_id += 1;
    let Some(rows) = account.tables.get_mut(&table) else {
        return StatusCode::NOT_FOUND;
    };
    rows.push(TableRow {
        id: row_id,
        employee_id: id,
        fields,
    });
    StatusCode::OK
}

async fn update_row(
    State(db): State<Db>,
    Path((_company, id, table, row_id)): Path<(String, String, String, String)>,
    body: String,
) -> StatusCode {
    let mut account = db.write().await;
    let Some(row) = account
        .tables
        .get_mut(&table)
        .and_then(|rows| rows.iter_mut().find(|r| r.id == row_id && r.employee_id == id))
    else {
        return StatusCode::NOT_FOUND;
    };
    for (name, value) in field_values(&body) {
        match row.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => row.fields.push((name, value)),
        }
    }
    StatusCode::OK
}

// --- meta ---

async fn meta_fields() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "First name", "type": "text", "alias": "firstName"},
        {"id": 2, "name": "Last name", "type": "text", "alias": "lastName"},
        {"id": 4001, "name": "Level", "type": "list"},
    ]))
}

async fn meta_lists() -> Json<Value> {
    Json(json!([
        {
            "fieldId": 4001,
            "manageable": "yes",
            "multiple": "no",
            "name": "Level",
            "options": [
                {"id": 1, "archived": "no", "name": "Junior"},
                {"id": 2, "archived": "no", "name": "Senior"},
            ],
        }
    ]))
}

async fn meta_tables() -> Response {
    xml("<tables>\
         <table alias=\"customLevels\">\
         <field id=\"4001\" alias=\"customLevel\" type=\"list\">Level</field>\
         <field id=\"4002\" alias=\"customNote\" type=\"text\">Note</field>\
         </table>\
         <table alias=\"jobInfo\">\
         <field id=\"4047\" alias=\"jobTitle\" type=\"list\">Job Title</field>\
         </table>\
         </tables>"
        .to_string())
}

async fn meta_users() -> Json<Value> {
    Json(json!({
        "5": {"id": 5, "employeeId": 100, "firstName": "Account", "lastName": "Owner",
              "email": "owner@example.com", "status": "enabled", "lastLogin": "2024-02-01T10:00:00+00:00"},
    }))
}

async fn time_off_policies() -> Json<Value> {
    Json(json!([
        {"id": "70", "timeOffTypeId": "78", "name": "Vacation Full-Time", "effectiveDate": null, "type": "accruing"},
        {"id": "71", "timeOffTypeId": "77", "name": "Sick", "effectiveDate": "2024-01-01", "type": "manual"},
    ]))
}

async fn time_off_types() -> Json<Value> {
    Json(json!({
        "timeOffTypes": [
            {"id": "77", "name": "Sick", "units": "hours", "color": null, "icon": "medical"},
            {"id": "78", "name": "Vacation", "units": "hours", "color": null, "icon": "palm-trees"},
        ],
        "defaultHours": [{"name": "Saturday", "amount": "0"}, {"name": "Sunday", "amount": "0"}],
    }))
}

// --- reports ---

async fn company_report(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    Query(params): Params,
) -> Response {
    if id != "1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let fields = ["id", "firstName", "lastName", "jobTitle"].map(str::to_string);
    let account = db.read().await;
    render_report(&account, "Company Directory", &fields, params.get("format"))
}

async fn custom_report(State(db): State<Db>, Query(params): Params, body: String) -> Response {
    if !body.trim_start().starts_with("<report") {
        return (StatusCode::BAD_REQUEST, "expected a <report> document").into_response();
    }
    let fields: Vec<String> = field_values(&body).into_iter().map(|(id, _)| id).collect();
    if fields.is_empty() {
        return (StatusCode::BAD_REQUEST, "no fields requested").into_response();
    }
    let title = element_text(&body, "title").unwrap_or_else(|| "Report".to_string());
    let account = db.read().await;
    render_report(&account, &title, &fields, params.get("format"))
}

fn render_report(account: &Account, title: &str, fields: &[String], format: Option<&String>) -> Response {
    let Some(format) = format.filter(|f| REPORT_FORMATS.contains(&f.as_str())) else {
        return (StatusCode::BAD_REQUEST, "unsupported format").into_response();
    };
    let rows: Vec<Vec<Value>> = account
        .employees
        .values()
        .map(|e| fields.iter().map(|f| e.get(f).cloned().unwrap_or(Value::Null)).collect())
        .collect();

    match format.as_str() {
        "json" => {
            let employees: Vec<Value> = rows
                .iter()
                .map(|row| {
                    let map: Map<String, Value> = fields.iter().cloned().zip(row.iter().cloned()).collect();
                    Value::Object(map)
                })
                .collect();
            let field_defs: Vec<Value> = fields
                .iter()
                .map(|f| json!({"id": f, "type": "text", "name": f}))
                .collect();
            Json(json!({"title": title, "fields": field_defs, "employees": employees})).into_response()
        }
        "csv" => {
            let mut out = fields.join(",");
            out.push('\n');
            for row in &rows {
                let cells: Vec<String> = row
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_default())
                    .collect();
                out.push_str(&cells.join(","));
                out.push('\n');
            }
            ([(header::CONTENT_TYPE, "text/csv")], out).into_response()
        }
        "xml" => xml(format!("<report><title>{}</title></report>", escape(title))),
        "pdf" => ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.4\n%%EOF\n".to_vec()).into_response(),
        _ => ([(header::CONTENT_TYPE, "application/vnd.ms-excel")], vec![0xd0, 0xcf, 0x11, 0xe0]).into_response(),
    }
}

// --- time off ---

async fn whos_out(Query(params): Params) -> Response {
    let start = params.get("start").cloned().unwrap_or_else(|| "2024-01-01".to_string());
    let end = params.get("end").cloned().unwrap_or_else(|| "2024-01-14".to_string());
    if end < start {
        return (StatusCode::BAD_REQUEST, "end before start").into_response();
    }
    let items = [
        ("timeOff", "<employee id=\"123\">Test Person</employee>", "2024-01-08", "2024-01-09"),
        ("holiday", "<holiday id=\"1\">New Year's Day</holiday>", "2024-01-01", "2024-01-01"),
        ("timeOff", "<employee id=\"124\">Someother Guy</employee>", "2024-03-04", "2024-03-08"),
    ];
    let mut out = String::from("<calendar>");
    for (kind, who, from, to) in items {
        if to >= start.as_str() && from <= end.as_str() {
            out.push_str(&format!(
                "<item type=\"{kind}\">{who}<start>{from}</start><end>{to}</end></item>"
            ));
        }
    }
    out.push_str("</calendar>");
    xml(out)
}

async fn time_off_requests(State(db): State<Db>, headers: HeaderMap, Query(params): Params) -> Response {
    let account = db.read().await;
    let statuses: Vec<&str> = params
        .get("status")
        .map(|s| s.split(',').collect())
        .unwrap_or_default();
    let selected = account.time_off.iter().filter(|r| {
        (statuses.is_empty() || statuses.contains(&r.status.as_str()))
            && params.get("employeeId").is_none_or(|id| *id == r.employee_id)
            && params.get("id").is_none_or(|id| *id == r.id)
    });

    if wants_xml(&headers) {
        let mut out = String::from("<requests>");
        for r in selected {
            out.push_str(&format!(
                "<request id=\"{}\"><employee id=\"{}\">{}</employee><status lastChanged=\"2024-05-01\">{}</status>\
                 <start>{}</start><end>{}</end><type id=\"{}\">{}</type><amount unit=\"hours\">{}</amount></request>",
                r.id,
                r.employee_id,
                escape(&r.name),
                r.status,
                r.start,
                r.end,
                r.type_id,
                escape(&r.type_name),
                r.amount
            ));
        }
        out.push_str("</requests>");
        return xml(out);
    }

    let items: Vec<Value> = selected.map(time_off_json).collect();
    Json(Value::Array(items)).into_response()
}

fn time_off_json(r: &TimeOffEntry) -> Value {
    json!({
        "id": r.id,
        "employeeId": r.employee_id,
        "name": r.name,
        "status": {"lastChanged": "2024-05-01", "status": r.status},
        "start": r.start,
        "end": r.end,
        "type": {"id": r.type_id, "name": r.type_name},
        "amount": {"unit": "hours", "amount": r.amount},
    })
}

async fn time_off_request(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    body: String,
) -> Response {
    let (Some(start), Some(end), Some(type_id)) = (
        element_text(&body, "start"),
        element_text(&body, "end"),
        element_text(&body, "timeOffTypeId"),
    ) else {
        return (StatusCode::BAD_REQUEST, "start, end and timeOffTypeId are required").into_response();
    };
    let mut account = db.write().await;
    let Some(employee) = account.employees.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let name = employee
        .get("displayName")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let previous = element_text(&body, "previousRequest");
    if let Some(previous) = &previous {
        match account.time_off.iter_mut().find(|r| r.id == *previous) {
            Some(replaced) => replaced.status = "superceded".to_string(),
            None => return StatusCode::NOT_FOUND.into_response(),
        }
    }
    let entry = TimeOffEntry {
        id: account.next_request_id.to_string(),
        employee_id: id,
        name,
        status: element_text(&body, "status").unwrap_or_else(|| "requested".to_string()),
        type_name: (if type_id == "77" { "Sick" } else { "Vacation" }).to_string(),
        type_id,
        amount: element_text(&body, "amount").unwrap_or_else(|| "0".to_string()),
        start,
        end,
    };
    account.next_request_id += 1;
    let out = time_off_json(&entry);
    account.time_off.push(entry);
    (StatusCode::CREATED, Json(out)).into_response()
}

#[derive(Deserialize)]
struct StatusChange {
    status: String,
}

async fn time_off_status(
    State(db): State<Db>,
    Path((_company, id)): Path<(String, String)>,
    Json(change): Json<StatusChange>,
) -> StatusCode {
    if !["approved", "denied", "canceled"].contains(&change.status.as_str()) {
        return StatusCode::BAD_REQUEST;
    }
    let mut account = db.write().await;
    match account.time_off.iter_mut().find(|r| r.id == id) {
        Some(request) => {
            request.status = change.status;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

// --- request body reading ---

/// An element read from a request body: name, `id` attribute and text with
/// entities resolved.
struct Element {
    name: String,
    id: Option<String>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let id = start.attributes().flatten().find_map(|attr| {
            if attr.key.as_ref() != b"id" {
                return None;
            }
            let raw = std::str::from_utf8(&attr.value).ok()?;
            unescape(raw).ok().map(|v| v.into_owned())
        });
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            id,
            text: String::new(),
        }
    }
}

/// Every element of an XML request body in the order it closes. Reading
/// stops at the first malformed token.
fn elements(body: &str) -> Vec<Element> {
    let mut reader = Reader::from_str(body);
    let mut open: Vec<Element> = Vec::new();
    let mut closed = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => open.push(Element::open(&start)),
            Ok(Event::Empty(start)) => closed.push(Element::open(&start)),
            Ok(Event::End(_)) => closed.extend(open.pop()),
            Ok(Event::Text(text)) => {
                let raw = String::from_utf8_lossy(&text);
                if let (Some(element), Ok(text)) = (open.last_mut(), unescape(&raw)) {
                    element.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(element) = open.last_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::GeneralRef(reference)) => {
                let entity = format!("&{};", String::from_utf8_lossy(&reference));
                if let (Some(element), Ok(text)) = (open.last_mut(), unescape(&entity)) {
                    element.text.push_str(&text);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    closed
}

/// `(id, value)` of every `<field id="..">` in an XML request body. A
/// self-closing field yields an empty value.
fn field_values(body: &str) -> Vec<(String, String)> {
    elements(body)
        .into_iter()
        .filter(|element| element.name == "field")
        .filter_map(|element| Some((element.id?, element.text)))
        .collect()
}

/// Text of the first `<name>` element.
fn element_text(body: &str, name: &str) -> Option<String> {
    elements(body)
        .into_iter()
        .find(|element| element.name == name)
        .map(|element| element.text)
}

/// Value of a text part in a multipart body.
fn form_value(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"\r\n\r\n");
    let start = body.find(&marker)? + marker.len();
    let len = body[start..].find("\r\n")?;
    Some(body[start..start + len].to_string())
}

fn escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}
