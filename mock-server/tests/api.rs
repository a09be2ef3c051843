use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, LOCKED_EMPLOYEE_ID};
use serde_json::Value;
use tower::ServiceExt;

const ROOT: &str = "/api/gateway.php/acme/v1";
// base64("testingnotrealapikey:")
const AUTH: &str = "Basic dGVzdGluZ25vdHJlYWxhcGlrZXk6";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(path: &str) -> Request<String> {
    Request::builder()
        .uri(format!("{ROOT}{path}"))
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::ACCEPT, "application/json")
        .body(String::new())
        .unwrap()
}

fn get_xml(path: &str) -> Request<String> {
    Request::builder()
        .uri(format!("{ROOT}{path}"))
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::ACCEPT, "application/xml")
        .body(String::new())
        .unwrap()
}

fn send(method: &str, path: &str, content_type: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(format!("{ROOT}{path}"))
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, content_type)
        .body(body.to_string())
        .unwrap()
}

fn employee_xml(fields: &[(&str, &str)]) -> String {
    let mut xml = String::from("<employee>\n");
    for (id, value) in fields {
        xml.push_str(&format!("\t<field id=\"{id}\">{value}</field>\n"));
    }
    xml.push_str("</employee>");
    xml
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("{ROOT}/employees/directory"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- employees ---

#[tokio::test]
async fn directory_lists_seeded_employees() {
    let resp = app().oneshot(get("/employees/directory")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let employees = body["employees"].as_array().unwrap();
    assert_eq!(employees.len(), 3);
    assert_eq!(employees[1]["displayName"], "Test Person");
}

#[tokio::test]
async fn get_employee_returns_requested_fields() {
    let resp = app()
        .oneshot(get("/employees/123?fields=firstName%2CworkEmail%2Cnickname"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], "123");
    assert_eq!(body["firstName"], "Test");
    assert_eq!(body["workEmail"], "test.person@example.com");
    assert!(body["nickname"].is_null());
    assert!(body.get("lastName").is_none());
}

#[tokio::test]
async fn get_employee_not_found() {
    let resp = app().oneshot(get("/employees/9999?fields=firstName")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_employee_requires_names() {
    let body = employee_xml(&[("firstName", "Test")]);
    let resp = app()
        .oneshot(send("POST", "/employees/", "text/xml", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_employee_returns_location() {
    let body = employee_xml(&[("firstName", "New"), ("lastName", "Hire")]);
    let resp = app()
        .oneshot(send("POST", "/employees/", "text/xml", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION].to_str().unwrap();
    assert_eq!(location, format!("{ROOT}/employees/333"));
}

#[tokio::test]
async fn update_locked_employee_is_forbidden() {
    let body = employee_xml(&[("firstName", "Nope")]);
    let resp = app()
        .oneshot(send("POST", &format!("/employees/{LOCKED_EMPLOYEE_ID}"), "text/xml", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn photo_size_is_checked() {
    let resp = app().oneshot(get("/employees/123/photo/huge")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app().oneshot(get("/employees/123/photo/small")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "image/jpeg");
}

#[tokio::test]
async fn files_view_is_xml() {
    let resp = app().oneshot(get_xml("/employees/123/files/view/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.starts_with("<employee id=\"123\">"));
    assert!(body.contains("<shareWithEmployee>yes</shareWithEmployee>"));
}

#[tokio::test]
async fn upload_requires_multipart() {
    let resp = app()
        .oneshot(send("POST", "/employees/123/files", "text/plain", "hello"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn changes_need_since_and_filter_by_type() {
    let resp = app().oneshot(get_xml("/employees/changed/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app()
        .oneshot(get_xml("/employees/changed/?since=2024-01-01T00%3A00%3A00Z&type=inserted"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("id=\"333\" action=\"Inserted\""));
    assert!(!body.contains("action=\"Updated\""));
}

// --- tables ---

#[tokio::test]
async fn table_rows_for_all_employees() {
    let resp = app().oneshot(get_xml("/employees/all/tables/customLevels")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<row id=\"1\" employeeId=\"123\">"));
    assert!(body.contains("<field id=\"customNote\" />"));
    assert!(body.contains("<row id=\"2\" employeeId=\"124\">"));
}

#[tokio::test]
async fn unknown_table_not_found() {
    let resp = app().oneshot(get_xml("/employees/all/tables/nothing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- reports ---

#[tokio::test]
async fn custom_report_as_json() {
    let body = "<report output=\"json\">\n<title>Names</title>\n<fields>\n<field id=\"id\" />\n<field id=\"lastName\" />\n</fields>\n</report>";
    let resp = app()
        .oneshot(send("POST", "/reports/custom/?format=json", "text/xml", body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let report = body_json(resp).await;
    assert_eq!(report["title"], "Names");
    assert_eq!(report["employees"].as_array().unwrap().len(), 3);
    assert_eq!(report["employees"][2]["lastName"], "Guy");
}

#[tokio::test]
async fn company_report_as_csv() {
    let resp = app().oneshot(get("/reports/1?format=csv&fd=yes")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/csv");
    let body = body_text(resp).await;
    assert!(body.starts_with("id,firstName,lastName,jobTitle\n"));
    assert!(body.contains("123,Test,Person,Engineer\n"));
}

#[tokio::test]
async fn report_rejects_unknown_format() {
    let resp = app().oneshot(get("/reports/1?format=docx")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- time off ---

#[tokio::test]
async fn whos_out_filters_by_range() {
    let resp = app()
        .oneshot(get_xml("/time_off/whos_out/?start=2024-01-05&end=2024-01-31"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("<employee id=\"123\">Test Person</employee>"));
    assert!(!body.contains("holiday"));
}

#[tokio::test]
async fn time_off_requests_follow_accept_header() {
    let resp = app().oneshot(get("/time_off/requests/?status=approved")).await.unwrap();
    let requests = body_json(resp).await;
    assert_eq!(requests.as_array().unwrap().len(), 1);
    assert_eq!(requests[0]["id"], "1342");

    let resp = app().oneshot(get_xml("/time_off/requests/")).await.unwrap();
    let body = body_text(resp).await;
    assert!(body.starts_with("<requests>"));
    assert!(body.contains("<request id=\"1343\">"));
}

#[tokio::test]
async fn time_off_status_rejects_unknown_status() {
    let resp = app()
        .oneshot(send("PUT", "/time_off/requests/1342/status", "application/json", r#"{"status":"maybe"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn time_off_types_are_wrapped() {
    let resp = app().oneshot(get("/meta/time_off/types")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["timeOffTypes"][1]["name"], "Vacation");
}

// --- full employee lifecycle ---

#[tokio::test]
async fn employee_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let body = employee_xml(&[("firstName", "Walk"), ("lastName", "Dog")]);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(send("POST", "/employees/", "text/xml", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION].to_str().unwrap().to_string();
    let id = location.rsplit('/').next().unwrap().to_string();

    // update
    let body = employee_xml(&[("jobTitle", "Walker &amp; Sitter")]);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(send("POST", &format!("/employees/{id}"), "text/xml", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/employees/{id}?fields=firstName%2CjobTitle")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["firstName"], "Walk");
    assert_eq!(fetched["jobTitle"], "Walker & Sitter");

    // add a table row, then read it back
    let row = "<row>\n\t<field id=\"customLevel\">Lead</field>\n</row>";
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(send("POST", &format!("/employees/{id}/tables/customLevels"), "text/xml", row))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_xml(&format!("/employees/{id}/tables/customLevels")))
        .await
        .unwrap();
    let body = body_text(resp).await;
    assert!(body.contains(&format!("employeeId=\"{id}\"><field id=\"customLevel\">Lead</field>")));
}
