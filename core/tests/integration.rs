//! End-to-end runs of `BambooHr` against the live mock gateway.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives the facade
//! over real HTTP with the default `UreqTransport`. This checks that request
//! building, the transport and response parsing agree with the server's
//! wire format.

use std::io::Write;
use std::time::Duration;

use bamboohr_core::types::{FileUpload, NoteAuthor, TimeOffDay, TimeOffNote};
use bamboohr_core::{
    ApiError, BambooHr, ChangeAction, ClientConfig, Employee, PhotoSize, ReportFormat, ReportOutput,
    TimeOffFilter, TimeOffRequest, TimeOffStatus,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

/// Start the mock gateway on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn bamboo(base_url: &str) -> BambooHr {
    let config = ClientConfig::new("acme", "testingnotrealapikey")
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5));
    BambooHr::new(config).unwrap()
}

fn record(value: Value) -> Employee {
    value.as_object().unwrap().clone()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn employee_lifecycle() {
    let bamboo = bamboo(&start_server());

    // Step 1: the directory holds the seeded employees.
    let directory = bamboo.get_employee_directory().unwrap();
    assert_eq!(directory.len(), 3);

    // Step 2: create an employee; the id comes from the Location header.
    let created = bamboo
        .add_employee(&record(json!({"firstName": "New", "lastName": "Hire"})))
        .unwrap();
    assert_eq!(created.id, "333");

    // Step 3: update it, then read the change back.
    let updated = bamboo
        .update_employee(&created.id, &record(json!({"jobTitle": "R&D <Lead>"})))
        .unwrap();
    assert!(updated);
    let fetched = bamboo
        .get_employee(&created.id, &["firstName", "jobTitle"])
        .unwrap();
    assert_eq!(fetched["firstName"], "New");
    assert_eq!(fetched["jobTitle"], "R&D <Lead>");

    // Step 4: the account owner cannot be edited.
    let err = bamboo
        .update_employee("100", &record(json!({"firstName": "Nope"})))
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 403, .. }));

    // Step 5: unknown employees are NotFound.
    let err = bamboo.get_employee("9999", &["firstName"]).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 6: unknown fields fail locally.
    let err = bamboo.get_employee("123", &["shoeSize"]).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
fn snake_case_keys_round_trip() {
    let config = ClientConfig::new("acme", "testingnotrealapikey")
        .with_base_url(&start_server())
        .with_underscore_keys(true);
    let bamboo = BambooHr::new(config).unwrap();

    let employee = bamboo.get_employee("123", &["first_name", "work_email"]).unwrap();
    assert_eq!(employee["first_name"], "Test");
    assert_eq!(employee["work_email"], "test.person@example.com");
}

#[test]
fn tables_rows_and_changes() {
    let bamboo = bamboo(&start_server());

    let rows = bamboo.get_tabular_data("customLevels", None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows["123"][0].fields["customLevel"].as_deref(), Some("Senior"));
    assert_eq!(rows["123"][0].fields["customNote"], None);

    assert!(bamboo
        .add_row("customLevels", "123", &record(json!({"customLevel": "Lead", "customNote": "Promoted"})))
        .unwrap());
    assert!(bamboo
        .update_row("customLevels", "124", "2", &record(json!({"customLevel": "Mid"})))
        .unwrap());

    let rows = bamboo.get_tabular_data("customLevels", Some("123")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows["123"].len(), 2);
    assert_eq!(rows["123"][1].fields["customNote"].as_deref(), Some("Promoted"));
    let rows = bamboo.get_tabular_data("customLevels", Some("124")).unwrap();
    assert_eq!(rows["124"][0].fields["customLevel"].as_deref(), Some("Mid"));

    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let changes = bamboo.get_employee_changes(since, None).unwrap();
    assert_eq!(changes.len(), 3);
    let inserted = bamboo
        .get_employee_changes(since, Some(&ChangeAction::Inserted))
        .unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].id, "333");
    assert_eq!(
        inserted[0].last_changed,
        Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap()
    );
}

#[test]
fn photos_and_files() {
    let bamboo = bamboo(&start_server());

    let photo = bamboo.get_employee_photo("123", PhotoSize::Small).unwrap();
    assert_eq!(photo.content_type, "image/jpeg");
    assert_eq!(&photo.data[..2], &[0xff, 0xd8]);

    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(b"signed and returned").unwrap();
    let upload = FileUpload {
        path: file.path().to_path_buf(),
        category_id: "2".to_string(),
        share_with_employee: false,
        file_name: Some("Contract".to_string()),
    };
    assert!(bamboo.upload_employee_file("123", &upload).unwrap());

    let categories = bamboo.get_employee_files("123").unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Signed Documents");
    assert_eq!(categories[0].files[0].size, Some(23552));
    assert!(categories[0].files[0].share_with_employee);
    assert_eq!(categories[1].files[0].name, "Contract");
}

#[test]
fn reports_and_cache() {
    let mut bamboo = bamboo(&start_server());
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("directory.csv");
    let output = bamboo
        .request_company_report("1", ReportFormat::Csv, true, Some(&path))
        .unwrap();
    assert!(matches!(output, ReportOutput::Raw { ref content_type, .. } if content_type == "text/csv"));
    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("id,firstName,lastName,jobTitle\n"));

    let report = bamboo
        .request_custom_report(&["id", "lastName"], ReportFormat::Json, Some("Names"), None, None)
        .unwrap();
    let ReportOutput::Json(report) = report else {
        panic!("expected a JSON report");
    };
    assert_eq!(report["title"], "Names");
    assert_eq!(report["employees"][0]["lastName"], "Owner");

    let err = bamboo
        .request_company_report("42", ReportFormat::Json, false, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let all = bamboo.get_all_employees().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all["124"]["workEmail"], "someother.guy@example.com");
    assert_eq!(bamboo.cached_employee("123").unwrap()["lastName"], "Person");
}

#[test]
fn meta_endpoints() {
    let bamboo = bamboo(&start_server());

    let fields = bamboo.get_meta_fields().unwrap();
    assert_eq!(fields[0]["alias"], "firstName");
    let lists = bamboo.get_meta_lists().unwrap();
    assert_eq!(lists[0]["options"][1]["name"], "Senior");
    let users = bamboo.get_meta_users().unwrap();
    assert_eq!(users["5"]["employeeId"], 100);

    let tables = bamboo.get_meta_tables().unwrap();
    let tables = tables["tables"]["table"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1]["alias"], "jobInfo");
    assert_eq!(tables[1]["field"][0]["text"], "Job Title");
}

#[test]
fn time_off_flow() {
    let bamboo = bamboo(&start_server());

    let out = bamboo
        .get_whos_out(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)))
        .unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].kind, "timeOff");
    assert_eq!(out[0].employee_name.as_deref(), Some("Test Person"));
    assert_eq!(out[1].kind, "holiday");

    let types = bamboo.get_time_off_types().unwrap();
    assert_eq!(types.len(), 2);
    let policies = bamboo.get_time_off_policies().unwrap();
    assert_eq!(policies[0]["timeOffTypeId"], "78");

    let approved = TimeOffFilter {
        statuses: vec![TimeOffStatus::Approved],
        ..Default::default()
    };
    let requests = bamboo.get_time_off_requests(&approved).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["amount"]["amount"], "24");

    let summaries = bamboo.get_time_off_summaries(&TimeOffFilter::default()).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].kind.as_deref(), Some("Sick"));
    assert_eq!(summaries[1].unit.as_deref(), Some("hours"));
    assert_eq!(summaries[1].start, Some(date(2024, 6, 3)));

    let request = TimeOffRequest {
        employee_id: "123".to_string(),
        status: TimeOffStatus::Requested,
        start: date(2024, 7, 1),
        end: date(2024, 7, 2),
        time_off_type_id: "78".to_string(),
        amount: "16".to_string(),
        notes: vec![TimeOffNote {
            from: NoteAuthor::Employee,
            text: "Summer".to_string(),
        }],
        dates: vec![
            TimeOffDay { date: date(2024, 7, 1), amount: "8".to_string() },
            TimeOffDay { date: date(2024, 7, 2), amount: "8".to_string() },
        ],
        previous_request: None,
    };
    let created = bamboo.create_time_off_request(&request).unwrap();
    assert_eq!(created["id"], "1500");
    assert_eq!(created["status"]["status"], "requested");

    let replacement = TimeOffRequest {
        previous_request: Some("1500".to_string()),
        amount: "8".to_string(),
        end: date(2024, 7, 1),
        dates: Vec::new(),
        ..request
    };
    let replaced = bamboo.update_time_off_request(&replacement).unwrap();
    assert_eq!(replaced["id"], "1501");

    assert!(bamboo
        .update_time_off_request_status("1501", TimeOffStatus::Approved, Some("Enjoy"))
        .unwrap());
    let err = bamboo
        .update_time_off_request_status("9999", TimeOffStatus::Denied, None)
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}
