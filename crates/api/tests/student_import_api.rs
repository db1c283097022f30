//! HTTP-level integration tests for bulk student import.
//!
//! Covers upload rejection, header handling, per-row failures, the
//! duplicate-email path on re-import, role enforcement, the upload size
//! limit and the request timeout exemption.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, login, post_multipart, staff_token, test_config, Part,
    TEST_PASSWORD,
};
use sqlx::PgPool;

use campus_api::config::{ImportConfig, ServerConfig};
use campus_core::roles::ROLE_STUDENT;
use campus_db::repositories::{StudentRepo, UserRepo};

const IMPORT: &str = "/api/v1/students/import";

const HEADER: &str = "email,password,first_name,other_name,last_name,gender,mugshot,\
                      student_class,date_admitted,date_of_birth,address";

fn row(email: &str, class: &str) -> String {
    format!("{email},pass1234,Ada,,Obi,F,,{class},2023-09-04,2010-05-01,12 Allen Avenue")
}

fn csv(lines: &[String]) -> Vec<u8> {
    lines.join("\n").into_bytes()
}

async fn import(
    pool: &PgPool,
    token: &str,
    file_name: &str,
    content: &[u8],
) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_multipart(
        app,
        IMPORT,
        &[Part::File("studentprofile", file_name, content)],
        Some(token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

fn messages(outcome: &serde_json::Value) -> Vec<String> {
    outcome["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_requires_authentication(pool: PgPool) {
    let app = common::build_test_app(pool);
    let content = csv(&[HEADER.to_string()]);
    let response = post_multipart(
        app,
        IMPORT,
        &[Part::File("studentprofile", "s.csv", &content)],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_cannot_import(pool: PgPool) {
    create_user(&pool, "pupil@school.test", ROLE_STUDENT).await;
    let token = login(
        common::build_test_app(pool.clone()),
        "pupil@school.test",
        TEST_PASSWORD,
    )
    .await;

    let app = common::build_test_app(pool);
    let content = csv(&[HEADER.to_string()]);
    let response = post_multipart(
        app,
        IMPORT,
        &[Part::File("studentprofile", "s.csv", &content)],
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Rejected uploads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_file_is_rejected_without_counters(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let app = common::build_test_app(pool);

    let response = post_multipart(app, IMPORT, &[Part::Text("header", "skip")], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["status"], "rejected");
    assert!(outcome["successful_imports"].is_null());
    assert!(outcome["failed_imports"].is_null());
    assert_eq!(messages(&outcome), vec!["No file uploaded"]);
    assert_eq!(outcome["messages"][0]["level"], "error");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_csv_names_are_rejected(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[row("a@school.test", "JSS1")]);

    for name in ["students.xlsx", "students.CSV", "students"] {
        let outcome = import(&pool, &token, name, &content).await;
        assert_eq!(outcome["status"], "rejected", "{name} should be refused");
        assert_eq!(messages(&outcome), vec!["CSV file format not supported"]);
    }

    assert!(StudentRepo::list(&pool).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_utf8_content_is_rejected(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;

    let outcome = import(&pool, &token, "students.csv", b"email\xff\xfe,password\n").await;

    assert_eq!(outcome["status"], "rejected");
    let msgs = messages(&outcome);
    assert_eq!(msgs.len(), 1);
    assert!(msgs[0].starts_with("Error processing CSV file:"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_header_mode_is_rejected(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let app = common::build_test_app(pool);
    let content = csv(&[row("a@school.test", "JSS1")]);

    let response = post_multipart(
        app,
        IMPORT,
        &[
            Part::Text("header", "sometimes"),
            Part::File("studentprofile", "students.csv", &content),
        ],
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["status"], "rejected");
    assert!(messages(&outcome)[0].contains("unknown header mode"));
}

// ---------------------------------------------------------------------------
// Row processing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn imports_rows_and_reports_incomplete_ones(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[
        HEADER.to_string(),
        row("ada@school.test", "JSS1"),
        "short@school.test,pass,Only,Three".to_string(),
        row("  bayo@school.test  ", "SS2"),
    ]);

    let outcome = import(&pool, &token, "students.csv", &content).await;

    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["successful_imports"], 2);
    assert_eq!(outcome["failed_imports"], 1);

    let msgs = messages(&outcome);
    assert_eq!(msgs.len(), 2);
    assert!(msgs[0].starts_with("Skipping incomplete row:"));
    assert!(msgs[0].contains("short@school.test"));
    assert_eq!(outcome["messages"][0]["level"], "warning");
    assert_eq!(
        msgs[1],
        "Import complete. Successful imports: 2, Failed imports: 1"
    );
    assert_eq!(outcome["messages"][1]["level"], "success");

    let students = StudentRepo::list(&pool).await.unwrap();
    assert_eq!(students.len(), 2);
    // Highest class first; the email was trimmed.
    assert_eq!(students[0].email, "bayo@school.test");
    // The legacy layout reads date_admitted from the birth-date column.
    assert_eq!(students[0].date_admitted, students[0].date_of_birth);

    let account = UserRepo::find_by_email(&pool, "ada@school.test")
        .await
        .unwrap()
        .expect("account created");
    assert!(account.is_student);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn imported_students_can_log_in(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[HEADER.to_string(), row("ada@school.test", "JSS1")]);

    let outcome = import(&pool, &token, "students.csv", &content).await;
    assert_eq!(outcome["successful_imports"], 1);

    let student_token = login(
        common::build_test_app(pool.clone()),
        "ada@school.test",
        "pass1234",
    )
    .await;
    assert!(!student_token.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reimport_fails_every_row_without_new_accounts(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[
        HEADER.to_string(),
        row("ada@school.test", "JSS1"),
        row("bayo@school.test", "JSS2"),
    ]);

    let first = import(&pool, &token, "students.csv", &content).await;
    assert_eq!(first["successful_imports"], 2);
    let accounts = UserRepo::count(&pool).await.unwrap();

    let second = import(&pool, &token, "students.csv", &content).await;
    assert_eq!(second["successful_imports"], 0);
    assert_eq!(second["failed_imports"], 2);
    let msgs = messages(&second);
    assert!(msgs[0].starts_with("Error importing student:"));
    assert!(msgs[0].contains("ada@school.test"));
    assert_eq!(second["messages"][0]["level"], "error");

    assert_eq!(UserRepo::count(&pool).await.unwrap(), accounts);
    assert_eq!(StudentRepo::list(&pool).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn emails_differing_only_in_case_are_duplicates(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[
        HEADER.to_string(),
        row("Ada@School.TEST", "JSS1"),
        row("ada@school.test", "JSS1"),
    ]);

    let outcome = import(&pool, &token, "students.csv", &content).await;

    assert_eq!(outcome["successful_imports"], 1);
    assert_eq!(outcome["failed_imports"], 1);
    let stored = UserRepo::find_by_email(&pool, "ada@school.test")
        .await
        .unwrap()
        .expect("first row imported");
    assert_eq!(stored.email, "Ada@school.test");

    let student_token = login(
        common::build_test_app(pool.clone()),
        "ADA@school.test",
        "pass1234",
    )
    .await;
    assert!(!student_token.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_date_fails_only_that_row(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[
        HEADER.to_string(),
        "bad@school.test,pass1234,Ada,,Obi,F,,JSS1,2023-09-04,01/05/2010,Lagos".to_string(),
        row("good@school.test", "JSS1"),
    ]);

    let outcome = import(&pool, &token, "students.csv", &content).await;

    assert_eq!(outcome["successful_imports"], 1);
    assert_eq!(outcome["failed_imports"], 1);
    assert!(messages(&outcome)[0].contains("date_of_birth"));
    assert!(UserRepo::find_by_email(&pool, "bad@school.test")
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Header modes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn detect_keeps_first_row_without_header(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let content = csv(&[row("first@school.test", "JSS1"), row("second@school.test", "JSS1")]);

    let outcome = import(&pool, &token, "students.csv", &content).await;

    assert_eq!(outcome["successful_imports"], 2);
    assert_eq!(outcome["failed_imports"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn skip_mode_discards_first_row(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let app = common::build_test_app(pool.clone());
    let content = csv(&[row("first@school.test", "JSS1"), row("second@school.test", "JSS1")]);

    let response = post_multipart(
        app,
        IMPORT,
        &[
            Part::Text("header", "skip"),
            Part::File("studentprofile", "students.csv", &content),
        ],
        Some(&token),
    )
    .await;
    let outcome = body_json(response).await["data"].clone();

    assert_eq!(outcome["successful_imports"], 1);
    assert!(UserRepo::find_by_email(&pool, "first@school.test")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn none_mode_treats_header_as_data(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let app = common::build_test_app(pool.clone());
    let content = csv(&[HEADER.to_string(), row("ada@school.test", "JSS1")]);

    let response = post_multipart(
        app,
        IMPORT,
        &[
            Part::Text("header", "none"),
            Part::File("studentprofile", "students.csv", &content),
        ],
        Some(&token),
    )
    .await;
    let outcome = body_json(response).await["data"].clone();

    // The header row fails email validation; the data row imports.
    assert_eq!(outcome["successful_imports"], 1);
    assert_eq!(outcome["failed_imports"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn header_only_file_completes_with_zero_counts(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;

    let outcome = import(&pool, &token, "students.csv", HEADER.as_bytes()).await;

    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["successful_imports"], 0);
    assert_eq!(outcome["failed_imports"], 0);
    assert_eq!(
        messages(&outcome),
        vec!["Import complete. Successful imports: 0, Failed imports: 0"]
    );
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_upload_is_rejected_without_creating_accounts(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let app = common::build_test_app_with(
        pool.clone(),
        ServerConfig {
            import: ImportConfig {
                max_bytes: 512,
                ..ImportConfig::default()
            },
            ..test_config()
        },
    );
    let mut lines = vec![HEADER.to_string()];
    lines.extend((0..20).map(|i| row(&format!("student{i}@school.test"), "JSS1")));
    let content = csv(&lines);
    assert!(content.len() > 512);
    let users_before = UserRepo::count(&pool).await.unwrap();

    let response = post_multipart(
        app,
        IMPORT,
        &[Part::File("studentprofile", "students.csv", &content)],
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["status"], "rejected");
    assert!(outcome.get("successful_imports").is_none());
    assert!(outcome.get("failed_imports").is_none());
    assert!(messages(&outcome)[0].starts_with("Error processing CSV file"));
    assert_eq!(UserRepo::count(&pool).await.unwrap(), users_before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn import_is_not_cut_off_by_request_timeout(pool: PgPool) {
    let token = staff_token(&pool, common::build_test_app(pool.clone())).await;
    let config = ServerConfig {
        request_timeout_secs: 0,
        ..test_config()
    };

    // Three Argon2 hashes take far longer than a zero timeout.
    let content = csv(&[
        HEADER.to_string(),
        row("one@school.test", "JSS1"),
        row("two@school.test", "JSS2"),
        row("three@school.test", "JSS3"),
    ]);
    let response = post_multipart(
        common::build_test_app_with(pool.clone(), config),
        IMPORT,
        &[Part::File("studentprofile", "students.csv", &content)],
        Some(&token),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await["data"].clone();
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["successful_imports"], 3);
    assert_eq!(outcome["failed_imports"], 0);
    assert_eq!(StudentRepo::list(&pool).await.unwrap().len(), 3);
}
