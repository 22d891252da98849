use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use student_records_backend::{app, store::Store, AppState};

const SECRET: &str = "integration-test-secret";

fn state() -> AppState {
    AppState::new(Arc::new(Store::new()), SECRET)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let response = app(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn signup_admin(state: &AppState, email: &str) -> String {
    let (status, body) = send(
        state,
        request(
            "POST",
            "/students/",
            None,
            Some(json!({"name": "Head Admin", "email": email, "password": "admin-pass"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "admin");
    body["id"].as_str().unwrap().to_string()
}

async fn login(state: &AppState, email: &str, password: &str) -> String {
    let (status, body) = send(
        state,
        request(
            "POST",
            "/students/login",
            None,
            Some(json!({"email": email, "password": password})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_student(state: &AppState, admin_token: &str, name: &str, email: &str) -> String {
    let (status, body) = send(
        state,
        request(
            "POST",
            "/students/create_students",
            Some(admin_token),
            Some(json!({"name": name, "email": email, "password": "student-pass"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "student");
    body["id"].as_str().unwrap().to_string()
}

async fn create_course(state: &AppState, admin_token: &str, name: &str, unit: u32) -> String {
    let (status, body) = send(
        state,
        request(
            "POST",
            "/courses/",
            Some(admin_token),
            Some(json!({"name": name, "teacher": "Prof. Kay", "course_unit": unit})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn full_enrollment_and_grading_flow() {
    let state = state();

    signup_admin(&state, "admin@school.edu").await;
    let admin_token = login(&state, "admin@school.edu", "admin-pass").await;

    let student_id = create_student(&state, &admin_token, "Ada", "ada@school.edu").await;
    let student_token = login(&state, "ada@school.edu", "student-pass").await;

    let course_a = create_course(&state, &admin_token, "Algorithms", 3).await;
    let course_b = create_course(&state, &admin_token, "Databases", 2).await;

    // Only the student can register, and re-registration is idempotent.
    let uri_a = format!("/students/register_course/{}/{}", course_a, student_id);
    let (status, _) = send(&state, request("PUT", &uri_a, Some(&admin_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&state, request("PUT", &uri_a, Some(&student_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, request("PUT", &uri_a, Some(&student_token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let uri_b = format!("/students/register_course/{}/{}", course_b, student_id);
    let (status, _) = send(&state, request("PUT", &uri_b, Some(&student_token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Grading is admin-only; the recorded score mirrors to both sides.
    let grade_uri = format!("/students/record_grade/{}/{}", course_a, student_id);
    let (status, _) = send(
        &state,
        request(
            "POST",
            &grade_uri,
            Some(&student_token),
            Some(json!({"score": 100})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &state,
        request(
            "POST",
            &grade_uri,
            Some(&admin_token),
            Some(json!({"score": 80})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // GPA counts the ungraded course's units: (80*3 + 0*2) / 5 = 48.
    let (status, body) = send(
        &state,
        request(
            "GET",
            &format!("/students/{}", student_id),
            Some(&student_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gpa"], json!(48.0));
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
    assert!(body.get("password_hash").is_none());

    // The student can read their own grade from the course side.
    let (status, body) = send(
        &state,
        request(
            "GET",
            &format!("/courses/{}/{}/student_grades", course_a, student_id),
            Some(&student_token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], json!(80));

    // Roster is admin-only and carries the mirrored score.
    let roster_uri = format!("/courses/{}/student_list", course_a);
    let (status, _) = send(&state, request("GET", &roster_uri, Some(&student_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(&state, request("GET", &roster_uri, Some(&admin_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let roster = body.as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["student_id"].as_str().unwrap(), student_id);
    assert_eq!(roster[0]["score"], json!(80));
}

#[tokio::test]
async fn missing_token_and_bad_token_are_distinct() {
    let state = state();

    let (status, body) = send(&state, request("GET", "/courses/", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NO_TOKEN");

    let (status, body) = send(&state, request("GET", "/courses/", Some("forged"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    // Admin-only action without a token reports NO_TOKEN, not FORBIDDEN.
    let (status, body) = send(
        &state,
        request(
            "POST",
            "/courses/",
            None,
            Some(json!({"name": "Algorithms", "teacher": "Prof. Kay", "course_unit": 3})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NO_TOKEN");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let state = state();

    signup_admin(&state, "admin@school.edu").await;
    let token = login(&state, "admin@school.edu", "admin-pass").await;

    let (status, _) = send(&state, request("GET", "/students/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&state, request("POST", "/students/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Revoked before expiry: the token no longer validates.
    let (status, body) = send(&state, request("GET", "/students/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");

    // Logging out again with the same (now invalid) token still works.
    let (status, _) = send(&state, request("POST", "/students/logout", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Without any token header, logout refuses.
    let (status, body) = send(&state, request("POST", "/students/logout", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NO_TOKEN");
}

#[tokio::test]
async fn login_rejects_wrong_credentials() {
    let state = state();
    signup_admin(&state, "admin@school.edu").await;

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/students/login",
            None,
            Some(json!({"email": "admin@school.edu", "password": "wrong"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(
        &state,
        request(
            "POST",
            "/students/login",
            None,
            Some(json!({"email": "nobody@school.edu", "password": "whatever"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_records_are_owner_or_admin_only() {
    let state = state();

    signup_admin(&state, "admin@school.edu").await;
    let admin_token = login(&state, "admin@school.edu", "admin-pass").await;
    let ada = create_student(&state, &admin_token, "Ada", "ada@school.edu").await;
    create_student(&state, &admin_token, "Grace", "grace@school.edu").await;
    let grace_token = login(&state, "grace@school.edu", "student-pass").await;

    let ada_uri = format!("/students/{}", ada);

    let (status, body) = send(&state, request("GET", &ada_uri, Some(&grace_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(&state, request("GET", &ada_uri, Some(&admin_token), None)).await;
    assert_eq!(status, StatusCode::OK);

    // Delete is admin-only, even for the record's owner.
    let ada_token = login(&state, "ada@school.edu", "student-pass").await;
    let (status, _) = send(&state, request("DELETE", &ada_uri, Some(&ada_token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&state, request("DELETE", &ada_uri, Some(&admin_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, request("GET", &ada_uri, Some(&admin_token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_signup_conflicts() {
    let state = state();
    signup_admin(&state, "admin@school.edu").await;

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/students/",
            None,
            Some(json!({"name": "Second", "email": "admin@school.edu", "password": "password"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn validation_failures_are_reported_per_field() {
    let state = state();

    let (status, body) = send(
        &state,
        request(
            "POST",
            "/students/",
            None,
            Some(json!({"name": "", "email": "not-an-email", "password": "short"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"].get("email").is_some());
}

#[tokio::test]
async fn grading_an_unenrolled_student_fails_cleanly() {
    let state = state();

    signup_admin(&state, "admin@school.edu").await;
    let admin_token = login(&state, "admin@school.edu", "admin-pass").await;
    let student_id = create_student(&state, &admin_token, "Ada", "ada@school.edu").await;
    let course_id = create_course(&state, &admin_token, "Algorithms", 3).await;

    // No enrollments at all: the GPA denominator would be zero.
    let (status, body) = send(
        &state,
        request(
            "POST",
            &format!("/students/record_grade/{}/{}", course_id, student_id),
            Some(&admin_token),
            Some(json!({"score": 80})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NO_ENROLLMENTS");

    // Unknown student or course is a plain not-found.
    let (status, body) = send(
        &state,
        request(
            "POST",
            &format!("/students/record_grade/{}/missing", course_id),
            Some(&admin_token),
            Some(json!({"score": 80})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}
