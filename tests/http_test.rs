mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use common::{ADMIN_TOKEN, AMINA_TOKEN, EXPIRED_TOKEN, FACULTY_ID, FACULTY_TOKEN, KHADAR_TOKEN, TestPortal};
use gollis_connect::infrastructure::gateway::GatewayPolicy;
use gollis_connect::interfaces::http::{AppState, configure};
use serde_json::{Value, json};

macro_rules! test_app {
    ($policy:expr) => {{
        let fixture = TestPortal::new($policy).await;
        let state = web::Data::new(AppState::new(fixture.portal.clone()));
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;
        (app, fixture)
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

async fn course_id(fixture: &TestPortal, code: &str) -> String {
    fixture
        .portal
        .catalog
        .find_by_code(code)
        .await
        .unwrap()
        .unwrap()
        .id
        .to_string()
}

#[actix_web::test]
async fn test_health_needs_no_token() {
    let (app, _fixture) = test_app!(GatewayPolicy::Approve);
    let response =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/health").to_request())
            .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_missing_and_expired_tokens_are_unauthorized() {
    let (app, _fixture) = test_app!(GatewayPolicy::Approve);

    let request = actix_test::TestRequest::get().uri("/api/courses").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");

    let request = actix_test::TestRequest::get()
        .uri("/api/courses")
        .insert_header(bearer(EXPIRED_TOKEN))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_grade_flow_and_gpa() {
    let (app, fixture) = test_app!(GatewayPolicy::Approve);
    let math = course_id(&fixture, "MATH201").await;
    let bus = course_id(&fixture, "BUS110").await;

    for (course, letter) in [(&math, "A"), (&bus, "C")] {
        let request = actix_test::TestRequest::post()
            .uri("/api/grades")
            .insert_header(bearer(FACULTY_TOKEN))
            .set_json(json!({
                "studentId": "GU-001",
                "courseId": course,
                "grade": letter,
                "semester": "Fall",
                "academicYear": "2024-2025"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // The student reads their own record.
    let request = actix_test::TestRequest::get()
        .uri("/api/grades/student")
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["grades"].as_array().unwrap().len(), 2);
    assert_eq!(body["gpa"].as_f64(), Some(3.33));

    // Staff must name the student.
    let request = actix_test::TestRequest::get()
        .uri("/api/grades/student")
        .insert_header(bearer(FACULTY_TOKEN))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = actix_test::TestRequest::get()
        .uri("/api/grades/student?studentId=GU-002")
        .insert_header(bearer(FACULTY_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["grades"], json!([]));
    assert_eq!(body["gpa"].as_f64(), Some(0.0));

    // A student cannot look at someone else's grades.
    let request = actix_test::TestRequest::get()
        .uri("/api/grades/student?studentId=GU-001")
        .insert_header(bearer(KHADAR_TOKEN))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_grade_update_and_delete() {
    let (app, fixture) = test_app!(GatewayPolicy::Approve);
    let cs = course_id(&fixture, "CS101").await;
    let submission = |letter: &str| {
        json!({
            "studentId": "GU-001",
            "courseId": cs,
            "grade": letter,
            "semester": "Fall",
            "academicYear": "2024-2025"
        })
    };

    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(submission("C"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    let grade_id = body["grade"]["id"].as_str().unwrap().to_string();

    // Letters are accepted in either case.
    let request = actix_test::TestRequest::put()
        .uri(&format!("/api/grades/{grade_id}"))
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(submission("a"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Grade updated successfully");
    assert_eq!(body["grade"]["id"], grade_id.as_str());
    assert_eq!(body["grade"]["grade"], "A");

    let unknown = "/api/grades/8d3c7a52-4b1e-4f7a-9a55-2f0c1e9b7d10";
    let request = actix_test::TestRequest::put()
        .uri(unknown)
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(submission("B"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "not_found");

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/grades/{grade_id}"))
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/grades/{grade_id}"))
        .insert_header(bearer(FACULTY_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["message"], "Grade deleted successfully");

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/grades/{grade_id}"))
        .insert_header(bearer(FACULTY_TOKEN))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = actix_test::TestRequest::get()
        .uri("/api/grades/student")
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body["grades"], json!([]));
}

#[actix_web::test]
async fn test_grade_submission_errors() {
    let (app, fixture) = test_app!(GatewayPolicy::Approve);
    let cs = course_id(&fixture, "CS101").await;
    let submission = json!({
        "studentId": "GU-002",
        "courseId": cs,
        "grade": "B",
        "semester": "Fall",
        "academicYear": "2024-2025"
    });

    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(AMINA_TOKEN))
        .set_json(&submission)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "forbidden");

    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(&submission)
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::CREATED
    );

    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(&submission)
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::CONFLICT
    );

    let mut unknown = submission.clone();
    unknown["studentId"] = json!("GU-404");
    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(&unknown)
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::NOT_FOUND
    );

    let mut bad_letter = submission.clone();
    bad_letter["grade"] = json!("E");
    let request = actix_test::TestRequest::post()
        .uri("/api/grades")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(&bad_letter)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn test_course_roster_is_staff_only() {
    let (app, fixture) = test_app!(GatewayPolicy::Approve);
    let cs = course_id(&fixture, "CS101").await;

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/grades/course/{cs}"))
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::FORBIDDEN
    );

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/grades/course/{cs}"))
        .insert_header(bearer(FACULTY_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn test_payment_flow() {
    let (app, fixture) = test_app!(GatewayPolicy::Approve);

    let request = actix_test::TestRequest::post()
        .uri("/api/payments/initiate")
        .insert_header(bearer(AMINA_TOKEN))
        .set_json(json!({
            "amount": 500,
            "paymentMethod": "telesom_zaad",
            "semester": "Fall",
            "academicYear": "2024-2025"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    let transaction_id = body["transactionId"].as_str().unwrap().to_string();
    assert_eq!(
        body["paymentUrl"],
        format!("https://telesom-zaad.com/pay/{transaction_id}")
    );

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/payments/verify/{transaction_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["payment"]["status"], "completed");
    // E-mail receipt plus SMS to the verified phone.
    assert_eq!(fixture.outbox.sent().len(), 2);

    let request = actix_test::TestRequest::get()
        .uri("/api/payments/history")
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let request = actix_test::TestRequest::post()
        .uri("/api/payments/verify/0-unknown")
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_rejected_payment_answers_bad_request() {
    let (app, fixture) = test_app!(GatewayPolicy::Reject);

    let request = actix_test::TestRequest::post()
        .uri("/api/payments/initiate")
        .insert_header(bearer(KHADAR_TOKEN))
        .set_json(json!({
            "amount": 120.5,
            "paymentMethod": "dahabshiil",
            "semester": "Spring",
            "academicYear": "2024-2025"
        }))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, request).await;
    let transaction_id = body["transactionId"].as_str().unwrap().to_string();

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/payments/verify/{transaction_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["payment"]["status"], "failed");
    assert!(fixture.outbox.sent().is_empty());

    // Staff cannot initiate tuition payments.
    let request = actix_test::TestRequest::post()
        .uri("/api/payments/initiate")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(json!({
            "amount": 10,
            "paymentMethod": "dahabshiil",
            "semester": "Spring",
            "academicYear": "2024-2025"
        }))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[actix_web::test]
async fn test_course_administration() {
    let (app, _fixture) = test_app!(GatewayPolicy::Approve);
    let draft = json!({
        "code": "CS205",
        "name": "Data Structures",
        "creditHours": 3,
        "department": "Computer Science",
        "instructor": FACULTY_ID
    });

    let request = actix_test::TestRequest::post()
        .uri("/api/courses")
        .insert_header(bearer(FACULTY_TOKEN))
        .set_json(&draft)
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::FORBIDDEN
    );

    let request = actix_test::TestRequest::post()
        .uri("/api/courses")
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(&draft)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let course: Value = actix_test::read_body_json(response).await;
    let id = course["id"].as_str().unwrap().to_string();

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/courses/instructor/{FACULTY_ID}"))
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let taught: Value = actix_test::call_and_read_body_json(&app, request).await;
    let codes: Vec<&str> = taught
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["CS101", "CS205"]);

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/courses/{id}"))
        .insert_header(bearer(ADMIN_TOKEN))
        .to_request();
    let deactivated: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(deactivated["isActive"], false);

    let request = actix_test::TestRequest::get()
        .uri("/api/courses?active=false")
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    let inactive: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(inactive.as_array().unwrap().len(), 1);

    let request = actix_test::TestRequest::post()
        .uri("/api/courses")
        .insert_header(bearer(ADMIN_TOKEN))
        .set_json(&draft)
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::CONFLICT
    );

    let request = actix_test::TestRequest::get()
        .uri("/api/courses/not-a-uuid")
        .insert_header(bearer(AMINA_TOKEN))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, request).await.status(),
        StatusCode::BAD_REQUEST
    );
}
