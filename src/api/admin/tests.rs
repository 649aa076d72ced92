use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::User;
use crate::db::types::UserRole;
use crate::test_support::{self, TestContext};

async fn admin_token(ctx: &TestContext) -> (User, String) {
    let admin = test_support::insert_user(
        ctx.state.db(),
        "admin",
        "System Administrator",
        "admin-pass",
        UserRole::Admin,
    )
    .await;
    let token = test_support::bearer_token(&admin, ctx.state.settings());
    (admin, token)
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn admin_creates_student_and_rejects_duplicates() {
    let ctx = test_support::setup_test_context().await;
    let (_admin, token) = admin_token(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/students",
            Some(&token),
            Some(json!({
                "username": "student1",
                "password": "student123",
                "full_name": "Ali Yilmaz",
                "student_number": "20210001"
            })),
        ))
        .await
        .expect("create student");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["username"], "student1");
    assert_eq!(created["student_number"], "20210001");

    for (username, number, detail) in [
        ("student1", "20219999", "Username already exists"),
        ("student2", "20210001", "Student number already exists"),
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/admin/students",
                Some(&token),
                Some(json!({
                    "username": username,
                    "password": "student123",
                    "full_name": "Duplicate",
                    "student_number": number
                })),
            ))
            .await
            .expect("duplicate student");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CONFLICT, "response: {body}");
        assert_eq!(body["detail"], detail);
    }
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn admin_create_student_rejects_short_password() {
    let ctx = test_support::setup_test_context().await;
    let (_admin, token) = admin_token(&ctx).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/students",
            Some(&token),
            Some(json!({
                "username": "student9",
                "password": "abc",
                "full_name": "Short Password",
                "student_number": "20210009"
            })),
        ))
        .await
        .expect("create student");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert!(body["detail"].as_str().unwrap_or("").contains("Password must be at least"));
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn course_and_enrollment_lifecycle() {
    let ctx = test_support::setup_test_context().await;
    let (_admin, token) = admin_token(&ctx).await;
    let (_user, student) =
        test_support::insert_student(ctx.state.db(), "student1", "20210001").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/instructors",
            Some(&token),
            Some(json!({
                "username": "instructor1",
                "password": "inst123",
                "full_name": "Prof. Dr. Mehmet Demir",
                "department": "Computer Engineering"
            })),
        ))
        .await
        .expect("create instructor");
    let status = response.status();
    let instructor = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {instructor}");
    let instructor_id = instructor["id"].as_str().expect("instructor id").to_string();

    let course_payload = json!({
        "code": "CS101",
        "name": "Introduction to Programming",
        "instructor_id": instructor_id
    });
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/courses",
            Some(&token),
            Some(course_payload.clone()),
        ))
        .await
        .expect("create course");
    let status = response.status();
    let course = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {course}");
    assert_eq!(course["instructor_name"], "Prof. Dr. Mehmet Demir");
    let course_id = course["id"].as_str().expect("course id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/courses",
            Some(&token),
            Some(course_payload),
        ))
        .await
        .expect("duplicate course");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let enrollment = json!({"student_id": student.id, "course_id": course_id});
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/enrollments",
            Some(&token),
            Some(enrollment.clone()),
        ))
        .await
        .expect("enroll");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["course_code"], "CS101");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/admin/enrollments",
            Some(&token),
            Some(enrollment),
        ))
        .await
        .expect("duplicate enroll");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/admin/students/{}/courses", student.id),
            Some(&token),
            None,
        ))
        .await
        .expect("student courses");
    let body = test_support::read_json(response).await;
    assert_eq!(body, json!([course_id]));
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn non_admin_roles_are_forbidden() {
    let ctx = test_support::setup_test_context().await;
    let (user, _student) =
        test_support::insert_student(ctx.state.db(), "student1", "20210001").await;
    let token = test_support::bearer_token(&user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/admin/users", Some(&token), None))
        .await
        .expect("list users");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn admin_cannot_delete_own_account() {
    let ctx = test_support::setup_test_context().await;
    let (admin, token) = admin_token(&ctx).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/admin/users/{}", admin.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete self");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn role_change_invalidates_existing_tokens() {
    let ctx = test_support::setup_test_context().await;
    let (_admin, admin_token) = admin_token(&ctx).await;
    let (user, _student) =
        test_support::insert_student(ctx.state.db(), "student1", "20210001").await;
    let student_token = test_support::bearer_token(&user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/v1/admin/users/{}", user.id),
            Some(&admin_token),
            Some(json!({"role": "instructor"})),
        ))
        .await
        .expect("update role");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["role"], "instructor");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/auth/me",
            Some(&student_token),
            None,
        ))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running postgres test database"]
async fn username_availability() {
    let ctx = test_support::setup_test_context().await;
    let (_admin, token) = admin_token(&ctx).await;

    for (username, available) in [("admin", false), ("newcomer", true)] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/admin/users/check-username/{username}"),
                Some(&token),
                None,
            ))
            .await
            .expect("check username");
        let body = test_support::read_json(response).await;
        assert_eq!(body["available"], available, "{username}");
    }
}
