//! Service and handlers emit the expected log lines.

mod common;

use serde_json::json;
use tracing_test::traced_test;

use users::contract::model::NewUser;

#[traced_test]
#[tokio::test]
async fn service_logs_create_and_duplicate() {
    let svc = common::sqlite_service().await;

    svc.create(NewUser::new("Alice", "alice@example.com"))
        .await
        .unwrap();
    assert!(logs_contain("Creating user"));
    assert!(logs_contain("User created"));
    assert!(logs_contain("users.service.create"));

    svc.create(NewUser::new("Bob", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(logs_contain("Email already exists"));
}

#[traced_test]
#[tokio::test]
async fn handlers_log_failures() {
    let app = common::test_router().await;

    common::send(&app, "GET", "/api/users/31337", None).await;
    assert!(logs_contain("Getting user with id: 31337"));
    assert!(logs_contain("Failed to get user 31337"));

    common::send(
        &app,
        "POST",
        "/api/users",
        Some(json!({"name": "A", "email": "a@example.com"})),
    )
    .await;
    assert!(logs_contain("Creating user with email: a@example.com"));
}

#[traced_test]
#[tokio::test]
async fn request_spans_carry_the_request_id() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = common::test_router().await;

    app.clone()
        .oneshot(
            Request::get("/api/users/777")
                .header("x-request-id", "rid-from-client-777")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(logs_contain("request_id=rid-from-client-777"));

    // without a client id the generated one is recorded, never the placeholder
    common::send(&app, "GET", "/api/users/778", None).await;
    assert!(logs_contain("Getting user with id: 778"));
    assert!(!logs_contain("request_id=n/a"));
}
