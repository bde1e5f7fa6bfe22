use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use portal_server::routes::create_router;
use portal_server::session::SessionStore;
use portal_server::store::MemoryUserStore;

fn test_app() -> Router {
    create_router(
        MemoryUserStore::new(),
        SessionStore::new(chrono::Duration::hours(24)),
    )
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn register_body(username: &str, email: &str, full_name: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "correct horse",
        "full_name": full_name,
    })
}

async fn register(app: &Router, username: &str, email: &str, full_name: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &register_body(username, email, full_name),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    (token, body["user"].clone())
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_register_creates_account_with_derived_fields() {
    let app = test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &json!({
                "username": "jdoe",
                "email": "jdoe@example.edu",
                "password": "correct horse",
                "full_name": "John Doe",
                "program": "Computer Science",
                "year_of_study": "1st Year",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    let user = &body["user"];
    assert_eq!(user["id"], 1);
    assert_eq!(user["username"], "jdoe");
    assert_eq!(user["full_name"], "John Doe");
    assert_eq!(user["avatar_initials"], "JD");
    assert_eq!(user["program"], "Computer Science");
    assert_eq!(
        user["student_id"],
        format!("ST-{}-0001", Utc::now().year())
    );
    assert_eq!(
        user["joined_date"],
        Utc::now().format("%B %Y").to_string()
    );
    // The password must not cross the wire in any shape.
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_assigns_sequential_student_ids() {
    let app = test_app();

    let (_, first) = register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;
    let (_, second) = register(&app, "awu", "awu@example.edu", "Alice Wu").await;

    assert_eq!(first["id"], 1);
    assert_eq!(second["id"], 2);
    let year = Utc::now().year();
    assert_eq!(first["student_id"], format!("ST-{}-0001", year));
    assert_eq!(second["student_id"], format!("ST-{}-0002", year));
}

#[tokio::test]
async fn test_register_rejects_duplicate_username_and_email() {
    let app = test_app();

    register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &register_body("jdoe", "someone.else@example.edu", "Jane Doe"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username is already taken");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &register_body("janedoe", "jdoe@example.edu", "Jane Doe"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email is already registered");

    // Neither attempt left a record behind.
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            &json!({"username": "janedoe", "password": "correct horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validates_input_shape() {
    let app = test_app();

    // Password too short
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &json!({
                "username": "jdoe",
                "email": "jdoe@example.edu",
                "password": "short",
                "full_name": "John Doe",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Malformed email
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &json!({
                "username": "jdoe",
                "email": "not-an-email",
                "password": "correct horse",
                "full_name": "John Doe",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Username too short
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            &json!({
                "username": "jd",
                "email": "jdoe@example.edu",
                "password": "correct horse",
                "full_name": "John Doe",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_roundtrip() {
    let app = test_app();

    register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            &json!({"username": "jdoe", "password": "correct horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "jdoe");
    assert!(body["user"].get("password").is_none());

    // The issued token actually works.
    let token = body["token"].as_str().unwrap();
    let (status, body) = send(&app, get_request("/api/v1/auth/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "jdoe");
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let app = test_app();

    register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            &json!({"username": "jdoe", "password": "wrong horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
    assert!(body.get("token").is_none());

    // Unknown users fail the same way.
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            &json!({"username": "nobody", "password": "correct horse"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_me_requires_a_valid_session() {
    let app = test_app();

    let (status, _) = send(&app, get_request("/api/v1/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_request("/api/v1/auth/me", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Well-formed but never issued
    let (status, _) = send(
        &app,
        get_request(
            "/api/v1/auth/me",
            Some("00000000-0000-4000-8000-000000000000"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_the_session() {
    let app = test_app();

    let (token, _) = register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/auth/logout", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get_request("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_recomputes_initials() {
    let app = test_app();

    let (token, _) = register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/v1/profile",
            Some(&token),
            &json!({"full_name": "Alice Wu"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Alice Wu");
    assert_eq!(body["avatar_initials"], "AW");

    // An email-only update leaves the initials alone.
    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/v1/profile",
            Some(&token),
            &json!({"email": "alice.wu@example.edu"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice.wu@example.edu");
    assert_eq!(body["avatar_initials"], "AW");

    // The change is visible on the next read.
    let (status, body) = send(&app, get_request("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Alice Wu");
    assert_eq!(body["email"], "alice.wu@example.edu");
}

#[tokio::test]
async fn test_update_profile_requires_a_session() {
    let app = test_app();

    let (status, _) = send(
        &app,
        json_request("PATCH", "/api/v1/profile", None, &json!({"bio": "Hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_rejects_taken_email() {
    let app = test_app();

    register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;
    let (token, _) = register(&app, "awu", "awu@example.edu", "Alice Wu").await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/v1/profile",
            Some(&token),
            &json!({"email": "jdoe@example.edu"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email is already registered");

    // Nothing changed for the caller.
    let (_, body) = send(&app, get_request("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(body["email"], "awu@example.edu");
}

#[tokio::test]
async fn test_update_profile_never_touches_restricted_fields() {
    let app = test_app();

    let (token, created) = register(&app, "jdoe", "jdoe@example.edu", "John Doe").await;

    // Unknown fields in the body are ignored rather than applied.
    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/v1/profile",
            Some(&token),
            &json!({
                "bio": "Hello",
                "username": "hijacked",
                "student_id": "ST-1999-9999",
                "joined_date": "January 1999",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Hello");
    assert_eq!(body["username"], "jdoe");
    assert_eq!(body["student_id"], created["student_id"]);
    assert_eq!(body["joined_date"], created["joined_date"]);
}
