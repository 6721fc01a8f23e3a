
use axum::http::{header, StatusCode};
use serde_json::json;
use test_helpers::{send, session_cookie, signup_body, signup_user, test_app, TEST_SECRET};

#[tokio::test]
async fn signup_returns_public_fields_and_session_cookie() {
    let app = test_app().await;

    let (status, headers, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "fullName": "A B",
            "username": "ab1",
            "password": "secret1",
            "confirmPassword": "secret1",
            "gender": "male",
            "phone": "+12345678901",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["fullName"], "A B");
    assert_eq!(body["username"], "ab1");
    assert_eq!(body["phone"], "+12345678901");
    assert!(body["email"].is_null());
    assert!(body["profilePic"]
        .as_str()
        .unwrap()
        .contains("boy?username=ab1"));

    // No credential material in the response
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("jwt="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
}

#[tokio::test]
async fn signup_cookie_authorizes_protected_requests() {
    let app = test_app().await;
    let (_, cookie) = signup_user(&app, "alice", "1234567890").await;

    let (status, _, _) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let app = test_app().await;

    let mut body = signup_body("alice", "1234567890");
    body["confirmPassword"] = json!("different1");

    let (status, _, response) = send(&app, "POST", "/api/auth/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Passwords do not match");
}

#[tokio::test]
async fn signup_rejects_short_password() {
    let app = test_app().await;

    let mut body = signup_body("alice", "1234567890");
    body["password"] = json!("abc12");
    body["confirmPassword"] = json!("abc12");

    let (status, _, response) = send(&app, "POST", "/api/auth/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn signup_rejects_malformed_phone() {
    let app = test_app().await;

    let (status, _, response) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(signup_body("alice", "not-a-phone")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid phone number format");
}

#[tokio::test]
async fn signup_rejects_missing_fields() {
    let app = test_app().await;

    let (status, _, response) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn signup_rejects_duplicate_username_phone_and_email() {
    let app = test_app().await;

    let mut first = signup_body("alice", "1234567890");
    first["email"] = json!("alice@example.com");
    let (status, _, _) = send(&app, "POST", "/api/auth/signup", None, Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same username, different phone
    let (status, _, response) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(signup_body("alice", "2345678901")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Username already exists");

    // Same phone, different username
    let (status, _, response) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(signup_body("bob", "1234567890")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Phone number already in use");

    // Same email, everything else fresh
    let mut third = signup_body("carol", "3456789012");
    third["email"] = json!("alice@example.com");
    let (status, _, response) = send(&app, "POST", "/api/auth/signup", None, Some(third)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Email already in use");
}

#[tokio::test]
async fn login_works_with_username_or_email() {
    let app = test_app().await;

    let mut body = signup_body("alice", "1234567890");
    body["email"] = json!("alice@example.com");
    let (status, _, created) = send(&app, "POST", "/api/auth/signup", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, headers, user) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], created["id"]);
    assert!(headers.get(header::SET_COOKIE).is_some());

    // The email goes through the same `username` identifier field
    let (status, _, user) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], created["id"]);

    // And through a dedicated `email` field
    let (status, _, user) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], created["id"]);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    signup_user(&app, "alice", "1234567890").await;

    let (unknown_status, _, unknown_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "secret1" })),
    )
    .await;

    let (wrong_status, _, wrong_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = test_app().await;

    let (status, headers, body) = send(&app, "POST", "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("jwt=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = test_app().await;
    let (user, _) = signup_user(&app, "alice", "1234567890").await;

    // No cookie at all
    let (status, _, body) = send(&app, "GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");

    // Garbage token
    let (status, _, body) = send(&app, "GET", "/api/users", Some("jwt=garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");

    // Token signed with a different secret
    let forged =
        pairchat::crypto::token::issue_token(user["id"].as_str().unwrap(), "other-secret", 15)
            .unwrap();
    let cookie = format!("jwt={}", forged);
    let (status, _, _) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Expired token, correctly signed
    let expired =
        pairchat::crypto::token::issue_token(user["id"].as_str().unwrap(), TEST_SECRET, -1)
            .unwrap();
    let cookie = format!("jwt={}", expired);
    let (status, _, _) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_for_unknown_user_is_not_found() {
    let app = test_app().await;
    signup_user(&app, "alice", "1234567890").await;

    let ghost = pairchat::crypto::token::issue_token("no-such-user", TEST_SECRET, 15).unwrap();
    let cookie = format!("jwt={}", ghost);

    let (status, _, body) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn login_cookie_round_trips_through_protected_routes() {
    let app = test_app().await;
    signup_user(&app, "alice", "1234567890").await;

    let (_, headers, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret1" })),
    )
    .await;

    let cookie = session_cookie(&headers);
    let (status, _, _) = send(&app, "GET", "/api/users", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}
