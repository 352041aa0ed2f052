//! Router tests that need no database
//!
//! Every request here is rejected or answered before the first query, so the
//! app runs on a pool that never connects.

mod helpers;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use bloodlink::models::UserRole;
use helpers::*;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_requests_without_cookie_are_unauthorized() {
    let app = TestApp::without_database();

    for uri in [
        "/api/auth/me",
        "/api/user/profile",
        "/api/donor/registrations",
        "/api/hospital/inventory",
        "/api/ngo/camps",
        "/api/notifications",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(response.error(), "Not authenticated");
    }
}

#[tokio::test]
async fn test_invalid_cookie_is_unauthorized() {
    let app = TestApp::without_database();
    let response = app.get("/api/notifications", Some("bloodlink_token=not.a.token")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Invalid or expired session");
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let app = TestApp::without_database();
    let donor = app.cookie_for(1, UserRole::Donor);
    let hospital = app.cookie_for(2, UserRole::Hospital);
    let ngo = app.cookie_for(3, UserRole::Ngo);

    let cases = [
        (&donor, "/api/hospital/inventory"),
        (&donor, "/api/ngo/camps"),
        (&hospital, "/api/donor/stats"),
        (&hospital, "/api/ngo/inventory"),
        (&ngo, "/api/hospital/registrations"),
        (&ngo, "/api/donor/camps"),
    ];

    for (cookie, uri) in cases {
        let response = app.get(uri, Some(cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::without_database();

    let short_password = app.post("/api/auth/signup", None, json!({
        "name": "Asha",
        "email": "asha@example.com",
        "password": "short",
        "role": "donor",
    })).await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);
    assert!(short_password.error().contains("at least 8"));

    let bad_role = app.post("/api/auth/signup", None, json!({
        "name": "Asha",
        "email": "asha@example.com",
        "password": "long-enough",
        "role": "admin",
    })).await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let missing_fields = app.post("/api/auth/signup", None, json!({})).await;
    assert_eq!(missing_fields.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let app = TestApp::without_database();
    let response = app.post("/api/auth/login", None, json!({ "email": "", "password": "" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::without_database();
    let response = app.request(Method::POST, "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie().expect("set-cookie");
    assert!(cookie.starts_with("bloodlink_token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_registration_needs_exactly_one_target() {
    let app = TestApp::without_database();
    let donor = app.cookie_for(1, UserRole::Donor);

    let both = app.post("/api/donor/registrations", Some(&donor), json!({
        "hospital_id": 1,
        "camp_id": 2,
    })).await;
    assert_eq!(both.status, StatusCode::BAD_REQUEST);

    let neither = app.post("/api/donor/registrations", Some(&donor), json!({})).await;
    assert_eq!(neither.status, StatusCode::BAD_REQUEST);

    let too_many_units = app.post("/api/donor/registrations", Some(&donor), json!({
        "hospital_id": 1,
        "units": 10,
    })).await;
    assert_eq!(too_many_units.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_values_are_validated() {
    let app = TestApp::without_database();
    let hospital = app.cookie_for(2, UserRole::Hospital);

    let update = app.patch("/api/hospital/registrations/1", Some(&hospital), json!({ "status": "pending" })).await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert_eq!(update.error(), "Invalid status: pending");

    let filter = app.get("/api/hospital/registrations?status=unknown", Some(&hospital)).await;
    assert_eq!(filter.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_camp_validation() {
    let app = TestApp::without_database();
    let ngo = app.cookie_for(3, UserRole::Ngo);

    let mut zero_capacity = camp_body(0);
    zero_capacity["capacity"] = json!(0);
    let response = app.post("/api/ngo/camps", Some(&ngo), zero_capacity).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let mut past = camp_body(10);
    past["camp_date"] = json!("2020-01-01");
    let response = app.post("/api/ngo/camps", Some(&ngo), past).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post("/api/ngo/camps", Some(&ngo), json!({ "name": "No date" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_header() {
    let app = TestApp::without_database();

    let response = app.get("/api/notifications", None).await;
    assert!(response.headers.get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/api/notifications")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_with_credentials() {
    let app = TestApp::without_database();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/auth/login")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::without_database();
    let response = app.get("/api/unknown", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_body_gets_json_error() {
    let app = TestApp::without_database();
    let ngo = app.cookie_for(3, UserRole::Ngo);

    let wrong_type = app.post("/api/ngo/camps", Some(&ngo), json!({ "capacity": "lots" })).await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert!(wrong_type.body.is_object(), "{:?}", wrong_type.body);
    assert!(!wrong_type.error().is_empty());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn test_missing_content_type_gets_json_error() {
    let app = TestApp::without_database();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/signup")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"], "Expected a JSON request body");
}

#[tokio::test]
async fn test_malformed_path_id_gets_json_error() {
    let app = TestApp::without_database();
    let donor = app.cookie_for(1, UserRole::Donor);
    let hospital = app.cookie_for(2, UserRole::Hospital);
    let ngo = app.cookie_for(3, UserRole::Ngo);

    let cases = [
        (Method::DELETE, "/api/donor/registrations/abc", &donor, None),
        (Method::PATCH, "/api/hospital/registrations/abc", &hospital, Some(json!({ "status": "approved" }))),
        (Method::GET, "/api/ngo/camps/abc", &ngo, None),
        (Method::PATCH, "/api/notifications/abc/read", &donor, None),
    ];

    for (method, uri, cookie, body) in cases {
        let response = app.request(method, uri, Some(cookie.as_str()), body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(response.error().contains("abc"), "{}: {:?}", uri, response.body);
    }
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    let app = TestApp::without_database();
    let donor = app.cookie_for(1, UserRole::Donor);

    let response = app.get("/api/notifications?limit=ten", Some(&donor)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.is_object(), "{:?}", response.body);
    assert!(!response.error().is_empty());

    let response = app.get("/api/notifications?unread_only=maybe", Some(&donor)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}
