// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie tests.
//!
//! These tests verify the cookie set on login and registration, and that
//! the removal cookie sent on logout carries the same attributes.

use axum::{
    http::{header, StatusCode},
    response::Response,
};

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::post_form(
        &app,
        "/register",
        None,
        "username=casey&password=correct-horse&display_name=Casey",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = find_cookie(&set_cookie_headers(&response), "coach_hub_token");
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_roundtrip_and_bad_password() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::post_form(&app, "/register", None, "username=casey&password=correct-horse").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = common::post_form(&app, "/login", None, "username=casey&password=wrong-horse").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(set_cookie_headers(&response).is_empty());
    let page = common::body_json(response).await;
    assert_eq!(page["template"], "auth/login");

    let response = common::post_form(&app, "/login", None, "username=casey&password=correct-horse").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = find_cookie(&set_cookie_headers(&response), "coach_hub_token");

    // The issued cookie opens protected pages.
    let session = cookie.split(';').next().unwrap().to_string();
    let response = common::get(&app, "/profile", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_username_rerenders() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::post_form(&app, "/register", None, "username=admin&password=long-enough").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = common::body_json(response).await;
    assert_eq!(page["template"], "auth/register");
    assert!(page["page"]["flash"]["error"].is_string());
}

#[tokio::test]
async fn test_logout_cookie_removal_attributes() {
    let (app, state, _uploads) = common::create_test_app().await;
    let admin = common::admin(&state).await;
    let session = common::session(&state, &admin);

    let response = common::post_form(&app, "/logout", Some(&session), "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");

    let cookie = find_cookie(&set_cookie_headers(&response), "coach_hub_token");
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(!cookie.contains("Secure"));
    assert!(!cookie.contains("Domain="));
}

#[tokio::test]
async fn test_protected_page_without_session_redirects_to_login() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::get(&app, "/athletes", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&common::body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}
