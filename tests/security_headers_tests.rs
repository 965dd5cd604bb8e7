// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers are present on pages, redirects and error responses.

use axum::http::{header, StatusCode};

mod common;

fn assert_security_headers(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers["content-security-policy"]
        .to_str()
        .unwrap()
        .contains("frame-ancestors 'none'"));
    assert!(headers.contains_key(header::REFERRER_POLICY));
}

#[tokio::test]
async fn test_headers_on_public_page() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::get(&app, "/login", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_security_headers(&response);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn test_headers_on_login_redirect() {
    let (app, _state, _uploads) = common::create_test_app().await;

    let response = common::get(&app, "/athletes", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_headers_on_forbidden_page() {
    let (app, state, _uploads) = common::create_test_app().await;
    let user = common::create_user(&state, "nobody").await;

    let response = common::get(&app, "/programs", Some(&common::session(&state, &user))).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_security_headers(&response);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
}
