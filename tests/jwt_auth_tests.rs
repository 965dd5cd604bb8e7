// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests.
//!
//! These tests verify that tokens issued by `create_jwt` are accepted by
//! the session middleware, and that tokens it must reject are redirected
//! to the login page instead of reaching a handler.

use axum::http::StatusCode;
use coach_hub::middleware::auth::{create_jwt, decode_session, Claims, SESSION_COOKIE};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};

mod common;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

#[test]
fn test_jwt_claims_format() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt(4242, signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "4242");
    assert!(token_data.claims.exp > token_data.claims.iat);
    // Seven days, give or take the test's own runtime.
    assert!(token_data.claims.exp >= now() + 86400 * 7 - 60);
    assert!(token_data.claims.exp <= now() + 86400 * 7 + 60);
}

#[test]
fn test_decode_session_rejects_non_numeric_subject() {
    let signing_key = b"test_signing_key_32_bytes_long!!";
    let claims = Claims {
        sub: "not-a-number".to_string(),
        iat: now(),
        exp: now() + 3600,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap();

    assert_eq!(decode_session(&token, signing_key), None);
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let (app, state, _uploads) = common::create_test_app().await;
    let admin = common::admin(&state).await;

    let claims = Claims {
        sub: admin.id.to_string(),
        iat: now() - 86400 * 8,
        exp: now() - 86400,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&state.config.session_signing_key),
    )
    .unwrap();
    let cookie = format!("{SESSION_COOKIE}={token}");

    let response = common::get(&app, "/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");
}

#[tokio::test]
async fn test_session_signed_with_other_key_redirects_to_login() {
    let (app, state, _uploads) = common::create_test_app().await;
    let admin = common::admin(&state).await;

    let token = create_jwt(admin.id, b"some_other_key_that_is_32_bytes!").unwrap();
    let cookie = format!("{SESSION_COOKIE}={token}");

    let response = common::get(&app, "/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");
}

#[tokio::test]
async fn test_session_for_unknown_user_redirects_to_login() {
    let (app, state, _uploads) = common::create_test_app().await;

    let token = create_jwt(999_999, &state.config.session_signing_key).unwrap();
    let cookie = format!("{SESSION_COOKIE}={token}");

    let response = common::get(&app, "/profile", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");
}

#[tokio::test]
async fn test_role_change_applies_to_existing_session() {
    let (app, state, _uploads) = common::create_test_app().await;
    let user = common::create_user(&state, "riley").await;
    let cookie = common::session(&state, &user);

    let response = common::get(&app, "/athletes/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    state
        .db
        .update_user_access(user.id, true, None)
        .await
        .unwrap();

    let response = common::get(&app, "/athletes/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
