// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie session middleware.
//!
//! A session is an HS256 JWT naming the user id. The user row is reloaded
//! on every request so role changes and athlete links take effect at once.

use crate::db::StoreError;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "coach_hub_token";

const SESSION_DAYS: i64 = 7;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// The logged-in user, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid session, redirecting to `/login`
/// otherwise.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user_id =
        decode_session(&token, &state.config.session_signing_key).ok_or(AppError::Unauthorized)?;

    let user = match state.db.get_user(user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            tracing::warn!(user_id, "Session for unknown user");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: i64, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + SESSION_DAYS as usize * 24 * 60 * 60,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// User id of a valid, unexpired session token.
pub fn decode_session(token: &str, signing_key: &[u8]) -> Option<i64> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    token_data.claims.sub.parse().ok()
}

/// Session cookie carrying `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

/// Cookie that clears the session; attributes match [`session_cookie`].
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie(String::new(), secure);
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_session_key_32_bytes_minimum!";

    #[test]
    fn test_session_roundtrip() {
        let token = create_jwt(42, KEY).unwrap();
        assert_eq!(decode_session(&token, KEY), Some(42));
    }

    #[test]
    fn test_session_rejects_wrong_key() {
        let token = create_jwt(42, KEY).unwrap();
        assert_eq!(decode_session(&token, b"another_key_that_is_32_bytes_long"), None);
        assert_eq!(decode_session("garbage", KEY), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), true).to_string();
        assert!(cookie.starts_with("coach_hub_token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
    }
}
