//! User model for storage and page rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A login account.
///
/// Non-coach users may be linked to exactly one athlete profile through
/// `athlete_id`; a user without a link is "unlinked" and can only see
/// their own profile page.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never rendered.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub is_coach: bool,
    pub is_admin: bool,
    /// Linked athlete profile, if any
    pub athlete_id: Option<i64>,
    /// Generated file name under the upload directory
    pub avatar_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public URL of the avatar image, if one was uploaded.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar_filename
            .as_ref()
            .map(|name| format!("/avatars/{name}"))
    }
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
}
