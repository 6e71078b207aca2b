//! Database row types. These map directly to SQLite rows and are kept
//! apart from the warbler-types API models; `into_*` does the conversion.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use tracing::warn;

use warbler_types::models::{Message, User};
use warbler_types::time::parse_db_timestamp;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
}

pub(crate) const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location, u.created_at";

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password: row.get(3)?,
            image_url: row.get(4)?,
            header_image_url: row.get(5)?,
            bio: row.get(6)?,
            location: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Public view of the row; drops the password digest.
    pub fn into_user(self) -> User {
        let created_at = timestamp_or_epoch(&self.created_at, "user", self.id);
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            image_url: self.image_url,
            header_image_url: self.header_image_url,
            bio: self.bio,
            location: self.location,
            created_at,
        }
    }
}

pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: String,
}

pub(crate) const MESSAGE_COLUMNS: &str = "m.id, m.text, m.user_id, u.username, m.created_at";

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            text: row.get(1)?,
            user_id: row.get(2)?,
            username: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn into_message(self) -> Message {
        let created_at = timestamp_or_epoch(&self.created_at, "message", self.id);
        Message {
            id: self.id,
            text: self.text,
            user_id: self.user_id,
            username: self.username,
            created_at,
        }
    }
}

/// Insert payload for a new account. `password_hash` must already be a
/// digest; this layer never sees plaintext.
pub struct NewUser<'a> {
    /// Explicit identity. `None` lets SQLite assign one.
    pub id: Option<i64>,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub image_url: Option<&'a str>,
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// What an account deletion removed along with the user row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeletedAccount {
    pub messages: usize,
    pub likes: usize,
    pub follows: usize,
}

fn timestamp_or_epoch(raw: &str, kind: &str, id: i64) -> DateTime<Utc> {
    parse_db_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on {} {}", raw, kind, id);
        DateTime::default()
    })
}
