//! Database row types. These map directly to SQLite rows and are converted to
//! the warbler-types models before leaving the crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use tracing::warn;
use warbler_types::models::{Message, User};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub(crate) const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location";

impl UserRow {
    /// Reads the eight `USER_COLUMNS` starting at `offset`.
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            username: row.get(offset + 1)?,
            email: row.get(offset + 2)?,
            password: row.get(offset + 3)?,
            image_url: row.get(offset + 4)?,
            header_image_url: row.get(offset + 5)?,
            bio: row.get(offset + 6)?,
            location: row.get(offset + 7)?,
        })
    }

    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            image_url: self.image_url,
            header_image_url: self.header_image_url,
            bio: self.bio,
            location: self.location,
        }
    }
}

pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub timestamp: String,
    pub user_id: i64,
}

pub(crate) const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id";

impl MessageRow {
    pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            text: row.get(offset + 1)?,
            timestamp: row.get(offset + 2)?,
            user_id: row.get(offset + 3)?,
        })
    }

    pub fn into_message(self) -> Message {
        let timestamp = parse_timestamp(&self.timestamp).unwrap_or_else(|| {
            warn!("Corrupt timestamp '{}' on message {}", self.timestamp, self.id);
            DateTime::default()
        });

        Message {
            id: self.id,
            text: self.text,
            timestamp,
            user_id: self.user_id,
        }
    }
}

/// A message joined with its author.
pub struct FeedRow {
    pub message: MessageRow,
    pub author: UserRow,
}

impl FeedRow {
    pub fn into_parts(self) -> (Message, User) {
        (self.message.into_message(), self.author.into_user())
    }
}

/// Rows written by the application are RFC 3339. Rows filled by the column
/// default use SQLite's "YYYY-MM-DD HH:MM:SS" without timezone, read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
                .ok()
        })
}
