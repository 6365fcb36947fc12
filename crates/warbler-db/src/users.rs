use rusqlite::{Connection, params};
use tracing::info;
use warbler_types::models::User;
use warbler_types::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use crate::models::{USER_COLUMNS, UserRow};
use crate::{Database, DbError, OptionalExt, Result};

/// Insert payload for a user. `username` and `email` are optional so that a
/// missing value is rejected by the NOT NULL constraint as an integrity error.
#[derive(Debug, Default)]
pub struct NewUser<'a> {
    /// Caller-chosen id; SQLite assigns one when `None`.
    pub id: Option<i64>,
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct UserUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: Option<&'a str>,
    pub header_image_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, new: &NewUser<'_>) -> Result<User> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    new.id,
                    new.username,
                    new.email,
                    new.password_hash,
                    new.image_url.unwrap_or(DEFAULT_IMAGE_URL),
                ],
            )?;
            let id = conn.last_insert_rowid();
            info!("Created user {} ({:?})", id, new.username);

            query_user(conn, "u.id = ?1", params![id])?
                .map(UserRow::into_user)
                .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| Ok(query_user(conn, "u.id = ?1", params![id])?.map(UserRow::into_user)))
    }

    /// Full row, password hash included. Only the auth layer needs this.
    pub fn get_user_row_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "u.username = ?1", params![username]))
    }

    /// All users ordered by username, optionally narrowed to usernames that
    /// contain `search`.
    pub fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let pattern = format!("%{}%", search.unwrap_or(""));
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users u WHERE u.username LIKE ?1 ORDER BY u.username"
            ))?;

            let rows = stmt
                .query_map([pattern], |row| UserRow::from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(UserRow::into_user).collect())
        })
    }

    pub fn update_user(&self, id: i64, update: &UserUpdate<'_>) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    username = ?2,
                    email = ?3,
                    image_url = ?4,
                    header_image_url = ?5,
                    bio = ?6,
                    location = ?7
                 WHERE id = ?1",
                params![
                    id,
                    update.username,
                    update.email,
                    update.image_url.unwrap_or(DEFAULT_IMAGE_URL),
                    update.header_image_url.unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                    update.bio,
                    update.location,
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            Ok(query_user(conn, "u.id = ?1", params![id])?.map(UserRow::into_user))
        })
    }

    /// Deletes the user. Messages, follows and likes go with it via
    /// `ON DELETE CASCADE`.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }
}

fn query_user(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users u WHERE {filter}"))?;
    stmt.query_row(params, |row| UserRow::from_row(row, 0)).optional()
}
