use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, params};
use warbler_types::models::Message;

use crate::models::{FeedRow, MESSAGE_COLUMNS, MessageRow, USER_COLUMNS, UserRow};
use crate::{Database, DbError, OptionalExt, Result};

#[derive(Debug, Default)]
pub struct NewMessage<'a> {
    /// Caller-chosen id; SQLite assigns one when `None`.
    pub id: Option<i64>,
    pub text: &'a str,
    pub user_id: i64,
}

impl Database {
    // -- Messages --

    pub fn create_message(&self, new: &NewMessage<'_>) -> Result<Message> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, text, timestamp, user_id) VALUES (?1, ?2, ?3, ?4)",
                params![new.id, new.text, timestamp, new.user_id],
            )?;
            let id = conn.last_insert_rowid();

            query_message(conn, id)?
                .map(MessageRow::into_message)
                .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| Ok(query_message(conn, id)?.map(MessageRow::into_message)))
    }

    /// Message plus its author in one query.
    pub fn get_message_with_author(&self, id: i64) -> Result<Option<FeedRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, {USER_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.id = ?1"
            ))?;
            stmt.query_row([id], feed_row).optional()
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(deleted > 0)
        })
    }

    /// A user's own messages, newest first.
    pub fn messages_for_user(&self, user_id: i64, limit: u32) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(params![user_id, limit], |row| MessageRow::from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(MessageRow::into_message).collect())
        })
    }

    pub fn count_messages_for_user(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM messages WHERE user_id = ?1", [user_id], |r| {
                    r.get(0)
                })?;
            Ok(count as usize)
        })
    }

    /// Home timeline: messages written by `user_id` or by anyone they follow,
    /// newest first.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<FeedRow>> {
        self.with_conn(|conn| {
            // JOIN users to fetch the author in the same query
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, {USER_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (
                        SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
                    )
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            ))?;

            let rows = stmt
                .query_map(params![user_id, limit], feed_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = ?1"))?;
    stmt.query_row([id], |row| MessageRow::from_row(row, 0)).optional()
}

fn feed_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedRow> {
    Ok(FeedRow {
        message: MessageRow::from_row(row, 0)?,
        author: UserRow::from_row(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::NewUser;

    fn seed_user(db: &Database, id: i64, username: &str) -> i64 {
        let email = format!("{username}@test.com");
        db.create_user(&NewUser {
            id: Some(id),
            username: Some(username),
            email: Some(&email),
            password_hash: "HASHED_PASSWORD",
            ..Default::default()
        })
        .unwrap()
        .id
    }

    fn post(db: &Database, user_id: i64, text: &str) -> Message {
        db.create_message(&NewMessage { id: None, text, user_id }).unwrap()
    }

    #[test]
    fn user_owns_created_message() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 99999, "testuser");

        post(&db, uid, "A message about stuff and other stuff");

        let messages = db.messages_for_user(uid, 100).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "A message about stuff and other stuff");
        assert_eq!(messages[0].user_id, 99999);
    }

    #[test]
    fn message_requires_existing_owner() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .create_message(&NewMessage { id: None, text: "orphan", user_id: 42 })
            .unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 1, "testuser");
        let text = "x".repeat(141);
        let err = db
            .create_message(&NewMessage { id: None, text: &text, user_id: uid })
            .unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn delete_message_is_permanent() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 9876, "testuser");
        db.create_message(&NewMessage { id: Some(4646), text: "testing delete", user_id: uid })
            .unwrap();

        assert!(db.delete_message(4646).unwrap());
        assert!(db.get_message(4646).unwrap().is_none());
        assert!(!db.delete_message(4646).unwrap());
    }

    #[test]
    fn deleting_user_cascades_to_messages() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 1, "testuser");
        let msg = post(&db, uid, "soon gone");

        assert!(db.delete_user(uid).unwrap());
        assert!(db.get_message(msg.id).unwrap().is_none());
    }

    #[test]
    fn messages_are_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 1, "testuser");
        post(&db, uid, "first");
        post(&db, uid, "second");

        let texts: Vec<String> =
            db.messages_for_user(uid, 10).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(db.count_messages_for_user(uid).unwrap(), 2);
    }

    #[test]
    fn timeline_includes_followed_users_only() {
        let db = Database::open_in_memory().unwrap();
        let me = seed_user(&db, 1, "me");
        let friend = seed_user(&db, 2, "friend");
        let stranger = seed_user(&db, 3, "stranger");
        db.follow(me, friend).unwrap();

        post(&db, me, "mine");
        post(&db, friend, "from a friend");
        post(&db, stranger, "from a stranger");

        let feed = db.timeline(me, 100).unwrap();
        let texts: Vec<&str> = feed.iter().map(|r| r.message.text.as_str()).collect();
        assert_eq!(texts, vec!["from a friend", "mine"]);
        assert_eq!(feed[0].author.username, "friend");
    }

    #[test]
    fn message_with_author_joins_user() {
        let db = Database::open_in_memory().unwrap();
        let uid = seed_user(&db, 7, "author");
        db.create_message(&NewMessage { id: Some(1234), text: "tesing message", user_id: uid })
            .unwrap();

        let row = db.get_message_with_author(1234).unwrap().unwrap();
        assert_eq!(row.author.username, "author");
        assert_eq!(row.message.text, "tesing message");
        assert!(db.get_message_with_author(99999999).unwrap().is_none());
    }
}
