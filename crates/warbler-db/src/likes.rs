use std::collections::HashMap;

use rusqlite::{params, params_from_iter};
use tracing::debug;
use warbler_types::models::Like;

use crate::models::{FeedRow, MESSAGE_COLUMNS, MessageRow, USER_COLUMNS, UserRow};
use crate::{Database, OptionalExt, Result};

impl Database {
    // -- Likes --

    /// Insert a like. A second like of the same message by the same user is
    /// an integrity error.
    pub fn add_like(&self, user_id: i64, message_id: i64) -> Result<Like> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user_id, message_id],
            )?;
            Ok(Like {
                id: conn.last_insert_rowid(),
                user_id,
                message_id,
            })
        })
    }

    /// Toggle a like: removes it if present, inserts it if not.
    /// Returns true when the like was added, false when it was removed.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM likes WHERE user_id = ?1 AND message_id = ?2",
                    params![user_id, message_id],
                    |row| row.get(0),
                )
                .optional()?;

            let added = if let Some(like_id) = existing {
                tx.execute("DELETE FROM likes WHERE id = ?1", [like_id])?;
                false
            } else {
                tx.execute(
                    "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                    params![user_id, message_id],
                )?;
                true
            };

            tx.commit()?;
            debug!("toggle like user={} message={}: added={}", user_id, message_id, added);
            Ok(added)
        })
    }

    pub fn likes_for_message(&self, message_id: i64) -> Result<Vec<Like>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, user_id, message_id FROM likes WHERE message_id = ?1 ORDER BY id")?;

            let rows = stmt
                .query_map([message_id], |row| {
                    Ok(Like {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        message_id: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_likes_for_message(&self, message_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM likes WHERE message_id = ?1", [message_id], |r| {
                    r.get(0)
                })?;
            Ok(count as usize)
        })
    }

    pub fn liked_message_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1 ORDER BY message_id")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }

    /// Like counts for a batch of messages. Messages without likes are absent
    /// from the map.
    pub fn like_counts_for_messages(&self, message_ids: &[i64]) -> Result<HashMap<i64, usize>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT message_id, COUNT(*) FROM likes WHERE message_id IN ({}) GROUP BY message_id",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let counts = stmt
                .query_map(params_from_iter(message_ids), |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
                })?
                .collect::<std::result::Result<HashMap<_, _>, _>>()?;

            Ok(counts)
        })
    }

    /// Messages `user_id` has liked, with their authors, newest first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<FeedRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS}, {USER_COLUMNS}
                 FROM messages m
                 JOIN likes l ON l.message_id = m.id
                 JOIN users u ON m.user_id = u.id
                 WHERE l.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC"
            ))?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(FeedRow {
                        message: MessageRow::from_row(row, 0)?,
                        author: UserRow::from_row(row, 4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
