use rusqlite::params;
use tracing::debug;
use warbler_types::models::User;

use crate::models::{USER_COLUMNS, UserRow};
use crate::{Database, Result};

impl Database {
    // -- Follows --

    /// `follower_id` starts following `followed_id`. Returns false when the
    /// edge already existed.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
                 VALUES (?1, ?2)",
                params![followed_id, follower_id],
            )?;
            debug!("follow {} -> {}: inserted={}", follower_id, followed_id, inserted > 0);
            Ok(inserted > 0)
        })
    }

    /// Returns false when there was nothing to remove.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                params![followed_id, follower_id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: i64 = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM follows
                    WHERE user_being_followed_id = ?1 AND user_following_id = ?2
                 )",
                params![followed_id, follower_id],
                |r| r.get(0),
            )?;
            Ok(found != 0)
        })
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.is_following(other_id, user_id)
    }

    /// Users that `user_id` follows, ordered by username.
    pub fn following(&self, user_id: i64) -> Result<Vec<User>> {
        self.follow_list(
            "JOIN follows f ON f.user_being_followed_id = u.id WHERE f.user_following_id = ?1",
            user_id,
        )
    }

    /// Users following `user_id`, ordered by username.
    pub fn followers(&self, user_id: i64) -> Result<Vec<User>> {
        self.follow_list(
            "JOIN follows f ON f.user_following_id = u.id WHERE f.user_being_followed_id = ?1",
            user_id,
        )
    }

    fn follow_list(&self, join: &str, user_id: i64) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users u {join} ORDER BY u.username"
            ))?;

            let rows = stmt
                .query_map([user_id], |row| UserRow::from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows.into_iter().map(UserRow::into_user).collect())
        })
    }
}
