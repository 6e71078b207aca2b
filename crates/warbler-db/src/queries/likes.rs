use rusqlite::params;

use super::{OptionalExt, count, messages::collect_messages};
use crate::models::{MESSAGE_COLUMNS, MessageRow};
use crate::{Database, Result, StoreError};

impl Database {
    /// Toggle the like edge `(user_id, message_id)`: removes it if present,
    /// inserts it if not. Returns true when the message is now liked.
    ///
    /// With `allow_self_like` off, liking your own message is rejected;
    /// removing an existing self-like is always allowed.
    pub fn toggle_like(&self, user_id: i64, message_id: i64, allow_self_like: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let author: i64 = conn
                .query_row("SELECT user_id FROM messages WHERE id = ?1", [message_id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(StoreError::NotFound("Message"))?;

            let removed = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                params![user_id, message_id],
            )?;
            if removed > 0 {
                return Ok(false);
            }

            if author == user_id && !allow_self_like {
                return Err(StoreError::Unauthorized("cannot like your own message"));
            }

            conn.execute(
                "INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)",
                params![user_id, message_id],
            )?;
            Ok(true)
        })
    }

    pub fn has_liked(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM likes WHERE user_id = ?1 AND message_id = ?2",
                    params![user_id, message_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn count_likes(&self, message_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM likes WHERE message_id = ?1", message_id)
        })
    }

    /// Number of messages `user_id` has liked.
    pub fn count_liked_by(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| count(conn, "SELECT COUNT(*) FROM likes WHERE user_id = ?1", user_id))
    }

    /// Messages liked by `user_id`, most recently liked first.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM likes l
                 JOIN messages m ON m.id = l.message_id
                 JOIN users u ON u.id = m.user_id
                 WHERE l.user_id = ?1
                 ORDER BY l.rowid DESC"
            );
            collect_messages(conn, &sql, params![user_id])
        })
    }
}
