use rusqlite::{Connection, params};

use warbler_types::models::MAX_MESSAGE_LEN;

use super::{OptionalExt, count, users::query_user_by_id};
use crate::models::{MESSAGE_COLUMNS, MessageRow};
use crate::{Database, Result, StoreError};

impl Database {
    pub fn insert_message(&self, user_id: i64, text: &str) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput("message text is empty".into()));
        }
        if text.chars().count() > MAX_MESSAGE_LEN {
            return Err(StoreError::InvalidInput(format!(
                "message text exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }

        self.with_conn(|conn| {
            if query_user_by_id(conn, user_id)?.is_none() {
                return Err(StoreError::NotFound("User"));
            }
            conn.execute(
                "INSERT INTO messages (text, user_id) VALUES (?1, ?2)",
                params![text, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, id))
    }

    /// Delete a message on behalf of `requester_id`. Only the author may do
    /// so; likes on the message go with it.
    pub fn delete_message(&self, id: i64, requester_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let author: Option<i64> = tx
                .query_row("SELECT user_id FROM messages WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            match author {
                None => return Err(StoreError::NotFound("Message")),
                Some(author) if author != requester_id => {
                    return Err(StoreError::Unauthorized("message belongs to another user"));
                }
                Some(_) => {}
            }

            tx.execute("DELETE FROM likes WHERE message_id = ?1", [id])?;
            tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Messages authored by `user_id`, newest first.
    pub fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                 ORDER BY m.created_at DESC, m.id DESC"
            );
            collect_messages(conn, &sql, params![user_id])
        })
    }

    /// Home feed: messages by `user_id` and by everyone they follow, newest
    /// first, at most `limit` of them.
    pub fn timeline(&self, user_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?2"
            );
            collect_messages(conn, &sql, params![user_id, limit])
        })
    }

    pub fn count_messages(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM messages WHERE user_id = ?1", user_id)
        })
    }
}

pub(crate) fn query_message(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS}
         FROM messages m
         JOIN users u ON m.user_id = u.id
         WHERE m.id = ?1"
    );
    conn.query_row(&sql, [id], MessageRow::from_row).optional()
}

pub(crate) fn collect_messages(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, MessageRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
