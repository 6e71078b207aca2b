use rusqlite::{Connection, params};

use super::{OptionalExt, count, users::query_user_by_id};
use crate::models::{USER_COLUMNS, UserRow};
use crate::{Database, Result, StoreError};

impl Database {
    /// Add the edge `follower_id -> followed_id`. Following someone twice
    /// leaves a single edge. Returns whether an edge was created.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        if follower_id == followed_id {
            return Err(StoreError::InvalidInput("cannot follow yourself".into()));
        }
        self.with_conn(|conn| {
            if query_user_by_id(conn, followed_id)?.is_none() {
                return Err(StoreError::NotFound("User"));
            }
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO follows (follower_id, followed_id) VALUES (?1, ?2)",
                params![follower_id, followed_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Returns whether an edge was removed.
    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
                params![follower_id, followed_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Does `user_id` follow `other_id`?
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, user_id, other_id))
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| edge_exists(conn, other_id, user_id))
    }

    /// Users that `user_id` follows, in the order they were followed.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS}
                 FROM follows f
                 JOIN users u ON u.id = f.followed_id
                 WHERE f.follower_id = ?1
                 ORDER BY f.rowid"
            );
            collect_users(conn, &sql, user_id)
        })
    }

    /// Users following `user_id`, in the order they followed.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS}
                 FROM follows f
                 JOIN users u ON u.id = f.follower_id
                 WHERE f.followed_id = ?1
                 ORDER BY f.rowid"
            );
            collect_users(conn, &sql, user_id)
        })
    }

    pub fn count_following(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM follows WHERE follower_id = ?1", user_id)
        })
    }

    pub fn count_followers(&self, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM follows WHERE followed_id = ?1", user_id)
        })
    }
}

fn edge_exists(conn: &Connection, follower_id: i64, followed_id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
            params![follower_id, followed_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn collect_users(conn: &Connection, sql: &str, id: i64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([id], UserRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
