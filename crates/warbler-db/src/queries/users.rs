use rusqlite::{Connection, params};
use tracing::info;

use warbler_types::models::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

use super::OptionalExt;
use crate::models::{DeletedAccount, NewUser, ProfileChanges, USER_COLUMNS, UserRow};
use crate::{Database, Result, StoreError};

impl Database {
    /// Insert a new account, rejecting a taken username, email or explicit
    /// id. Returns the stored id.
    pub fn create_user(&self, new: &NewUser<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            if let Some(id) = new.id {
                if query_user_by_id(conn, id)?.is_some() {
                    return Err(StoreError::InvalidInput(format!("user id {id} is already taken")));
                }
            }
            ensure_unique(conn, Some(new.username), Some(new.email), None)?;
            conn.execute(
                "INSERT INTO users (id, username, email, password, image_url, header_image_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.id,
                    new.username,
                    new.email,
                    new.password_hash,
                    new.image_url.unwrap_or(DEFAULT_IMAGE_URL),
                    DEFAULT_HEADER_IMAGE_URL,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            conn.query_row(&sql, [username], UserRow::from_row).optional()
        })
    }

    /// All users, or those whose username contains `search` (ASCII
    /// case-insensitive), ordered by username. `%` and `_` in `search` match
    /// literally.
    pub fn search_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 WHERE ?1 IS NULL OR u.username LIKE ?1 ESCAPE '\\'
                 ORDER BY u.username"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([pattern], UserRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_user(&self, id: i64, changes: &ProfileChanges) -> Result<()> {
        self.with_conn(|conn| {
            if query_user_by_id(conn, id)?.is_none() {
                return Err(StoreError::NotFound("User"));
            }
            ensure_unique(
                conn,
                changes.username.as_deref(),
                changes.email.as_deref(),
                Some(id),
            )?;
            conn.execute(
                "UPDATE users SET
                    username         = COALESCE(?2, username),
                    email            = COALESCE(?3, email),
                    image_url        = COALESCE(?4, image_url),
                    header_image_url = COALESCE(?5, header_image_url),
                    bio              = COALESCE(?6, bio),
                    location         = COALESCE(?7, location)
                 WHERE id = ?1",
                params![
                    id,
                    changes.username,
                    changes.email,
                    changes.image_url,
                    changes.header_image_url,
                    changes.bio,
                    changes.location,
                ],
            )?;
            Ok(())
        })
    }

    /// Remove an account together with everything that references it, in one
    /// transaction: likes given by the user, likes on the user's messages, the
    /// messages themselves, and follow edges in both directions.
    pub fn delete_user(&self, id: i64) -> Result<DeletedAccount> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if query_user_by_id(&tx, id)?.is_none() {
                return Err(StoreError::NotFound("User"));
            }

            let likes = tx.execute(
                "DELETE FROM likes
                 WHERE user_id = ?1
                    OR message_id IN (SELECT id FROM messages WHERE user_id = ?1)",
                [id],
            )?;
            let messages = tx.execute("DELETE FROM messages WHERE user_id = ?1", [id])?;
            let follows = tx.execute(
                "DELETE FROM follows WHERE follower_id = ?1 OR followed_id = ?1",
                [id],
            )?;
            tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;

            info!(
                "Deleted user {} ({} messages, {} likes, {} follows)",
                id, messages, likes, follows
            );
            Ok(DeletedAccount {
                messages,
                likes,
                follows,
            })
        })
    }
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    conn.query_row(&sql, [id], UserRow::from_row).optional()
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fail if `username` or `email` belongs to an account other than `except`.
fn ensure_unique(
    conn: &Connection,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i64>,
) -> Result<()> {
    if let Some(username) = username {
        let taken = conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1 AND id IS NOT ?2",
                params![username, except],
                |_| Ok(()),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::DuplicateUsername);
        }
    }
    if let Some(email) = email {
        let taken = conn
            .query_row(
                "SELECT 1 FROM users WHERE email = ?1 AND id IS NOT ?2",
                params![email, except],
                |_| Ok(()),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::DuplicateEmail);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures;

    #[test]
    fn new_user_has_no_messages_or_followers() {
        let db = Database::open_in_memory().unwrap();
        let id = fixtures::user(&db, 1, "testuser");

        assert_eq!(db.messages_for_user(id).unwrap().len(), 0);
        assert_eq!(db.followers(id).unwrap().len(), 0);

        let row = db.get_user_by_id(id).unwrap().unwrap();
        assert_eq!(row.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(row.header_image_url, DEFAULT_HEADER_IMAGE_URL);
    }

    #[test]
    fn assigns_id_when_none_given() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .create_user(&NewUser {
                id: None,
                username: "auto",
                email: "auto@test.com",
                password_hash: "digest",
                image_url: Some("/me.png"),
            })
            .unwrap();
        let row = db.get_user_by_username("auto").unwrap().unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.image_url, "/me.png");
    }

    #[test]
    fn duplicate_username_and_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        fixtures::user(&db, 1, "taken");

        let err = db
            .create_user(&NewUser {
                id: None,
                username: "taken",
                email: "fresh@test.com",
                password_hash: "digest",
                image_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));

        let err = db
            .create_user(&NewUser {
                id: None,
                username: "fresh",
                email: "taken@test.com",
                password_hash: "digest",
                image_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn search_matches_substring() {
        let db = Database::open_in_memory().unwrap();
        fixtures::user(&db, 1, "alice");
        fixtures::user(&db, 2, "malice");
        fixtures::user(&db, 3, "bob");

        let names: Vec<String> = db
            .search_users(Some("ALI"))
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "malice"]);
        assert_eq!(db.search_users(None).unwrap().len(), 3);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let db = Database::open_in_memory().unwrap();
        fixtures::user(&db, 1, "alice");
        fixtures::user(&db, 2, "bob_smith");

        let names = |q: &str| -> Vec<String> {
            db.search_users(Some(q))
                .unwrap()
                .into_iter()
                .map(|u| u.username)
                .collect()
        };
        assert_eq!(names("_"), vec!["bob_smith"]);
        assert_eq!(names("b_s"), vec!["bob_smith"]);
        assert!(names("%").is_empty());
        assert!(names("\\").is_empty());
    }

    #[test]
    fn taken_id_is_invalid_input() {
        let db = Database::open_in_memory().unwrap();
        fixtures::user(&db, 10000, "first");

        let err = db
            .create_user(&NewUser {
                id: Some(10000),
                username: "second",
                email: "second@test.com",
                password_hash: "digest",
                image_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(db.get_user_by_username("second").unwrap().is_none());
    }

    #[test]
    fn update_keeps_unset_fields_and_checks_uniqueness() {
        let db = Database::open_in_memory().unwrap();
        let id = fixtures::user(&db, 1, "before");
        fixtures::user(&db, 2, "other");

        db.update_user(
            id,
            &ProfileChanges {
                username: Some("after".into()),
                bio: Some("hello".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let row = db.get_user_by_id(id).unwrap().unwrap();
        assert_eq!(row.username, "after");
        assert_eq!(row.email, "before@test.com");
        assert_eq!(row.bio.as_deref(), Some("hello"));

        // Re-submitting your own email is not a conflict.
        db.update_user(
            id,
            &ProfileChanges {
                email: Some("before@test.com".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let err = db
            .update_user(
                id,
                &ProfileChanges {
                    email: Some("other@test.com".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn delete_cascades_explicitly() {
        let db = Database::open_in_memory().unwrap();
        let doomed = fixtures::user(&db, 1, "doomed");
        let friend = fixtures::user(&db, 2, "friend");

        let own = db.insert_message(doomed, "mine").unwrap();
        let theirs = db.insert_message(friend, "theirs").unwrap();
        db.follow(doomed, friend).unwrap();
        db.follow(friend, doomed).unwrap();
        db.toggle_like(doomed, theirs, true).unwrap();
        db.toggle_like(friend, own, true).unwrap();

        let removed = db.delete_user(doomed).unwrap();
        assert_eq!(
            removed,
            DeletedAccount {
                messages: 1,
                likes: 2,
                follows: 2
            }
        );

        assert!(db.get_user_by_id(doomed).unwrap().is_none());
        assert!(db.get_message(own).unwrap().is_none());
        assert!(db.get_message(theirs).unwrap().is_some());
        assert_eq!(db.count_likes(theirs).unwrap(), 0);
        assert!(db.followers(friend).unwrap().is_empty());
        assert!(db.following(friend).unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.delete_user(42).unwrap_err(),
            StoreError::NotFound("User")
        ));
    }
}
