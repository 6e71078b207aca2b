//! User registry: account creation, credential checks and profile edits on
//! top of the store. All functions are blocking; handlers call them through
//! [`crate::state::run_blocking`].

use tracing::info;

use warbler_crypto::{hash_password, verify_password};
use warbler_db::Database;
use warbler_db::models::{NewUser, ProfileChanges};
use warbler_types::api::ProfileUpdateRequest;
use warbler_types::models::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, User};

use crate::ApiError;

const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;

pub struct Signup<'a> {
    /// Explicit identity; `None` lets the store assign one.
    pub id: Option<i64>,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub image_url: Option<&'a str>,
}

/// Create an account. The password is hashed before it reaches the store.
pub fn signup(db: &Database, signup: Signup<'_>) -> Result<User, ApiError> {
    validate_username(signup.username)?;
    validate_email(signup.email)?;
    if signup.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(signup.password)?;
    let id = db.create_user(&NewUser {
        id: signup.id,
        username: signup.username,
        email: signup.email,
        password_hash: &password_hash,
        image_url: signup.image_url.filter(|url| !url.trim().is_empty()),
    })?;

    info!("Registered user {} ({})", signup.username, id);
    load_user(db, id)
}

/// Look up `username` and check `password`. Unknown users and wrong
/// passwords both come back as `Ok(None)`.
pub fn authenticate(db: &Database, username: &str, password: &str) -> Result<Option<User>, ApiError> {
    let Some(row) = db.get_user_by_username(username)? else {
        return Ok(None);
    };
    if !verify_password(&row.password, password) {
        return Ok(None);
    }
    Ok(Some(row.into_user()))
}

pub fn load_user(db: &Database, id: i64) -> Result<User, ApiError> {
    db.get_user_by_id(id)?
        .map(|row| row.into_user())
        .ok_or(ApiError::NotFound("User"))
}

/// Apply a profile edit after re-checking the current password. Blank
/// image urls reset to the defaults.
pub fn update_profile(db: &Database, user_id: i64, req: &ProfileUpdateRequest) -> Result<User, ApiError> {
    let row = db.get_user_by_id(user_id)?.ok_or(ApiError::NotFound("User"))?;
    if !verify_password(&row.password, &req.password) {
        return Err(ApiError::Unauthorized("wrong password for profile edit"));
    }

    if let Some(username) = &req.username {
        validate_username(username)?;
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }

    let changes = ProfileChanges {
        username: req.username.clone(),
        email: req.email.clone(),
        image_url: req.image_url.as_deref().map(|url| or_default(url, DEFAULT_IMAGE_URL)),
        header_image_url: req
            .header_image_url
            .as_deref()
            .map(|url| or_default(url, DEFAULT_HEADER_IMAGE_URL)),
        bio: req.bio.clone(),
        location: req.location.clone(),
    };
    db.update_user(user_id, &changes)?;

    load_user(db, user_id)
}

fn or_default(url: &str, default: &str) -> String {
    if url.trim().is_empty() {
        default.to_string()
    } else {
        url.to_string()
    }
}

fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if username.trim().is_empty() || len > MAX_USERNAME_LEN {
        return Err(ApiError::InvalidInput(format!(
            "username must be 1-{MAX_USERNAME_LEN} characters"
        )));
    }
    if username.trim() != username {
        return Err(ApiError::InvalidInput(
            "username must not start or end with whitespace".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::InvalidInput("invalid email address".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_two_users() -> (Database, User, User) {
        let db = Database::open_in_memory().unwrap();
        let u1 = signup(
            &db,
            Signup {
                id: Some(10000),
                username: "test",
                email: "test@email.com",
                password: "password",
                image_url: None,
            },
        )
        .unwrap();
        let u2 = signup(
            &db,
            Signup {
                id: Some(20000),
                username: "testagain",
                email: "testagain@email.com",
                password: "password2",
                image_url: None,
            },
        )
        .unwrap();
        (db, u1, u2)
    }

    #[test]
    fn signup_stores_digest_not_plaintext() {
        let db = Database::open_in_memory().unwrap();
        let user = signup(
            &db,
            Signup {
                id: Some(52342),
                username: "YetAnotherTest",
                email: "testthings@someemail.com",
                password: "password",
                image_url: None,
            },
        )
        .unwrap();

        assert_eq!(user.id, 52342);
        assert_eq!(user.username, "YetAnotherTest");
        assert_eq!(user.email, "testthings@someemail.com");
        assert_eq!(user.image_url, DEFAULT_IMAGE_URL);

        let row = db.get_user_by_id(52342).unwrap().unwrap();
        assert_ne!(row.password, "password");
        assert!(verify_password(&row.password, "password"));
    }

    #[test]
    fn signup_rejects_duplicates() {
        let (db, _, _) = with_two_users();
        let err = signup(
            &db,
            Signup {
                id: None,
                username: "test",
                email: "new@email.com",
                password: "password",
                image_url: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUsername));

        let err = signup(
            &db,
            Signup {
                id: None,
                username: "newname",
                email: "test@email.com",
                password: "password",
                image_url: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[test]
    fn signup_validates_input() {
        let db = Database::open_in_memory().unwrap();
        let bad = [
            ("", "a@b.c", "password"),
            (" bob", "a@b.c", "password"),
            ("bob\t", "a@b.c", "password"),
            ("name", "no-at-sign", "password"),
            ("name", "a@b.c", "short"),
        ];
        for (username, email, password) in bad {
            let err = signup(
                &db,
                Signup {
                    id: None,
                    username,
                    email,
                    password,
                    image_url: None,
                },
            )
            .unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "{username}/{email}/{password}");
        }
    }

    #[test]
    fn authenticate_checks_password() {
        let (db, u1, _) = with_two_users();

        let user = authenticate(&db, "test", "password").unwrap().unwrap();
        assert_eq!(user.id, u1.id);

        assert!(authenticate(&db, "test", "wrongpassword").unwrap().is_none());
        assert!(authenticate(&db, "wrongusername", "password").unwrap().is_none());
    }

    #[test]
    fn follow_scenario() {
        let (db, u1, u2) = with_two_users();
        db.follow(u1.id, u2.id).unwrap();

        let following = db.following(u1.id).unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].id, 20000);
        assert_eq!(db.followers(u2.id).unwrap().len(), 1);
        assert!(db.following(u2.id).unwrap().is_empty());
    }

    #[test]
    fn profile_edit_requires_password() {
        let (db, u1, _) = with_two_users();
        let req = ProfileUpdateRequest {
            password: "nope".into(),
            bio: Some("hi".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_profile(&db, u1.id, &req).unwrap_err(),
            ApiError::Unauthorized(_)
        ));

        let req = ProfileUpdateRequest {
            password: "password".into(),
            bio: Some("hi".into()),
            image_url: Some("".into()),
            location: Some("Lisbon".into()),
            ..Default::default()
        };
        let user = update_profile(&db, u1.id, &req).unwrap();
        assert_eq!(user.bio.as_deref(), Some("hi"));
        assert_eq!(user.location.as_deref(), Some("Lisbon"));
        assert_eq!(user.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(user.username, "test");
    }

    #[test]
    fn profile_edit_rejects_padded_username() {
        let (db, u1, _) = with_two_users();
        let req = ProfileUpdateRequest {
            password: "password".into(),
            username: Some("test ".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_profile(&db, u1.id, &req).unwrap_err(),
            ApiError::InvalidInput(_)
        ));
    }

    #[test]
    fn profile_edit_rejects_taken_username() {
        let (db, u1, _) = with_two_users();
        let req = ProfileUpdateRequest {
            password: "password".into(),
            username: Some("testagain".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_profile(&db, u1.id, &req).unwrap_err(),
            ApiError::DuplicateUsername
        ));
    }
}
