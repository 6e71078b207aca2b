/// Warbler credential store.
///
/// Passwords are hashed with Argon2id and a per-password random salt. The
/// resulting PHC string embeds algorithm, parameters and salt, so it is the
/// only thing that needs to be stored.
pub mod password;

pub use password::{CredentialError, hash_password, verify_password};
