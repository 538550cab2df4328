//! User directory.
//!
//! Users are kept in storage order. Usernames are case-insensitive and are
//! normalized to lowercase everywhere; credentials are compared exactly.
//! Only the `admin` user may register new users.

use serde::Serialize;

use crate::codec::{self, Decoded};
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::task::{validate_storable, validate_text_field};

/// The privileged username
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub credential: String,
}

/// In-memory snapshot of the registered users.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Usernames in storage order
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(|user| user.username.as_str())
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        let wanted = normalize_username(username);
        self.users.iter().find(|user| user.username == wanted)
    }

    /// Case-insensitive membership test
    pub fn exists(&self, username: &str) -> bool {
        self.get(username).is_some()
    }

    /// Exact credential match for the (case-insensitive) username.
    pub fn authenticate(&self, username: &str, credential: &str) -> bool {
        self.get(username)
            .is_some_and(|user| user.credential == credential.trim())
    }
}

/// Summary of a user for output; never includes the credential.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub admin: bool,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            admin: is_admin(&user.username),
        }
    }
}

/// Result of loading the user file.
#[derive(Debug, Clone)]
pub struct UserLoad {
    pub directory: UserDirectory,
    /// Lines that could not be decoded, including duplicate usernames
    pub skipped: usize,
    /// The backing file does not exist yet
    pub missing: bool,
}

pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

pub fn is_admin(username: &str) -> bool {
    username.trim().eq_ignore_ascii_case(ADMIN_USERNAME)
}

#[derive(Debug, Clone)]
pub struct UserStore {
    storage: Storage,
}

impl UserStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Result<UserLoad> {
        let path = self.storage.users_file();
        let Some(lines) = self.storage.read_lines(&path)? else {
            tracing::warn!(path = %path.display(), "user file not found, treating as empty");
            return Ok(UserLoad {
                directory: UserDirectory::default(),
                skipped: 0,
                missing: true,
            });
        };

        let Decoded { records, skipped } = codec::decode_users(&lines);
        if skipped > 0 {
            tracing::warn!(path = %path.display(), skipped, "skipped malformed user lines");
        }
        tracing::debug!(users = records.len(), "loaded users");
        Ok(UserLoad {
            directory: UserDirectory::new(records),
            skipped,
            missing: false,
        })
    }

    /// Register a new user on behalf of `requesting_user`.
    ///
    /// `directory` is the caller's current view; uniqueness is checked
    /// against it and again against a fresh load right before the append.
    /// Returns the refreshed directory.
    pub fn register(
        &self,
        directory: UserDirectory,
        username: &str,
        credential: &str,
        requesting_user: &str,
    ) -> Result<UserDirectory> {
        if !is_admin(requesting_user) {
            return Err(Error::Forbidden("register users".to_string()));
        }

        let username = normalize_username(validate_text_field(username, "username")?);
        let credential = validate_storable(credential, "credential")?;

        if directory.exists(&username) {
            return Err(Error::DuplicateUsername(username));
        }

        let current = self.load()?.directory;
        if current.exists(&username) {
            return Err(Error::DuplicateUsername(username));
        }

        let record = UserRecord {
            username,
            credential: credential.to_string(),
        };
        self.storage
            .append_line(&self.storage.users_file(), &codec::encode_user(&record))?;
        tracing::debug!(username = %record.username, "registered user");

        Ok(self.load()?.directory)
    }
}
