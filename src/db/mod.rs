// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data access layer.
//!
//! This module owns the in-memory user store and its backing flat file. The
//! whole file is read once by [`Store::load`] and written back once by
//! [`Store::flush`]; nothing in between touches the disk, so a crash loses
//! every change made since start-up.
//!
//! # File handling
//!
//! * The file is opened only for the duration of a load, and the handle is
//!   dropped on every exit path, including decode failures.
//! * A flush writes a temporary file next to the store and renames it into
//!   place, so readers see either the old contents or the new ones.
//!
//! The process holds the store exclusively. There is no locking, and two
//! processes sharing one file will overwrite each other.

pub(crate) mod codec;

use std::{
    fs::{self, File},
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    errors::{Classify, ErrorClass},
    model::User,
};
use codec::CodecError;

pub(crate) const DEFAULT_MAX_USERS: usize = 1024;

/// How a supplied username is compared against stored ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum KeyMatch {
    #[default]
    Exact,
    /// The stored name only has to start with the supplied one, so `al`
    /// finds `alice`. This is how legacy deployments resolved names.
    Prefix,
}

impl KeyMatch {
    fn matches(self, stored: &str, supplied: &str) -> bool {
        match self {
            KeyMatch::Exact => stored == supplied,
            KeyMatch::Prefix => stored.starts_with(supplied),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StoreOptions {
    pub(crate) max_users: usize,
    pub(crate) key_match: KeyMatch,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_MAX_USERS,
            key_match: KeyMatch::Exact,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("the store is full ({capacity} users)")]
    Full { capacity: usize },

    #[error("username {0:?} is already registered")]
    DuplicateUsername(String),

    #[error("cannot load {path}: {source}")]
    Load {
        path: PathBuf,
        source: CodecError,
    },

    #[error("cannot write {path}: {source}")]
    Flush { path: PathBuf, source: io::Error },
}

impl Classify for StoreError {
    fn class(&self) -> ErrorClass {
        match self {
            StoreError::Full { .. } => ErrorClass::Capacity,
            StoreError::DuplicateUsername(_) => ErrorClass::Conflict,
            StoreError::Load { source, .. } => source.class(),
            StoreError::Flush { .. } => ErrorClass::Io,
        }
    }
}

/// The in-memory collection of every user, in file order.
#[derive(Debug)]
pub(crate) struct Store {
    path: PathBuf,
    users: Vec<User>,
    options: StoreOptions,
}

impl Store {
    /// Creates an empty store that will be flushed to `path`.
    pub(crate) fn new(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            path: path.into(),
            users: Vec::new(),
            options,
        }
    }

    /// Reads the store file at `path`.
    ///
    /// A missing file is not an error: it yields an empty store, which is
    /// the normal state on first run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the file cannot be read or is
    /// malformed. The error names the failing line. No partial store is
    /// returned. Duplicate usernames or more users than the configured
    /// capacity are also reported, as a conflict or capacity error.
    pub(crate) fn load(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.into();
        let load_error = |source: CodecError| StoreError::Load {
            path: path.clone(),
            source,
        };

        let users = match File::open(&path) {
            Ok(file) => codec::decode_users(BufReader::new(file)).map_err(load_error)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no store file yet, starting empty");
                Vec::new()
            }
            Err(e) => return Err(load_error(e.into())),
        };

        let mut store = Self::new(path, options);
        store.replace(users)?;
        info!(path = %store.path.display(), users = store.len(), "store loaded");

        Ok(store)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn capacity(&self) -> usize {
        self.options.max_users
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.users.len() >= self.options.max_users
    }

    pub(crate) fn users(&self) -> &[User] {
        &self.users
    }

    /// Finds the position of the first user matching `username`.
    pub(crate) fn position(&self, username: &str) -> Option<usize> {
        let key_match = self.options.key_match;
        self.users
            .iter()
            .position(|u| key_match.matches(u.username(), username))
    }

    pub(crate) fn find_user(&self, username: &str) -> Option<&User> {
        self.position(username).map(|i| &self.users[i])
    }

    pub(crate) fn user(&self, index: usize) -> Option<&User> {
        self.users.get(index)
    }

    pub(crate) fn user_mut(&mut self, index: usize) -> Option<&mut User> {
        self.users.get_mut(index)
    }

    /// Adds a user at the end of the store and returns its position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Full`] at capacity, or
    /// [`StoreError::DuplicateUsername`] if [`Store::find_user`] already
    /// matches the new username.
    pub(crate) fn insert_user(&mut self, user: User) -> Result<usize, StoreError> {
        if self.is_full() {
            return Err(StoreError::Full {
                capacity: self.options.max_users,
            });
        }
        if self.find_user(user.username()).is_some() {
            return Err(StoreError::DuplicateUsername(user.username().to_string()));
        }

        debug!(username = user.username(), "user inserted");
        self.users.push(user);

        Ok(self.users.len() - 1)
    }

    /// Replaces every user at once.
    ///
    /// The new set is checked against capacity and username uniqueness
    /// before anything changes; on error the store is left as it was.
    pub(crate) fn replace(&mut self, users: Vec<User>) -> Result<(), StoreError> {
        if users.len() > self.options.max_users {
            return Err(StoreError::Full {
                capacity: self.options.max_users,
            });
        }
        for (i, user) in users.iter().enumerate() {
            if users[..i].iter().any(|u| u.username() == user.username()) {
                return Err(StoreError::DuplicateUsername(user.username().to_string()));
            }
        }

        self.users = users;
        Ok(())
    }

    /// Writes every user back to the store file.
    ///
    /// The contents go to a temporary file in the same directory, which is
    /// synced and then renamed over the store file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Flush`] if the directory cannot be created or
    /// the temporary file cannot be written or renamed. The previous file is
    /// untouched in that case.
    pub(crate) fn flush(&self) -> Result<(), StoreError> {
        let flush_error = |source: io::Error| StoreError::Flush {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(flush_error)?;

        let contents = codec::encode_store(&self.users);

        let mut tmp = NamedTempFile::new_in(dir).map_err(flush_error)?;
        tmp.write_all(contents.as_bytes()).map_err(flush_error)?;
        tmp.as_file().sync_all().map_err(flush_error)?;
        tmp.persist(&self.path).map_err(|e| flush_error(e.error))?;

        info!(path = %self.path.display(), users = self.len(), "store flushed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::model::Playlist;

    fn user(name: &str) -> User {
        User::new(name, "pw").unwrap()
    }

    fn options(max_users: usize, key_match: KeyMatch) -> StoreOptions {
        StoreOptions {
            max_users,
            key_match,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = Store::load(dir.path().join("absent.db"), StoreOptions::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let mut store = Store::new("unused.db", StoreOptions::default());
        store.insert_user(user("alice")).unwrap();

        let err = store.insert_user(User::new("alice", "other").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(ref name) if name == "alice"));
        assert_eq!(err.class(), ErrorClass::Conflict);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn full_store_rejects_inserts() {
        let mut store = Store::new("unused.db", options(2, KeyMatch::Exact));
        store.insert_user(user("alice")).unwrap();
        store.insert_user(user("bob")).unwrap();

        let err = store.insert_user(user("carol")).unwrap_err();
        assert!(matches!(err, StoreError::Full { capacity: 2 }));
        assert_eq!(err.class(), ErrorClass::Capacity);
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let mut store = Store::new("unused.db", StoreOptions::default());
        store.insert_user(user("alice")).unwrap();

        assert!(store.find_user("alice").is_some());
        assert!(store.find_user("Alice").is_none());
        assert!(store.find_user("al").is_none());
    }

    #[test]
    fn prefix_match_resolves_truncated_names() {
        let mut store = Store::new("unused.db", options(8, KeyMatch::Prefix));
        store.insert_user(user("alice")).unwrap();

        assert_eq!(store.find_user("al").map(User::username), Some("alice"));
        // Under prefix matching a shorter name collides with a longer one.
        assert!(matches!(
            store.insert_user(user("ali")),
            Err(StoreError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn flush_then_load_restores_users() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.db");

        let mut alice = user("alice");
        alice
            .push_playlist(Playlist::new("Road Trip", "", ["A", "B"]).unwrap())
            .unwrap();

        let mut store = Store::new(&path, StoreOptions::default());
        store.insert_user(alice.clone()).unwrap();
        store.insert_user(user("bob")).unwrap();
        store.flush().unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "alice;pw;1\nRoad Trip;;A;B\nbob;pw;0\n"
        );

        let reloaded = Store::load(&path, StoreOptions::default()).unwrap();
        assert_eq!(reloaded.users(), [alice, user("bob")]);
    }

    #[test]
    fn flush_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        fs::write(&path, "old;pw;0\nstale;pw;0\n").unwrap();

        let mut store = Store::load(&path, StoreOptions::default()).unwrap();
        store.replace(vec![user("fresh")]).unwrap();
        store.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh;pw;0\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn malformed_file_names_the_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        fs::write(&path, "alice;pw;1\nRoad Trip;;A;\n").unwrap();

        let err = Store::load(&path, StoreOptions::default()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Malformed);
        assert!(matches!(
            err,
            StoreError::Load {
                source: CodecError::MalformedRecord { line: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn undecodable_bytes_are_malformed_not_io() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        fs::write(&path, b"bob;pw;0\nal\xffce;pw;0\n").unwrap();

        let err = Store::load(&path, StoreOptions::default()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Malformed);
        assert!(matches!(
            err,
            StoreError::Load {
                source: CodecError::MalformedRecord { line: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn load_rejects_duplicate_users_in_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.db");
        fs::write(&path, "alice;pw;0\nalice;pw2;0\n").unwrap();

        let err = Store::load(&path, StoreOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(_)));
    }

    #[test]
    fn replace_leaves_store_untouched_on_error() {
        let mut store = Store::new("unused.db", options(2, KeyMatch::Exact));
        store.insert_user(user("alice")).unwrap();

        let too_many = vec![user("a"), user("b"), user("c")];
        assert!(store.replace(too_many).is_err());
        assert_eq!(store.users(), [user("alice")]);
    }
}
