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

//! Session state and authentication.
//!
//! A [`Session`] mutably borrows the [`Store`] for as long as it lives and
//! records which user, if any, is logged in. The logged-in user is an index
//! into the store rather than a copy, so a playlist created through the
//! session is part of the store when it is flushed.
//!
//! # States
//!
//! ```text
//! LoggedOut -> Registering -> LoggedIn
//! LoggedOut -> LoggingIn   -> LoggedIn
//! ```
//!
//! `LoggedIn` is terminal: there is no logout.
//!
//! # Auth modes
//!
//! [`AuthMode::Legacy`] keeps the behaviour of existing deployments, including
//! its known weaknesses: prefix password comparison and the deterministic
//! password generator. [`AuthMode::Strict`] compares passwords exactly and
//! generates random ones.

pub(crate) mod errors;
pub(crate) mod password;
mod playlists;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    db::{KeyMatch, Store},
    model::{
        User,
        policy::{Field, validate_field},
    },
};
use errors::{AuthError, PasswordRejection};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AuthMode {
    #[default]
    Strict,
    Legacy,
}

impl AuthMode {
    /// The username matching the store should use under this mode.
    pub(crate) fn key_match(self) -> KeyMatch {
        match self {
            AuthMode::Strict => KeyMatch::Exact,
            AuthMode::Legacy => KeyMatch::Prefix,
        }
    }

    fn generate_password(self, username: &str) -> String {
        match self {
            AuthMode::Strict => password::random_password(),
            AuthMode::Legacy => password::generate_password(username),
        }
    }

    /// Checks an entered password against the stored one.
    ///
    /// In legacy mode the last entered character is dropped (normally the
    /// line terminator) and the rest only has to be a prefix
    /// of the stored password, so `secret` and `secret1x` both open
    /// `secret1`.
    fn password_matches(self, stored: &str, entered: &str) -> bool {
        match self {
            AuthMode::Strict => stored == entered,
            AuthMode::Legacy => {
                let mut chars = entered.chars();
                chars.next_back().is_some() && stored.starts_with(chars.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    LoggedOut,
    Registering,
    LoggingIn,
    LoggedIn { index: usize },
}

/// The outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Registration {
    pub(crate) username: String,
    /// Set when the password was generated. It is not retrievable later.
    pub(crate) generated_password: Option<String>,
}

pub(crate) struct Session<'s> {
    store: &'s mut Store,
    mode: AuthMode,
    state: SessionState,
}

impl<'s> Session<'s> {
    pub(crate) fn new(store: &'s mut Store, mode: AuthMode) -> Self {
        Self {
            store,
            mode,
            state: SessionState::LoggedOut,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn mode(&self) -> AuthMode {
        self.mode
    }

    pub(crate) fn current_user(&self) -> Option<&User> {
        match self.state {
            SessionState::LoggedIn { index } => self.store.user(index),
            _ => None,
        }
    }

    fn ensure_logged_out(&self) -> Result<(), AuthError> {
        match self.state {
            SessionState::LoggedIn { .. } => Err(AuthError::AlreadyLoggedIn),
            _ => Ok(()),
        }
    }

    /// Marks the session as collecting registration details.
    pub(crate) fn begin_registration(&mut self) -> Result<(), AuthError> {
        self.ensure_logged_out()?;
        self.state = SessionState::Registering;
        Ok(())
    }

    /// Marks the session as collecting login details.
    pub(crate) fn begin_login(&mut self) -> Result<(), AuthError> {
        self.ensure_logged_out()?;
        self.state = SessionState::LoggingIn;
        Ok(())
    }

    /// Returns to `LoggedOut` after an abandoned registration or login.
    pub(crate) fn abandon(&mut self) {
        if !matches!(self.state, SessionState::LoggedIn { .. }) {
            self.state = SessionState::LoggedOut;
        }
    }

    /// Whether a stored user matches `username`.
    pub(crate) fn has_user(&self, username: &str) -> bool {
        self.store.find_user(username).is_some()
    }

    /// Checks that `username` is valid and not yet registered.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidUsername`] or [`AuthError::UsernameTaken`].
    pub(crate) fn check_username_available(&self, username: &str) -> Result<(), AuthError> {
        validate_field(Field::Username, username, false).map_err(AuthError::InvalidUsername)?;
        if self.has_user(username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }
        Ok(())
    }

    /// Registers a new user and logs them in.
    ///
    /// An empty `password` asks for one to be generated; it is returned in
    /// [`Registration::generated_password`] and shown to the caller once.
    ///
    /// # Errors
    ///
    /// * [`AuthError::InvalidUsername`] if the username is empty, too long
    ///   or breaks the character policy.
    /// * [`AuthError::UsernameTaken`] if the store already matches it.
    /// * [`AuthError::InvalidPassword`] if a supplied password breaks the
    ///   length or character policy.
    /// * [`AuthError::Store`] if the store is full.
    /// * [`AuthError::AlreadyLoggedIn`] if the session is already logged in.
    pub(crate) fn register(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        self.ensure_logged_out()?;

        self.check_username_available(username)?;

        let (password, generated_password) = if password.is_empty() {
            let generated = self.mode.generate_password(username);
            (generated.clone(), Some(generated))
        } else {
            validate_field(Field::Password, password, false)
                .map_err(|e| AuthError::InvalidPassword(PasswordRejection::Policy(e)))?;
            (password.to_string(), None)
        };

        let user = User::new(username, password)?;
        let index = self.store.insert_user(user)?;
        self.state = SessionState::LoggedIn { index };

        info!(username, generated = generated_password.is_some(), "user registered");

        Ok(Registration {
            username: username.to_string(),
            generated_password,
        })
    }

    /// Logs in an existing user.
    ///
    /// # Errors
    ///
    /// * [`AuthError::UserNotFound`] if no stored user matches `username`.
    /// * [`AuthError::InvalidPassword`] if the password is rejected under the
    ///   session's [`AuthMode`].
    /// * [`AuthError::AlreadyLoggedIn`] if the session is already logged in.
    pub(crate) fn login(&mut self, username: &str, password: &str) -> Result<&User, AuthError> {
        self.ensure_logged_out()?;

        let Some(index) = self.store.position(username) else {
            debug!(username, "login for unknown user");
            return Err(AuthError::UserNotFound(username.to_string()));
        };

        let user = &self.store.users()[index];
        if !self.mode.password_matches(user.password(), password) {
            warn!(username = user.username(), "login rejected");
            return Err(AuthError::InvalidPassword(PasswordRejection::Mismatch));
        }

        info!(username = user.username(), "user logged in");
        self.state = SessionState::LoggedIn { index };

        Ok(user)
    }
}
