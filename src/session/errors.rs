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

use thiserror::Error;

use crate::{
    db::StoreError,
    errors::{Classify, ErrorClass},
    model::{
        MAX_PLAYLISTS, MAX_SONGS, RecordError,
        policy::{Field, ValidationError},
    },
};

#[derive(Debug, Error)]
pub(crate) enum PasswordRejection {
    #[error(transparent)]
    Policy(ValidationError),

    #[error("it does not match")]
    Mismatch,
}

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("invalid username: {0}")]
    InvalidUsername(ValidationError),

    #[error("username {0:?} already exists")]
    UsernameTaken(String),

    #[error("invalid password: {0}")]
    InvalidPassword(PasswordRejection),

    #[error("username {0:?} not found")]
    UserNotFound(String),

    #[error("a user is already logged in")]
    AlreadyLoggedIn,

    #[error(transparent)]
    Store(StoreError),
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        match err.field {
            Field::Username => AuthError::InvalidUsername(err),
            _ => AuthError::InvalidPassword(PasswordRejection::Policy(err)),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(name) => AuthError::UsernameTaken(name),
            other => AuthError::Store(other),
        }
    }
}

impl Classify for AuthError {
    fn class(&self) -> ErrorClass {
        match self {
            AuthError::InvalidUsername(_) => ErrorClass::Validation,
            AuthError::InvalidPassword(PasswordRejection::Policy(_)) => ErrorClass::Validation,
            AuthError::InvalidPassword(PasswordRejection::Mismatch) => ErrorClass::Denied,
            AuthError::UsernameTaken(_) => ErrorClass::Conflict,
            AuthError::UserNotFound(_) => ErrorClass::NotFound,
            AuthError::AlreadyLoggedIn => ErrorClass::State,
            AuthError::Store(e) => e.class(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum PlaylistError {
    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("you already have the maximum of {max} playlists", max = MAX_PLAYLISTS)]
    CapacityReached,

    #[error("invalid name: {0}")]
    InvalidName(ValidationError),

    #[error("invalid description: {0}")]
    InvalidDescription(ValidationError),

    #[error("select a positive number smaller than {max}, got {0}", max = MAX_SONGS)]
    InvalidSongCount(usize),

    #[error("invalid song name for song {index}: {source}")]
    InvalidSong {
        index: usize,
        source: ValidationError,
    },

    #[error("playlist with name {0:?} already exists")]
    DuplicateName(String),

    #[error("there is no playlist {index}, you have {count}")]
    IndexOutOfRange { index: usize, count: usize },
}

impl From<RecordError> for PlaylistError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Field(e) if e.field == Field::Description => {
                PlaylistError::InvalidDescription(e)
            }
            RecordError::Field(e) => PlaylistError::InvalidName(e),
            RecordError::Song { index, source } => PlaylistError::InvalidSong { index, source },
            RecordError::SongCount(count) => PlaylistError::InvalidSongCount(count),
            RecordError::TooManyPlaylists(_) => PlaylistError::CapacityReached,
        }
    }
}

impl Classify for PlaylistError {
    fn class(&self) -> ErrorClass {
        match self {
            PlaylistError::NotLoggedIn => ErrorClass::State,
            PlaylistError::CapacityReached => ErrorClass::Capacity,
            PlaylistError::InvalidName(_)
            | PlaylistError::InvalidDescription(_)
            | PlaylistError::InvalidSongCount(_)
            | PlaylistError::InvalidSong { .. } => ErrorClass::Validation,
            PlaylistError::DuplicateName(_) => ErrorClass::Conflict,
            PlaylistError::IndexOutOfRange { .. } => ErrorClass::NotFound,
        }
    }
}
