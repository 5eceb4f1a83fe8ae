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

//! Character policy for persisted text fields.
//!
//! Every value that reaches the store file passes through [`validate_field`].
//! The policy only admits ASCII alphanumerics and spaces, which also
//! guarantees that no field ever contains the store's field delimiter or a
//! line terminator, so the file format needs no escaping.

use std::fmt;

use thiserror::Error;

/// The record field a value was destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Username,
    Password,
    PlaylistName,
    Description,
    Song,
}

impl Field {
    /// The maximum number of characters the field may hold.
    pub(crate) fn max_len(self) -> usize {
        match self {
            Field::Username => super::MAX_USERNAME_LEN,
            Field::Password => super::MAX_PASSWORD_LEN,
            Field::PlaylistName => super::MAX_PLAYLIST_NAME_LEN,
            Field::Description => super::MAX_DESCRIPTION_LEN,
            Field::Song => super::MAX_SONG_NAME_LEN,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Username => "username",
            Field::Password => "password",
            Field::PlaylistName => "playlist name",
            Field::Description => "description",
            Field::Song => "song name",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Violation {
    Empty,
    TooLong { max: usize, len: usize },
    IllegalCharacter(char),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Empty => f.write_str("must not be empty"),
            Violation::TooLong { max, len } => {
                write!(f, "is {len} characters long, the limit is {max}")
            }
            Violation::IllegalCharacter(c) => {
                write!(f, "contains {c:?}, only letters, digits and spaces are allowed")
            }
        }
    }
}

/// A value rejected by the character policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {violation}")]
pub(crate) struct ValidationError {
    pub(crate) field: Field,
    pub(crate) violation: Violation,
}

/// Returns `true` if the character is admitted by the policy.
pub(crate) fn is_permitted(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' '
}

/// Checks a value against the policy and the length bound of `field`.
///
/// Empty values are only accepted when `allow_empty` is set (playlist
/// descriptions). Over-length values are rejected, never truncated.
pub(crate) fn validate_field(
    field: Field,
    value: &str,
    allow_empty: bool,
) -> Result<(), ValidationError> {
    let fail = |violation| Err(ValidationError { field, violation });

    if value.is_empty() {
        return if allow_empty { Ok(()) } else { fail(Violation::Empty) };
    }

    if let Some(c) = value.chars().find(|c| !is_permitted(*c)) {
        return fail(Violation::IllegalCharacter(c));
    }

    // Only ASCII survives the check above, so bytes and characters agree.
    let len = value.len();
    let max = field.max_len();
    if len > max {
        return fail(Violation::TooLong { max, len });
    }

    Ok(())
}
