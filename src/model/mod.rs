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

//! Domain models and core data structures.
//!
//! This module defines the two persisted records, [`User`] and [`Playlist`].
//! Both are fixed-capacity values: every text field has a hard length limit
//! and every collection a hard count limit. The records can only be built
//! through validating constructors, so a value that exists always satisfies
//! the limits and the character policy in [`policy`].

pub(crate) mod policy;

use thiserror::Error;

use policy::{Field, ValidationError, validate_field};

pub(crate) const MAX_USERNAME_LEN: usize = 31;
pub(crate) const MAX_PASSWORD_LEN: usize = 15;
pub(crate) const MAX_PLAYLIST_NAME_LEN: usize = 31;
pub(crate) const MAX_DESCRIPTION_LEN: usize = 127;
pub(crate) const MAX_SONG_NAME_LEN: usize = 31;

/// Exclusive upper bound on the number of songs in a playlist.
pub(crate) const MAX_SONGS: usize = 24;

pub(crate) const MAX_PLAYLISTS: usize = 32;

/// Reasons a record could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RecordError {
    #[error(transparent)]
    Field(#[from] ValidationError),

    #[error("song {index}: {source}")]
    Song {
        index: usize,
        source: ValidationError,
    },

    #[error("a playlist holds between 1 and {max} songs, got {0}", max = MAX_SONGS - 1)]
    SongCount(usize),

    #[error("a user holds at most {max} playlists, got {0}", max = MAX_PLAYLISTS)]
    TooManyPlaylists(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Playlist {
    name: String,
    description: String,
    songs: Vec<String>,
}

impl Playlist {
    /// Builds a playlist, validating every field.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the name is empty, any field breaks the
    /// character policy or its length limit, or the number of songs is not
    /// in `1..MAX_SONGS`.
    pub(crate) fn new<S: Into<String>>(
        name: impl Into<String>,
        description: impl Into<String>,
        songs: impl IntoIterator<Item = S>,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let description = description.into();
        let songs: Vec<String> = songs.into_iter().map(Into::into).collect();

        validate_field(Field::PlaylistName, &name, false)?;
        validate_field(Field::Description, &description, true)?;

        if songs.is_empty() || songs.len() >= MAX_SONGS {
            return Err(RecordError::SongCount(songs.len()));
        }
        for (index, song) in songs.iter().enumerate() {
            validate_field(Field::Song, song, false)
                .map_err(|source| RecordError::Song { index, source })?;
        }

        Ok(Self {
            name,
            description,
            songs,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn songs(&self) -> &[String] {
        &self.songs
    }

    pub(crate) fn song_count(&self) -> usize {
        self.songs.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    username: String,
    password: String,
    playlists: Vec<Playlist>,
}

impl User {
    /// Builds a user with no playlists.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the credential that is empty,
    /// too long or breaks the character policy.
    pub(crate) fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let username = username.into();
        let password = password.into();

        validate_field(Field::Username, &username, false)?;
        validate_field(Field::Password, &password, false)?;

        Ok(Self {
            username,
            password,
            playlists: Vec::new(),
        })
    }

    /// Builds a user that already owns playlists, as read back from the store.
    pub(crate) fn with_playlists(
        username: impl Into<String>,
        password: impl Into<String>,
        playlists: Vec<Playlist>,
    ) -> Result<Self, RecordError> {
        if playlists.len() > MAX_PLAYLISTS {
            return Err(RecordError::TooManyPlaylists(playlists.len()));
        }

        let mut user = Self::new(username, password)?;
        user.playlists = playlists;
        Ok(user)
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub(crate) fn playlist_count(&self) -> usize {
        self.playlists.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.playlists.len() >= MAX_PLAYLISTS
    }

    /// Appends a playlist, keeping creation order.
    pub(crate) fn push_playlist(&mut self, playlist: Playlist) -> Result<(), RecordError> {
        if self.is_full() {
            return Err(RecordError::TooManyPlaylists(self.playlists.len() + 1));
        }
        self.playlists.push(playlist);
        Ok(())
    }

    /// Removes the playlist at `index`, shifting later playlists down.
    pub(crate) fn remove_playlist(&mut self, index: usize) -> Option<Playlist> {
        if index < self.playlists.len() {
            Some(self.playlists.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::Violation;

    fn playlist(name: &str) -> Playlist {
        Playlist::new(name, "", ["A"]).unwrap()
    }

    #[test]
    fn song_count_tracks_songs() {
        let p = Playlist::new("Road Trip", "", ["A", "B"]).unwrap();
        assert_eq!(p.song_count(), 2);
        assert_eq!(p.songs(), ["A", "B"]);
    }

    #[test]
    fn playlist_needs_at_least_one_song() {
        let err = Playlist::new("Empty", "", Vec::<String>::new()).unwrap_err();
        assert_eq!(err, RecordError::SongCount(0));
    }

    #[test]
    fn playlist_song_limit_is_exclusive() {
        let most: Vec<String> = (0..MAX_SONGS - 1).map(|i| format!("Song {i}")).collect();
        assert!(Playlist::new("Long", "", most.clone()).is_ok());

        let mut too_many = most;
        too_many.push("One more".to_string());
        let err = Playlist::new("Long", "", too_many).unwrap_err();
        assert_eq!(err, RecordError::SongCount(MAX_SONGS));
    }

    #[test]
    fn bad_song_reports_its_index() {
        let err = Playlist::new("Mix", "", ["Fine", "Not;fine"]).unwrap_err();
        match err {
            RecordError::Song { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source.violation, Violation::IllegalCharacter(';'));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn user_rejects_empty_password() {
        let err = User::new("alice", "").unwrap_err();
        assert_eq!(err.field, Field::Password);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut user = User::new("alice", "secret1").unwrap();
        for i in 0..MAX_PLAYLISTS {
            user.push_playlist(playlist(&format!("P{i}"))).unwrap();
        }
        assert!(user.is_full());
        assert!(user.push_playlist(playlist("Extra")).is_err());
        assert_eq!(user.playlist_count(), MAX_PLAYLISTS);
    }

    #[test]
    fn remove_keeps_order_dense() {
        let mut user = User::new("alice", "secret1").unwrap();
        for name in ["One", "Two", "Three"] {
            user.push_playlist(playlist(name)).unwrap();
        }

        let removed = user.remove_playlist(1).unwrap();
        assert_eq!(removed.name(), "Two");

        let names: Vec<&str> = user.playlists().iter().map(Playlist::name).collect();
        assert_eq!(names, ["One", "Three"]);
        assert!(user.remove_playlist(2).is_none());
    }

    #[test]
    fn with_playlists_enforces_capacity() {
        let playlists = (0..=MAX_PLAYLISTS).map(|i| playlist(&format!("P{i}"))).collect();
        let err = User::with_playlists("bob", "pw", playlists).unwrap_err();
        assert_eq!(err, RecordError::TooManyPlaylists(MAX_PLAYLISTS + 1));
    }
}
