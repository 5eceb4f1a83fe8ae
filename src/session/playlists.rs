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

//! Playlist operations for the logged-in user.

use std::{iter::Enumerate, slice};

use rand::{rng, seq::SliceRandom};
use tracing::debug;

use super::{Session, SessionState, errors::PlaylistError};
use crate::model::{
    Playlist, User,
    policy::{Field, validate_field},
};

/// Iterator over `(index, playlist)` pairs in storage order.
///
/// It is `Clone`, so a caller can walk the same listing more than once.
pub(crate) type PlaylistListing<'a> = Enumerate<slice::Iter<'a, Playlist>>;

impl Session<'_> {
    fn logged_in_index(&self) -> Result<usize, PlaylistError> {
        match self.state {
            SessionState::LoggedIn { index } => Ok(index),
            _ => Err(PlaylistError::NotLoggedIn),
        }
    }

    fn logged_in_user(&self) -> Result<&User, PlaylistError> {
        let index = self.logged_in_index()?;
        self.store.user(index).ok_or(PlaylistError::NotLoggedIn)
    }

    fn logged_in_user_mut(&mut self) -> Result<&mut User, PlaylistError> {
        let index = self.logged_in_index()?;
        self.store.user_mut(index).ok_or(PlaylistError::NotLoggedIn)
    }

    /// Fails with [`PlaylistError::CapacityReached`] if the current user
    /// cannot own another playlist.
    pub(crate) fn ensure_playlist_capacity(&self) -> Result<(), PlaylistError> {
        if self.logged_in_user()?.is_full() {
            return Err(PlaylistError::CapacityReached);
        }
        Ok(())
    }

    /// Checks that `name` is a valid playlist name the current user does not
    /// already use.
    pub(crate) fn check_playlist_name(&self, name: &str) -> Result<(), PlaylistError> {
        validate_field(Field::PlaylistName, name, false).map_err(PlaylistError::InvalidName)?;

        let user = self.logged_in_user()?;
        if user.playlists().iter().any(|p| p.name() == name) {
            return Err(PlaylistError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Creates a playlist at the end of the current user's collection.
    ///
    /// # Errors
    ///
    /// * [`PlaylistError::NotLoggedIn`] outside a logged-in session.
    /// * [`PlaylistError::CapacityReached`] if the user already holds the
    ///   maximum number of playlists.
    /// * [`PlaylistError::InvalidName`], [`PlaylistError::InvalidDescription`]
    ///   or [`PlaylistError::InvalidSong`] if a field breaks the policy.
    /// * [`PlaylistError::InvalidSongCount`] unless `1 <= songs.len() < MAX_SONGS`.
    /// * [`PlaylistError::DuplicateName`] if the user already has a playlist
    ///   with this name.
    pub(crate) fn create_playlist<S: AsRef<str>>(
        &mut self,
        name: &str,
        description: &str,
        songs: &[S],
    ) -> Result<&Playlist, PlaylistError> {
        self.ensure_playlist_capacity()?;
        let playlist = Playlist::new(name, description, songs.iter().map(AsRef::<str>::as_ref))?;
        self.check_playlist_name(name)?;

        let user = self.logged_in_user_mut()?;

        debug!(
            username = user.username(),
            playlist = name,
            songs = playlist.song_count(),
            "playlist created"
        );
        user.push_playlist(playlist)?;

        user.playlists().last().ok_or(PlaylistError::CapacityReached)
    }

    /// Lists the current user's playlists without modifying anything.
    pub(crate) fn inspect_playlists(&self) -> Result<PlaylistListing<'_>, PlaylistError> {
        Ok(self.logged_in_user()?.playlists().iter().enumerate())
    }

    /// Deletes the playlist at `index` and returns it.
    ///
    /// Later playlists move down one position, so indices stay contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::IndexOutOfRange`] if `index` is not below the
    /// current playlist count.
    pub(crate) fn delete_playlist(&mut self, index: usize) -> Result<Playlist, PlaylistError> {
        let user = self.logged_in_user_mut()?;
        let count = user.playlist_count();

        let removed = user
            .remove_playlist(index)
            .ok_or(PlaylistError::IndexOutOfRange { index, count })?;

        debug!(username = user.username(), playlist = removed.name(), "playlist deleted");

        Ok(removed)
    }

    /// Picks a random song from all of the current user's playlists.
    ///
    /// Returns `None` when the user has no playlists.
    pub(crate) fn random_song(&self) -> Result<Option<&str>, PlaylistError> {
        let mut songs: Vec<&str> = self
            .logged_in_user()?
            .playlists()
            .iter()
            .flat_map(|p| p.songs().iter().map(String::as_str))
            .collect();

        songs.shuffle(&mut rng());

        Ok(songs.first().copied())
    }
}
