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

use crate::model::Playlist;

/// Formats a playlist for the inspect listing.
///
/// The first line carries the playlist's position, which is the number the
/// user enters to delete it. Songs follow, one per indented line.
///
/// # Examples
///
/// ```ignore
/// let p = Playlist::new("Road Trip", "", ["A"]).unwrap();
/// assert_eq!(format_playlist(0, &p), "[0] Playlist: Road Trip\n\"\"\n\tSong 0: A\n");
/// ```
pub(crate) fn format_playlist(index: usize, playlist: &Playlist) -> String {
    let mut out = format!(
        "[{index}] Playlist: {}\n\"{}\"\n",
        playlist.name(),
        playlist.description()
    );
    for (i, song) in playlist.songs().iter().enumerate() {
        out.push_str(&format!("\tSong {i}: {song}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_song_in_order() {
        let p = Playlist::new("Road Trip", "Summer", ["A", "B"]).unwrap();
        assert_eq!(
            format_playlist(2, &p),
            "[2] Playlist: Road Trip\n\"Summer\"\n\tSong 0: A\n\tSong 1: B\n"
        );
    }
}
