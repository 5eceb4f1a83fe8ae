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

//! Line-oriented record encoding for the store file.
//!
//! Each user is written as one header line followed by one line per
//! playlist:
//!
//! ```text
//! alice;secret1;2
//! Road Trip;;A;B
//! Focus;Quiet things;Intro;Outro
//! ```
//!
//! * Header: `username;password;playlist_count`.
//! * Playlist: `name;description;song_1;...;song_n`, with no trailing
//!   delimiter.
//!
//! Nothing is escaped. The character policy in [`crate::model::policy`]
//! keeps the delimiter and line terminators out of every field, and the
//! decoder rebuilds records through the same validating constructors, so a
//! corrupt or hand-edited file is rejected instead of being half-trusted.

use std::io::{self, BufRead, Lines};

use thiserror::Error;

use crate::{
    errors::{Classify, ErrorClass},
    model::{MAX_PLAYLISTS, Playlist, RecordError, User},
};

pub(crate) const FIELD_DELIMITER: char = ';';

const HEADER_FIELDS: usize = 3;

#[derive(Debug, Error)]
pub(crate) enum CodecError {
    /// The contents of the file do not describe valid records.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("failed to read store: {0}")]
    Io(#[from] io::Error),
}

impl Classify for CodecError {
    fn class(&self) -> ErrorClass {
        match self {
            CodecError::MalformedRecord { .. } => ErrorClass::Malformed,
            CodecError::Io(_) => ErrorClass::Io,
        }
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> CodecError {
    CodecError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(FIELD_DELIMITER);
        }
        out.push_str(field);
    }
    out.push('\n');
}

/// Encodes a single user and its playlists.
pub(crate) fn encode_user(user: &User) -> String {
    let mut out = String::new();

    let count = user.playlist_count().to_string();
    push_record(&mut out, [user.username(), user.password(), count.as_str()]);

    for playlist in user.playlists() {
        let head = [playlist.name(), playlist.description()];
        let songs = playlist.songs().iter().map(String::as_str);
        push_record(&mut out, head.into_iter().chain(songs));
    }

    out
}

/// Encodes every user, in order, into the full contents of a store file.
pub(crate) fn encode_store(users: &[User]) -> String {
    users.iter().map(encode_user).collect()
}

/// Line reader that remembers the 1-based number of the last line read.
struct NumberedLines<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> NumberedLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, CodecError> {
        match self.lines.next() {
            Some(Ok(text)) => {
                self.line += 1;
                Ok(Some(text))
            }
            Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                self.line += 1;
                Err(malformed(self.line, "line is not valid UTF-8"))
            }
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }
}

/// Decodes every user from `reader` until the end of input.
///
/// End of input is only accepted where a user header would start. A file
/// that ends while playlists are still owed is malformed.
///
/// # Errors
///
/// Returns [`CodecError::MalformedRecord`] with the offending line number if
/// a line is missing, a count is not a number, a line carries the wrong
/// number of fields, or any field breaks its length or character limits.
/// Returns [`CodecError::Io`] if the reader fails.
pub(crate) fn decode_users<R: BufRead>(reader: R) -> Result<Vec<User>, CodecError> {
    let mut lines = NumberedLines::new(reader);
    let mut users = Vec::new();

    while let Some(header) = lines.next_line()? {
        users.push(decode_user(&mut lines, &header)?);
    }

    Ok(users)
}

/// Decodes one user from its header line and the playlist lines after it.
fn decode_user<R: BufRead>(lines: &mut NumberedLines<R>, header: &str) -> Result<User, CodecError> {
    let header_line = lines.line;
    let (username, password, count) = parse_header(header_line, header)?;

    let mut playlists = Vec::with_capacity(count);
    for n in 0..count {
        let Some(text) = lines.next_line()? else {
            return Err(malformed(
                lines.line + 1,
                format!("user {username:?} declares {count} playlists but only {n} follow"),
            ));
        };
        playlists.push(parse_playlist(lines.line, &text)?);
    }

    User::with_playlists(username, password, playlists)
        .map_err(|e| malformed(header_line, e.to_string()))
}

fn parse_header(line: usize, text: &str) -> Result<(&str, &str, usize), CodecError> {
    let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
    let [username, password, count] = fields[..] else {
        return Err(malformed(
            line,
            format!(
                "user header needs {HEADER_FIELDS} fields, found {}",
                fields.len()
            ),
        ));
    };

    // `str::parse` would also accept a leading '+'.
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(
            line,
            format!("playlist count {count:?} is not a number"),
        ));
    }
    let count: usize = count
        .parse()
        .map_err(|_| malformed(line, format!("playlist count {count:?} is out of range")))?;

    if count > MAX_PLAYLISTS {
        return Err(malformed(
            line,
            RecordError::TooManyPlaylists(count).to_string(),
        ));
    }

    Ok((username, password, count))
}

fn parse_playlist(line: usize, text: &str) -> Result<Playlist, CodecError> {
    let fields: Vec<&str> = text.split(FIELD_DELIMITER).collect();
    let [name, description, songs @ ..] = &fields[..] else {
        return Err(malformed(
            line,
            format!(
                "playlist needs a name and a description, found {} field(s)",
                fields.len()
            ),
        ));
    };

    Playlist::new(*name, *description, songs.iter().copied())
        .map_err(|e| malformed(line, e.to_string()))
}
