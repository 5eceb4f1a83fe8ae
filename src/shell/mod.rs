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

//! Menu-driven command-line shell.
//!
//! The shell reads menu choices and field values one line at a time and
//! translates them into [`Session`] operations. It owns no state of its own
//! beyond its input and output streams, so any [`BufRead`] and [`Write`]
//! pair can drive it.
//!
//! # Recovery
//!
//! * Validation and not-found errors while collecting a field re-prompt for
//!   that field.
//! * Capacity errors and refused credentials abandon the current operation
//!   and return to the menu.
//! * End of input is treated as choosing Exit.

use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    errors::Classify,
    model::{
        MAX_SONGS,
        policy::{Field, validate_field},
    },
    session::{AuthMode, Session},
    util::{format::format_playlist, term},
};

const BANNER: &str = concat!("Vulnify (version: ", env!("CARGO_PKG_VERSION"), ")");

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Unwraps a prompted value, or leaves the calling flow on end of input.
macro_rules! or_exit {
    ($value:expr) => {
        match $value {
            Some(value) => value,
            None => return Ok(Flow::Exit),
        }
    };
}

pub(crate) struct Shell<R, W> {
    input: R,
    output: W,
    styled: bool,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub(crate) fn new(input: R, output: W, styled: bool) -> Self {
        Self {
            input,
            output,
            styled,
        }
    }

    /// Runs the main menu and, once someone is logged in, the user menu.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    /// Operation failures are reported to the user and never end the shell.
    pub(crate) fn run(&mut self, session: &mut Session<'_>) -> Result<()> {
        writeln!(self.output, "{BANNER}\n").context("Failed to write to output")?;

        let flow = self.main_menu(session)?;
        debug!(state = ?session.state(), "main menu closed");
        if flow == Flow::Exit {
            return Ok(());
        }

        self.user_menu(session)?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;

        Ok((read > 0).then_some(line))
    }

    /// Prints `text` and a `> ` marker, then reads one line as typed,
    /// including its terminator.
    fn prompt_raw(&mut self, text: &str) -> Result<Option<String>> {
        writeln!(self.output, "{text}")?;
        write!(self.output, "> ")?;
        self.output.flush()?;

        self.read_line()
    }

    /// Like [`Shell::prompt_raw`], with the line terminator removed.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        Ok(self.prompt_raw(text)?.map(|line| strip_terminator(&line).to_string()))
    }

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}").context("Failed to write to output")
    }

    fn error(&mut self, message: impl Display) -> Result<()> {
        let line = term::error_line(&capitalise(&message.to_string()), self.styled);
        self.say(line)
    }

    fn main_menu(&mut self, session: &mut Session<'_>) -> Result<Flow> {
        loop {
            let choice = or_exit!(self.prompt("\nSelect an option\n1. Register\n2. Login\n0. Exit")?);

            let logged_in = match choice.trim() {
                "1" => self.register(session)?,
                "2" => self.login(session)?,
                "0" => return Ok(Flow::Exit),
                other => {
                    self.error(format!("Unknown option {other:?}"))?;
                    false
                }
            };

            if logged_in {
                return Ok(Flow::Continue);
            }
            session.abandon();
        }
    }

    /// Returns `Ok(true)` once the new user is logged in.
    fn register(&mut self, session: &mut Session<'_>) -> Result<bool> {
        if let Err(e) = session.begin_registration() {
            self.error(e)?;
            return Ok(false);
        }

        let username = loop {
            let Some(username) = self.prompt("Insert username")? else {
                return Ok(false);
            };
            match session.check_username_available(&username) {
                Ok(()) => break username,
                Err(e) if e.is_retryable() => self.error(e)?,
                Err(e) => {
                    self.error(e)?;
                    return Ok(false);
                }
            }
        };

        let Some(password) = self.prompt_valid(
            "Insert password [Empty to generate a safe password automatically]",
            |password| validate_field(Field::Password, password, true),
        )?
        else {
            return Ok(false);
        };

        match session.register(&username, &password) {
            Ok(registration) => {
                debug!(username = registration.username.as_str(), "registration shown");
                if let Some(generated) = registration.generated_password {
                    self.say(format!("Your password is: {generated}"))?;
                }
                self.say("\nUser successfully registered")?;
                Ok(true)
            }
            Err(e) => {
                self.error(e)?;
                Ok(false)
            }
        }
    }

    /// Returns `Ok(true)` once the user is logged in.
    fn login(&mut self, session: &mut Session<'_>) -> Result<bool> {
        if let Err(e) = session.begin_login() {
            self.error(e)?;
            return Ok(false);
        }

        let username = loop {
            let Some(username) = self.prompt("Insert username")? else {
                return Ok(false);
            };
            if session.has_user(&username) {
                break username;
            }
            self.error("Username not found")?;
        };

        let Some(raw) = self.prompt_raw("Insert password")? else {
            return Ok(false);
        };
        let password = match session.mode() {
            AuthMode::Legacy => legacy_password_line(&raw),
            AuthMode::Strict => strip_terminator(&raw).to_string(),
        };

        match session.login(&username, &password) {
            Ok(_) => {
                self.say("\nLogin successful")?;
                Ok(true)
            }
            Err(e) => {
                self.error(e)?;
                Ok(false)
            }
        }
    }

    fn user_menu(&mut self, session: &mut Session<'_>) -> Result<()> {
        loop {
            let Some(choice) = self.prompt(
                "\nSelect an option\n1. Create a new playlist\n2. Inspect your playlists\n\
                 3. Play a random song\n4. Delete a playlist\n0. Exit",
            )?
            else {
                return Ok(());
            };

            let flow = match choice.trim() {
                "1" => self.create_playlist(session)?,
                "2" => self.inspect_playlists(session)?,
                "3" => self.play_random_song(session)?,
                "4" => self.delete_playlist(session)?,
                "0" => Flow::Exit,
                other => {
                    self.error(format!("Unknown option {other:?}"))?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Prompts until `check` accepts the value or input ends.
    fn prompt_valid<E: Display>(
        &mut self,
        text: &str,
        check: impl Fn(&str) -> Result<(), E>,
    ) -> Result<Option<String>> {
        loop {
            let Some(value) = self.prompt(text)? else {
                return Ok(None);
            };
            match check(&value) {
                Ok(()) => return Ok(Some(value)),
                Err(e) => self.error(e)?,
            }
        }
    }

    fn create_playlist(&mut self, session: &mut Session<'_>) -> Result<Flow> {
        if let Err(e) = session.ensure_playlist_capacity() {
            self.error(e)?;
            return Ok(Flow::Continue);
        }

        let name = or_exit!(self.prompt_valid("\nInsert playlist name", |name| {
            session.check_playlist_name(name)
        })?);

        let description = or_exit!(self.prompt_valid("\nInsert description", |description| {
            validate_field(Field::Description, description, true)
        })?);

        let count = or_exit!(self.prompt_valid(
            "\nHow many songs do you want to insert?",
            |count| match count.trim().parse::<usize>() {
                Ok(n) if (1..MAX_SONGS).contains(&n) => Ok(()),
                _ => Err(format!("Select a positive number smaller than {MAX_SONGS}")),
            }
        )?);
        let count: usize = count.trim().parse().context("Song count changed after validation")?;

        self.say("\nInsert songs")?;
        let mut songs = Vec::with_capacity(count);
        for i in 0..count {
            let song = or_exit!(self.prompt_valid(&format!("Song {i}:"), |song| {
                validate_field(Field::Song, song, false)
            })?);
            songs.push(song);
        }

        match session.create_playlist(&name, &description, &songs) {
            Ok(_) => self.say("\nPlaylist successfully created")?,
            Err(e) => self.error(e)?,
        }

        Ok(Flow::Continue)
    }

    fn inspect_playlists(&mut self, session: &mut Session<'_>) -> Result<Flow> {
        let listing = match session.inspect_playlists() {
            Ok(listing) => listing,
            Err(e) => {
                self.error(e)?;
                return Ok(Flow::Continue);
            }
        };

        let text: Vec<String> = listing.map(|(i, p)| format_playlist(i, p)).collect();
        if text.is_empty() {
            self.say("\nYou have no playlists yet")?;
        }
        for playlist in text {
            self.say(format!("\n{}", playlist.trim_end()))?;
        }

        Ok(Flow::Continue)
    }

    fn play_random_song(&mut self, session: &mut Session<'_>) -> Result<Flow> {
        match session.random_song() {
            Ok(Some(song)) => {
                let line = format!("\nNow playing: {song}");
                self.say(line)?;
            }
            Ok(None) => self.say("\nThere is nothing to play, create a playlist first")?,
            Err(e) => self.error(e)?,
        }

        Ok(Flow::Continue)
    }

    fn delete_playlist(&mut self, session: &mut Session<'_>) -> Result<Flow> {
        let count = session.current_user().map_or(0, |u| u.playlist_count());
        if count == 0 {
            self.say("\nYou have no playlists yet")?;
            return Ok(Flow::Continue);
        }

        let index = or_exit!(self.prompt(&format!(
            "\nInsert the number of the playlist to delete (0-{})",
            count - 1
        ))?);

        let Ok(index) = index.trim().parse::<usize>() else {
            self.error(format!("{:?} is not a playlist number", index.trim()))?;
            return Ok(Flow::Continue);
        };

        match session.delete_playlist(index) {
            Ok(removed) => self.say(format!("\nPlaylist {} deleted", removed.name()))?,
            Err(e) => self.error(e)?,
        }

        Ok(Flow::Continue)
    }
}

/// Removes a trailing `\n` or `\r\n`.
fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Keeps the trailing `\n` that legacy comparison drops, removing a `\r`
/// in front of it.
fn legacy_password_line(raw: &str) -> String {
    match raw.strip_suffix("\r\n") {
        Some(body) => format!("{body}\n"),
        None => raw.to_string(),
    }
}

fn capitalise(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{
        db::{Store, StoreOptions},
        model::User,
    };

    fn store(mode: AuthMode) -> Store {
        Store::new(
            "unused.db",
            StoreOptions {
                max_users: 8,
                key_match: mode.key_match(),
            },
        )
    }

    fn run_script(store: &mut Store, mode: AuthMode, script: &str) -> String {
        let mut output = Vec::new();
        {
            let mut session = Session::new(store, mode);
            let mut shell = Shell::new(Cursor::new(script.as_bytes()), &mut output, false);
            shell.run(&mut session).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn register_create_and_inspect() {
        let mut store = store(AuthMode::Strict);
        let script = "1\nalice\nsecret1\n1\nRoad Trip\n\n2\nA\nB\n2\n0\n";
        let output = run_script(&mut store, AuthMode::Strict, script);

        assert!(output.starts_with("Vulnify (version: "));
        assert!(output.contains("User successfully registered"));
        assert!(output.contains("Playlist successfully created"));
        assert!(output.contains("[0] Playlist: Road Trip\n\"\"\n\tSong 0: A\n\tSong 1: B"));

        let alice = store.find_user("alice").unwrap();
        assert_eq!(alice.playlists()[0].songs(), ["A", "B"]);
    }

    #[test]
    fn invalid_fields_reprompt() {
        let mut store = store(AuthMode::Strict);
        let script = "1\nbad;name\nalice\nsecret1\n1\nMix!\nMix\nok\n0\n30\n1\nSong;1\nSong 1\n0\n";
        let output = run_script(&mut store, AuthMode::Strict, script);

        assert!(output.contains("[ERROR] Invalid username: username contains ';'"));
        assert!(output.contains("[ERROR] Invalid name"));
        assert!(output.contains("[ERROR] Select a positive number smaller than 24"));
        assert!(output.contains("[ERROR] Song name contains ';'"));

        let alice = store.find_user("alice").unwrap();
        assert_eq!(alice.playlists()[0].name(), "Mix");
        assert_eq!(alice.playlists()[0].songs(), ["Song 1"]);
    }

    #[test]
    fn legacy_registration_shows_generated_password() {
        let mut store = store(AuthMode::Legacy);
        let output = run_script(&mut store, AuthMode::Legacy, "1\nabcd\n\n0\n");

        assert!(output.contains("Your password is: 565149744"));
        assert_eq!(store.find_user("abcd").unwrap().password(), "565149744");
    }

    #[test]
    fn legacy_login_accepts_an_empty_password() {
        let mut store = store(AuthMode::Legacy);
        store.insert_user(User::new("alice", "secret1").unwrap()).unwrap();

        let output = run_script(&mut store, AuthMode::Legacy, "2\nalice\n\n0\n");
        assert!(output.contains("Login successful"));
    }

    #[test]
    fn strict_login_rejects_wrong_password_and_returns_to_menu() {
        let mut store = store(AuthMode::Strict);
        store.insert_user(User::new("alice", "secret1").unwrap()).unwrap();

        let script = "2\nbob\nalice\nsecret1x\n2\nalice\nsecret1\n0\n";
        let output = run_script(&mut store, AuthMode::Strict, script);

        assert!(output.contains("[ERROR] Username not found"));
        assert!(output.contains("[ERROR] Invalid password: it does not match"));
        assert!(output.contains("Login successful"));
    }

    #[test]
    fn delete_and_play() {
        let mut store = store(AuthMode::Strict);
        let script = "1\nalice\nsecret1\n1\nOne\n\n1\nA\n1\nTwo\n\n1\nB\n4\n0\n3\n4\n7\n0\n";
        let output = run_script(&mut store, AuthMode::Strict, script);

        assert!(output.contains("Playlist One deleted"));
        assert!(output.contains("Now playing: B"));
        assert!(output.contains("[ERROR] There is no playlist 7, you have 1"));

        let alice = store.find_user("alice").unwrap();
        let names: Vec<&str> = alice.playlists().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Two"]);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let mut store = store(AuthMode::Strict);
        let output = run_script(&mut store, AuthMode::Strict, "1\nalice\n");
        assert!(!output.contains("User successfully registered"));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_menu_option_is_reported() {
        let mut store = store(AuthMode::Strict);
        let output = run_script(&mut store, AuthMode::Strict, "9\n0\n");
        assert!(output.contains("[ERROR] Unknown option \"9\""));
    }

    #[test]
    fn legacy_login_accepts_crlf_lines() {
        let mut store = store(AuthMode::Legacy);
        store.insert_user(User::new("alice", "secret1").unwrap()).unwrap();

        let output = run_script(&mut store, AuthMode::Legacy, "2\r\nalice\r\nsecret1\r\n0\r\n");
        assert!(output.contains("Login successful"));
    }

    #[test]
    fn invalid_password_reprompts_without_losing_the_username() {
        let mut store = store(AuthMode::Strict);
        let output = run_script(&mut store, AuthMode::Strict, "1\nalice\np@ss\nsecret1\n0\n");

        assert!(output.contains("[ERROR] Password contains '@'"));
        assert!(output.contains("User successfully registered"));
        assert_eq!(store.find_user("alice").unwrap().password(), "secret1");
    }

    #[test]
    fn legacy_password_line_drops_carriage_return() {
        assert_eq!(legacy_password_line("secret1\r\n"), "secret1\n");
        assert_eq!(legacy_password_line("secret1\n"), "secret1\n");
        assert_eq!(legacy_password_line("secret1"), "secret1");
    }

    #[test]
    fn terminator_is_stripped() {
        assert_eq!(strip_terminator("abc\r\n"), "abc");
        assert_eq!(strip_terminator("abc\n"), "abc");
        assert_eq!(strip_terminator("abc"), "abc");
    }
}
