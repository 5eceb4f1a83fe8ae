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

//! Terminal environment and styling utilities.
//!
//! The shell is often driven through a pipe or a socket, where escape
//! sequences would end up as noise in the output. Styling is therefore only
//! applied when standard output is a terminal.

use std::io::{self, IsTerminal};

use crossterm::style::Stylize;

pub(crate) const ERROR_PREFIX: &str = "[ERROR]";

/// Returns `true` if standard output is attached to a terminal.
pub(crate) fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Formats a single error line, prefixed with [`ERROR_PREFIX`].
///
/// # Arguments
///
/// * `message` - The error description.
/// * `styled` - Whether to colour the prefix with ANSI escape sequences.
pub(crate) fn error_line(message: &str, styled: bool) -> String {
    if styled {
        format!("{} {}", ERROR_PREFIX.red().bold(), message)
    } else {
        format!("{ERROR_PREFIX} {message}")
    }
}
