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

//! Error classification shared by the store and session layers.
//!
//! Every module keeps its own error enum. [`Classify`] maps each of them
//! onto a small set of [`ErrorClass`]es so the shell can decide how to
//! recover without matching on every variant.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorClass {
    /// Bad character set, empty or over-length input. Re-prompt.
    Validation,
    /// Unknown user or playlist index.
    NotFound,
    /// Store or playlist collection is full. Abort the operation.
    Capacity,
    /// Input clashes with an existing record.
    Conflict,
    /// Credentials were refused. The operation is abandoned.
    Denied,
    /// The persistent file is corrupt. Fatal at load time.
    Malformed,
    Io,
    /// The operation is not valid in the current session state.
    State,
}

pub(crate) trait Classify {
    fn class(&self) -> ErrorClass;

    /// Whether the shell should ask for the same input again.
    fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Validation | ErrorClass::NotFound | ErrorClass::Conflict
        )
    }
}
