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

//! Password generation for users who register without one.
//!
//! Two generators exist:
//!
//! * [`generate_password`] is the legacy "safe password". It is a pure
//!   function of the username and therefore offers no secrecy at all:
//!   anyone who knows a username can compute its password. The legacy auth
//!   mode depends on it staying bit-for-bit stable.
//! * [`random_password`] draws from the thread-local CSPRNG and is used by
//!   the strict auth mode.

use rand::{rng, seq::IndexedRandom};

use crate::model::MAX_PASSWORD_LEN;

const MULTIPLIER: u32 = 0xDEAD;
const INCREMENT: u32 = 0xBEEF;

const ALPHABET: [u8; 62] = *b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Derives the legacy password for `username`.
///
/// The name is read in 4-byte big-endian chunks (trailing bytes that do not
/// fill a chunk are ignored) and folded into
/// `val = MULTIPLIER * (val + chunk) + INCREMENT` modulo 2^32, starting at 1.
/// The result is the decimal form of `val`, cut to the password length.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(generate_password("abcd"), "565149744");
/// ```
pub(crate) fn generate_password(username: &str) -> String {
    let val = username
        .as_bytes()
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .fold(1u32, |val, chunk| {
            MULTIPLIER
                .wrapping_mul(val.wrapping_add(chunk))
                .wrapping_add(INCREMENT)
        });

    let mut password = val.to_string();
    password.truncate(MAX_PASSWORD_LEN);
    password
}

/// Generates a password of [`MAX_PASSWORD_LEN`] random letters and digits.
pub(crate) fn random_password() -> String {
    let mut rng = rng();

    (0..MAX_PASSWORD_LEN)
        .filter_map(|_| ALPHABET.choose(&mut rng))
        .map(|&b| char::from(b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::policy::{Field, validate_field};

    #[test]
    fn legacy_golden_vectors() {
        assert_eq!(generate_password("abcd"), "565149744");
        assert_eq!(generate_password("alice"), "3651710851");
        assert_eq!(generate_password("abcdefgh"), "1218711719");
    }

    #[test]
    fn legacy_is_deterministic() {
        assert_eq!(generate_password("abcd"), generate_password("abcd"));
    }

    #[test]
    fn legacy_ignores_partial_chunk() {
        // "alice" only contributes "alic".
        assert_eq!(generate_password("alice"), generate_password("alicX"));
        // Names shorter than one chunk never leave the initial value.
        assert_eq!(generate_password("bob"), "1");
        assert_eq!(generate_password(""), "1");
    }

    #[test]
    fn random_password_fits_the_policy() {
        let password = random_password();
        assert_eq!(password.len(), MAX_PASSWORD_LEN);
        assert!(validate_field(Field::Password, &password, false).is_ok());
    }

    #[test]
    fn random_password_only_uses_the_alphabet() {
        for _ in 0..32 {
            assert!(random_password().bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn random_passwords_differ() {
        assert_ne!(random_password(), random_password());
    }
}
