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

//! Application configuration.
//!
//! This module manages the application configuration file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::{
    db::{DEFAULT_MAX_USERS, StoreOptions},
    session::AuthMode,
};

const CONFIG_NAME: &str = "vulnify";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) version: u32,
    pub(crate) store_path: PathBuf,
    pub(crate) auth_mode: AuthMode,
    pub(crate) max_users: usize,
    /// One of `error`, `warn`, `info`, `debug` or `trace`.
    pub(crate) log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            store_path: PathBuf::from("data/vulnify.db"),
            auth_mode: AuthMode::default(),
            max_users: DEFAULT_MAX_USERS,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_users: self.max_users,
            key_match: self.auth_mode.key_match(),
        }
    }

    /// The configured log level, or `WARN` if it cannot be parsed.
    pub(crate) fn max_log_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::WARN)
    }
}

pub(crate) fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::KeyMatch;

    #[test]
    fn legacy_mode_uses_prefix_keys() {
        let config = AppConfig {
            auth_mode: AuthMode::Legacy,
            ..AppConfig::default()
        };
        assert_eq!(config.store_options().key_match, KeyMatch::Prefix);
        assert_eq!(AppConfig::default().store_options().key_match, KeyMatch::Exact);
    }

    #[test]
    fn unparsable_log_level_falls_back_to_warn() {
        let mut config = AppConfig::default();
        config.log_level = "debug".to_string();
        assert_eq!(config.max_log_level(), Level::DEBUG);

        config.log_level = "chatty".to_string();
        assert_eq!(config.max_log_level(), Level::WARN);
    }
}
