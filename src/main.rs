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

//! # Vulnify.
//!
//! An interactive, line-oriented playlist manager.
//!
//! Users register or log in, then create, inspect and delete playlists of
//! song names. Every user and playlist lives in a single flat file.
//!
//! ## Lifecycle
//!
//! The application follows a strict load-run-flush pattern:
//!
//! * The store file is read completely before the first prompt.
//! * The shell works purely in memory.
//! * The store is written back once when the shell ends, even if the shell
//!   stopped on an I/O error.
//!
//! Log output goes to stderr so it never interleaves with the prompts.

mod config;
mod db;
mod errors;
mod model;
mod session;
mod shell;
mod util;

use std::io;

use anyhow::{Context, Result};
use tracing::info;

use crate::{db::Store, session::Session, shell::Shell};

fn main() -> Result<()> {
    let config = config::load_config();

    tracing_subscriber::fmt()
        .with_max_level(config.max_log_level())
        .with_writer(io::stderr)
        .init();

    let mut store = Store::load(&config.store_path, config.store_options())
        .context("Failed to load the user store")?;

    info!(
        path = %store.path().display(),
        users = store.len(),
        capacity = store.capacity(),
        mode = ?config.auth_mode,
        "starting"
    );

    let res = run(&mut store, &config);

    store.flush().context("Failed to save the user store")?;

    res.context("Application error occurred")
}

/// Runs the interactive shell on the process's standard streams.
fn run(store: &mut Store, config: &config::AppConfig) -> Result<()> {
    let mut session = Session::new(store, config.auth_mode);

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let styled = util::term::stdout_is_terminal();

    Shell::new(stdin, stdout, styled).run(&mut session)
}
