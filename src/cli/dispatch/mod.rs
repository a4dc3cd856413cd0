//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary will execute.

use crate::cli::actions::{Action, server::Args};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let data_dir = matches
        .get_one::<PathBuf>("data-dir")
        .cloned()
        .context("missing required argument: --data-dir")?;
    let hashing_secret = matches
        .get_one::<String>("hashing-secret")
        .cloned()
        .context("missing required argument: --hashing-secret")?;

    Ok(Action::Server(Args {
        port,
        data_dir,
        hashing_secret: SecretString::from(hashing_secret),
    }))
}
