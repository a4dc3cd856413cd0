use crate::{api, cli::globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub data_dir: PathBuf,
    pub hashing_secret: SecretString,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the data directory cannot be prepared or the server
/// fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(args.data_dir, args.hashing_secret);

    api::new(args.port, &globals).await
}
