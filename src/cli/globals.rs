use secrecy::SecretString;
use std::path::PathBuf;

/// Process-wide configuration, built once at startup and handed by reference
/// into the store and hashing components. Nothing reads ambient global state.
#[derive(Clone)]
pub struct GlobalArgs {
    pub data_dir: PathBuf,
    pub hashing_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(data_dir: PathBuf, hashing_secret: SecretString) -> Self {
        Self {
            data_dir,
            hashing_secret,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("data_dir", &self.data_dir)
            .field("hashing_secret", &"***")
            .finish()
    }
}
