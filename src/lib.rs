//! # Tessera (flat-file accounts & session tokens)
//!
//! `tessera` is a small HTTP API for user account management and session-token
//! issuance, backed entirely by flat-file JSON storage: one directory per
//! collection, one document per record, named by the record's natural key.
//!
//! ## Storage Model
//!
//! - **Users** are keyed by email. Registration refuses a key that already
//!   holds a file; updates rewrite the whole document.
//! - **Tokens** are keyed by a random 20-character lowercase-alphanumeric id
//!   and expire one hour after issuance or extension.
//! - There is no index, no transaction, and no cross-record atomicity. Each
//!   request performs at most one read-modify-write against a single file,
//!   and concurrent writers to the same key race with last-write-wins
//!   semantics.
//!
//! ## Authentication
//!
//! Passwords are stored as keyed HMAC-SHA256 digests under a process-wide
//! secret; digest equality is the verification mechanism. Protected requests
//! carry a token id in the `token` header, which must name a live token owned
//! by the email the request targets.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
