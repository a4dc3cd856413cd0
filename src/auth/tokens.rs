//! Issuance, extension, and verification of session tokens.

use crate::store::{FileStore, StoreError, TOKENS};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Length of a generated token id.
pub const TOKEN_ID_LENGTH: usize = 20;

/// Lowercase alphanumerics; large enough that id collisions are
/// probabilistically negligible and not checked at issuance.
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Token lifetime granted at issuance and on each extension.
const TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token not found")]
    NotFound,
    #[error("token has expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A session token binding a random id to its owner's email.
///
/// `expires` is an absolute unix-epoch instant in milliseconds. Stored
/// documents decode with defaults for any missing field, so a damaged record
/// simply verifies as expired.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TokenRecord {
    pub id: String,
    pub email: String,
    pub expires: i64,
}

impl TokenRecord {
    #[must_use]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires <= now_ms
    }
}

/// Issues and checks session tokens persisted through the record store.
#[derive(Clone, Debug)]
pub struct TokenAuthority {
    store: FileStore,
}

impl TokenAuthority {
    #[must_use]
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    /// Issue a fresh token for `email`, valid for one hour.
    ///
    /// # Errors
    /// Returns `TokenError::Store` when the record cannot be persisted.
    pub async fn issue(&self, email: &str) -> Result<TokenRecord, TokenError> {
        let id = random_token_id();
        let record = TokenRecord {
            id: id.clone(),
            email: email.to_string(),
            expires: Utc::now().timestamp_millis() + TOKEN_TTL_MS,
        };
        self.store.create(TOKENS, &id, &record).await?;
        Ok(record)
    }

    /// Load a token by id.
    ///
    /// # Errors
    /// `NotFound` when the id is unknown, `Store` on I/O faults.
    pub async fn lookup(&self, id: &str) -> Result<TokenRecord, TokenError> {
        self.store
            .read(TOKENS, id)
            .await
            .map_err(not_found_or_store)
    }

    /// Push a live token's expiry out to one hour from now.
    ///
    /// An already-expired token cannot be extended; its stored expiry is
    /// left untouched.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Expired` for a dead token, `Store` on
    /// persistence faults.
    pub async fn extend(&self, id: &str) -> Result<TokenRecord, TokenError> {
        let mut record: TokenRecord = self
            .store
            .read(TOKENS, id)
            .await
            .map_err(not_found_or_store)?;
        if record.is_expired(Utc::now().timestamp_millis()) {
            return Err(TokenError::Expired);
        }
        record.expires = Utc::now().timestamp_millis() + TOKEN_TTL_MS;
        self.store.update(TOKENS, id, &record).await?;
        Ok(record)
    }

    /// Whether `id` names a live token owned by exactly `email`.
    ///
    /// Never fails: any lookup error reads as "not valid".
    pub async fn verify(&self, id: &str, email: &str) -> bool {
        match self.store.read::<TokenRecord>(TOKENS, id).await {
            Ok(record) => {
                record.email == email && !record.is_expired(Utc::now().timestamp_millis())
            }
            Err(_) => false,
        }
    }

    /// Delete a token record (logout).
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Store` on removal faults.
    pub async fn revoke(&self, id: &str) -> Result<(), TokenError> {
        self.store
            .delete(TOKENS, id)
            .await
            .map_err(not_found_or_store)
    }
}

fn not_found_or_store(err: StoreError) -> TokenError {
    match err {
        StoreError::NotFound => TokenError::NotFound,
        other => TokenError::Store(other),
    }
}

fn random_token_id() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_ID_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TOKENS;

    async fn authority() -> (tempfile::TempDir, TokenAuthority) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store
            .ensure_collections(&[TOKENS])
            .await
            .expect("collections");
        (dir, TokenAuthority::new(store))
    }

    fn expired(record: &TokenRecord) -> TokenRecord {
        TokenRecord {
            expires: Utc::now().timestamp_millis() - 1000,
            ..record.clone()
        }
    }

    #[test]
    fn token_ids_are_lowercase_alphanumeric_and_fixed_length() {
        for _ in 0..32 {
            let id = random_token_id();
            assert_eq!(id.len(), TOKEN_ID_LENGTH);
            assert!(
                id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()),
                "unexpected character in token id {id}"
            );
        }
    }

    #[tokio::test]
    async fn issued_token_verifies_for_its_owner() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        assert!(authority.verify(&token.id, "jane@example.com").await);
    }

    #[tokio::test]
    async fn verify_rejects_a_different_owner() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        assert!(!authority.verify(&token.id, "john@example.com").await);
    }

    #[tokio::test]
    async fn verify_rejects_an_unknown_id() {
        let (_dir, authority) = authority().await;
        assert!(!authority.verify("nosuchtokenid1234567", "jane@example.com").await);
    }

    #[tokio::test]
    async fn verify_rejects_an_expired_token() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        authority
            .store
            .update(TOKENS, &token.id, &expired(&token))
            .await
            .expect("update");
        assert!(!authority.verify(&token.id, "jane@example.com").await);
    }

    #[tokio::test]
    async fn extend_refreshes_the_expiry() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        let extended = authority.extend(&token.id).await.expect("extend");
        assert!(extended.expires >= token.expires);

        let stored = authority.lookup(&token.id).await.expect("lookup");
        assert_eq!(stored.expires, extended.expires);
    }

    #[tokio::test]
    async fn extend_rejects_an_expired_token_without_mutating_it() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        let dead = expired(&token);
        authority
            .store
            .update(TOKENS, &token.id, &dead)
            .await
            .expect("update");

        let result = authority.extend(&token.id).await;
        assert!(matches!(result, Err(TokenError::Expired)));

        let stored = authority.lookup(&token.id).await.expect("lookup");
        assert_eq!(stored.expires, dead.expires);
    }

    #[tokio::test]
    async fn extend_rejects_an_unknown_id() {
        let (_dir, authority) = authority().await;
        let result = authority.extend("nosuchtokenid1234567").await;
        assert!(matches!(result, Err(TokenError::NotFound)));
    }

    #[tokio::test]
    async fn revoked_token_no_longer_verifies() {
        let (_dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        authority.revoke(&token.id).await.expect("revoke");
        assert!(!authority.verify(&token.id, "jane@example.com").await);
    }

    #[tokio::test]
    async fn revoke_of_an_unknown_id_is_not_found() {
        let (_dir, authority) = authority().await;
        let result = authority.revoke("nosuchtokenid1234567").await;
        assert!(matches!(result, Err(TokenError::NotFound)));
    }

    #[tokio::test]
    async fn damaged_record_verifies_as_invalid() {
        let (dir, authority) = authority().await;
        let token = authority.issue("jane@example.com").await.expect("issue");
        tokio::fs::write(
            dir.path().join(format!("tokens/{}.json", token.id)),
            b"garbage",
        )
        .await
        .expect("write");
        assert!(!authority.verify(&token.id, "jane@example.com").await);
    }
}
