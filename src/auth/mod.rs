//! Credential hashing and the session-token authority.

mod hash;
mod tokens;

pub use hash::PasswordHasher;
pub use tokens::{TOKEN_ID_LENGTH, TokenAuthority, TokenError, TokenRecord};
