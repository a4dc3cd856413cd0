//! Session token endpoints: login, inspection, extension, logout.

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::error;
use utoipa::ToSchema;

use super::{
    ApiError, ok_empty, parse_payload,
    users::UserRecord,
    validation::{Field, Rule, require_all},
};
use crate::{
    auth::{PasswordHasher, TOKEN_ID_LENGTH, TokenAuthority, TokenError, TokenRecord},
    store::{FileStore, USERS},
};

const MISSING_REQUIRED_FIELD: &str = "Missing required field.";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateTokenPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExtendTokenPayload {
    pub id: Option<String>,
    /// Must be literally `true`; the only supported mutation is an extension.
    pub extend: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/tokens",
    request_body = CreateTokenPayload,
    responses(
        (status = 200, description = "Token issued for one hour.", body = TokenRecord),
        (status = 400, description = "Missing fields, unknown user, or password mismatch."),
        (status = 500, description = "The token could not be stored."),
    ),
    tag = "tokens"
)]
pub async fn create_token(
    store: Extension<FileStore>,
    hasher: Extension<PasswordHasher>,
    authority: Extension<TokenAuthority>,
    body: Bytes,
) -> Response {
    let payload: CreateTokenPayload = parse_payload(&body);
    let Some([email, password]) = require_all([
        Field::new(payload.email.as_deref(), Rule::NonEmpty),
        Field::new(payload.password.as_deref(), Rule::NonEmpty),
    ]) else {
        return ApiError::Validation("Missing required field(s).").into_response();
    };

    match login(&store, &hasher, &authority, &email, &password).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/tokens",
    params(
        ("id" = String, Query, description = "Token id to look up"),
    ),
    responses(
        (status = 200, description = "Token record.", body = TokenRecord),
        (status = 400, description = "Missing or malformed id."),
        (status = 404, description = "Unknown token."),
    ),
    tag = "tokens"
)]
pub async fn get_token(
    authority: Extension<TokenAuthority>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some([id]) = require_all([Field::new(
        params.get("id").map(String::as_str),
        Rule::Exact(TOKEN_ID_LENGTH),
    )]) else {
        return ApiError::Validation(MISSING_REQUIRED_FIELD).into_response();
    };

    match authority.lookup(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(_) => ApiError::NotFound.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/tokens",
    request_body = ExtendTokenPayload,
    responses(
        (status = 200, description = "Expiry pushed out one hour."),
        (status = 400, description = "Invalid fields, unknown token, or token already expired."),
        (status = 500, description = "The token could not be rewritten."),
    ),
    tag = "tokens"
)]
pub async fn extend_token(authority: Extension<TokenAuthority>, body: Bytes) -> Response {
    let payload: ExtendTokenPayload = parse_payload(&body);
    let (Some([id]), Some(true)) = (
        require_all([Field::new(
            payload.id.as_deref(),
            Rule::Exact(TOKEN_ID_LENGTH),
        )]),
        payload.extend,
    ) else {
        return ApiError::Validation("Missing required field(s) or field(s) are invalid.")
            .into_response();
    };

    match authority.extend(&id).await {
        Ok(_) => ok_empty(),
        Err(TokenError::Expired) => {
            ApiError::Validation("The token has already expired and cannot be extended.")
                .into_response()
        }
        Err(TokenError::NotFound) => {
            ApiError::Validation("The specified token does not exist.").into_response()
        }
        Err(TokenError::Store(err)) => {
            error!("Failed to extend token: {err}");
            ApiError::Storage("Could not update the token's expiration.").into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/tokens",
    params(
        ("id" = String, Query, description = "Token id to revoke"),
    ),
    responses(
        (status = 200, description = "Token revoked."),
        (status = 400, description = "Missing id or unknown token."),
        (status = 500, description = "The token could not be removed."),
    ),
    tag = "tokens"
)]
pub async fn delete_token(
    authority: Extension<TokenAuthority>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some([id]) = require_all([Field::new(
        params.get("id").map(String::as_str),
        Rule::Exact(TOKEN_ID_LENGTH),
    )]) else {
        return ApiError::Validation(MISSING_REQUIRED_FIELD).into_response();
    };

    match authority.revoke(&id).await {
        Ok(()) => ok_empty(),
        Err(TokenError::NotFound) => {
            ApiError::Validation("Could not find the specified token.").into_response()
        }
        Err(err) => {
            error!("Failed to delete token record: {err}");
            ApiError::Storage("Could not delete the specified token.").into_response()
        }
    }
}

async fn login(
    store: &FileStore,
    hasher: &PasswordHasher,
    authority: &TokenAuthority,
    email: &str,
    password: &str,
) -> Result<TokenRecord, ApiError> {
    let user: UserRecord = store
        .read(USERS, email)
        .await
        .map_err(|_| ApiError::Validation("Could not find the specified user."))?;

    let hashed = hasher
        .hash(password)
        .ok_or(ApiError::Storage("Could not hash the user's password."))?;
    if hashed != user.hashed_password {
        return Err(ApiError::Validation(
            "Password did not match the specified user's stored password.",
        ));
    }

    authority.issue(email).await.map_err(|err| {
        error!("Failed to issue token: {err}");
        ApiError::Storage("Could not create the new token.")
    })
}
