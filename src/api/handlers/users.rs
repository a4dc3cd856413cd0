//! User account endpoints over the flat-file store.
//!
//! Flow for every method: validate the declared fields, check the session
//! token where the operation is protected, then perform the single store
//! operation and answer.

use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;
use utoipa::ToSchema;

use super::{
    ApiError, ok_empty, parse_payload, token_header,
    validation::{Field, Rule, optional, require_all},
};
use crate::{
    auth::{PasswordHasher, TokenAuthority},
    store::{FileStore, USERS},
};

/// ISO 3166-1 alpha-2 country codes; length is enforced, membership is not.
const COUNTRY_CODE_LEN: usize = 2;

const MISSING_REQUIRED_FIELD: &str = "Missing required field.";
const HASH_FAILED: &str = "Could not hash the user's password.";

/// Stored user record, keyed by email.
///
/// Decodes with defaults for any missing field so a damaged document reads
/// as an empty profile instead of failing the request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub hashed_password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub password: Option<String>,
}

/// Profile shape returned to clients; the password digest never leaves disk.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            street: record.street,
            city: record.city,
            state: record.state,
            postal_code: record.postal_code,
            country: record.country,
        }
    }
}

/// Fields an update may touch; `password` is re-hashed before storage.
struct ProfileUpdate {
    first_name: Option<String>,
    last_name: Option<String>,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    password: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
            && self.password.is_none()
    }
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserPayload,
    responses(
        (status = 200, description = "User registered."),
        (status = 400, description = "Missing or invalid fields, or the email is taken."),
        (status = 500, description = "The record could not be stored."),
    ),
    tag = "users"
)]
pub async fn create_user(
    store: Extension<FileStore>,
    hasher: Extension<PasswordHasher>,
    body: Bytes,
) -> Response {
    let payload: CreateUserPayload = parse_payload(&body);
    let Some([first_name, last_name, email, street, city, state, postal_code, country, password]) =
        require_all([
            Field::new(payload.first_name.as_deref(), Rule::NonEmpty),
            Field::new(payload.last_name.as_deref(), Rule::NonEmpty),
            Field::new(payload.email.as_deref(), Rule::NonEmpty),
            Field::new(payload.street.as_deref(), Rule::NonEmpty),
            Field::new(payload.city.as_deref(), Rule::NonEmpty),
            Field::new(payload.state.as_deref(), Rule::NonEmpty),
            Field::new(payload.postal_code.as_deref(), Rule::NonEmpty),
            Field::new(payload.country.as_deref(), Rule::Exact(COUNTRY_CODE_LEN)),
            Field::new(payload.password.as_deref(), Rule::NonEmpty),
        ])
    else {
        return ApiError::Validation("Missing required fields.").into_response();
    };

    let record = UserRecord {
        first_name,
        last_name,
        email,
        street,
        city,
        state,
        postal_code,
        country,
        hashed_password: String::new(),
    };

    match register_user(&store, &hasher, record, &password).await {
        Ok(()) => ok_empty(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    params(
        ("email" = String, Query, description = "Email of the user to fetch"),
        ("token" = String, Header, description = "Session token owned by that email"),
    ),
    responses(
        (status = 200, description = "User profile without the password digest.", body = UserProfile),
        (status = 400, description = "Missing email."),
        (status = 403, description = "Missing or invalid token."),
        (status = 404, description = "Unknown user."),
    ),
    tag = "users"
)]
pub async fn get_user(
    store: Extension<FileStore>,
    authority: Extension<TokenAuthority>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some([email]) = require_all([Field::new(
        params.get("email").map(String::as_str),
        Rule::NonEmpty,
    )]) else {
        return ApiError::Validation(MISSING_REQUIRED_FIELD).into_response();
    };

    let token = token_header(&headers);
    if !authority.verify(&token, &email).await {
        return ApiError::Authorization.into_response();
    }

    match store.read::<UserRecord>(USERS, &email).await {
        Ok(record) => (StatusCode::OK, Json(UserProfile::from(record))).into_response(),
        Err(_) => ApiError::NotFound.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/users",
    request_body = UpdateUserPayload,
    params(
        ("token" = String, Header, description = "Session token owned by the target email"),
    ),
    responses(
        (status = 200, description = "Profile updated."),
        (status = 400, description = "Missing email, nothing to update, or unknown user."),
        (status = 403, description = "Missing or invalid token."),
        (status = 500, description = "The record could not be rewritten."),
    ),
    tag = "users"
)]
pub async fn update_user(
    store: Extension<FileStore>,
    authority: Extension<TokenAuthority>,
    hasher: Extension<PasswordHasher>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload: UpdateUserPayload = parse_payload(&body);
    let Some([email]) = require_all([Field::new(payload.email.as_deref(), Rule::NonEmpty)]) else {
        return ApiError::Validation(MISSING_REQUIRED_FIELD).into_response();
    };

    let [first_name, last_name, street, city, state, postal_code, country, password] = optional([
        Field::new(payload.first_name.as_deref(), Rule::NonEmpty),
        Field::new(payload.last_name.as_deref(), Rule::NonEmpty),
        Field::new(payload.street.as_deref(), Rule::NonEmpty),
        Field::new(payload.city.as_deref(), Rule::NonEmpty),
        Field::new(payload.state.as_deref(), Rule::NonEmpty),
        Field::new(payload.postal_code.as_deref(), Rule::NonEmpty),
        Field::new(payload.country.as_deref(), Rule::Exact(COUNTRY_CODE_LEN)),
        Field::new(payload.password.as_deref(), Rule::NonEmpty),
    ]);
    let update = ProfileUpdate {
        first_name,
        last_name,
        street,
        city,
        state,
        postal_code,
        country,
        password,
    };
    if update.is_empty() {
        return ApiError::Validation("Missing fields to update.").into_response();
    }

    let token = token_header(&headers);
    if !authority.verify(&token, &email).await {
        return ApiError::Authorization.into_response();
    }

    match apply_profile_update(&store, &hasher, &email, update).await {
        Ok(()) => ok_empty(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/users",
    params(
        ("email" = String, Query, description = "Email of the user to delete"),
        ("token" = String, Header, description = "Session token owned by that email"),
    ),
    responses(
        (status = 200, description = "User deleted."),
        (status = 400, description = "Missing email or unknown user."),
        (status = 403, description = "Missing or invalid token."),
        (status = 500, description = "The record could not be removed."),
    ),
    tag = "users"
)]
pub async fn delete_user(
    store: Extension<FileStore>,
    authority: Extension<TokenAuthority>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some([email]) = require_all([Field::new(
        params.get("email").map(String::as_str),
        Rule::NonEmpty,
    )]) else {
        return ApiError::Validation(MISSING_REQUIRED_FIELD).into_response();
    };

    let token = token_header(&headers);
    if !authority.verify(&token, &email).await {
        return ApiError::Authorization.into_response();
    }

    match remove_user(&store, &email).await {
        Ok(()) => ok_empty(),
        Err(err) => err.into_response(),
    }
}

async fn register_user(
    store: &FileStore,
    hasher: &PasswordHasher,
    mut record: UserRecord,
    password: &str,
) -> Result<(), ApiError> {
    if store.read::<UserRecord>(USERS, &record.email).await.is_ok() {
        return Err(ApiError::Conflict("A user with that email already exists."));
    }

    record.hashed_password = hasher.hash(password).ok_or(ApiError::Storage(HASH_FAILED))?;

    store
        .create(USERS, &record.email, &record)
        .await
        .map_err(|err| {
            error!("Failed to create user record: {err}");
            ApiError::Storage("Could not create the new user.")
        })
}

async fn apply_profile_update(
    store: &FileStore,
    hasher: &PasswordHasher,
    email: &str,
    update: ProfileUpdate,
) -> Result<(), ApiError> {
    let mut record: UserRecord = store
        .read(USERS, email)
        .await
        .map_err(|_| ApiError::Validation("The specified user does not exist."))?;

    if let Some(first_name) = update.first_name {
        record.first_name = first_name;
    }
    if let Some(last_name) = update.last_name {
        record.last_name = last_name;
    }
    if let Some(street) = update.street {
        record.street = street;
    }
    if let Some(city) = update.city {
        record.city = city;
    }
    if let Some(state) = update.state {
        record.state = state;
    }
    if let Some(postal_code) = update.postal_code {
        record.postal_code = postal_code;
    }
    if let Some(country) = update.country {
        record.country = country;
    }
    if let Some(password) = update.password {
        record.hashed_password = hasher.hash(&password).ok_or(ApiError::Storage(HASH_FAILED))?;
    }

    store.update(USERS, email, &record).await.map_err(|err| {
        error!("Failed to update user record: {err}");
        ApiError::Storage("Could not update the user.")
    })
}

async fn remove_user(store: &FileStore, email: &str) -> Result<(), ApiError> {
    store
        .read::<UserRecord>(USERS, email)
        .await
        .map_err(|_| ApiError::Validation("Could not find the specified user."))?;

    store.delete(USERS, email).await.map_err(|err| {
        error!("Failed to delete user record: {err}");
        ApiError::Storage("Could not delete the specified user.")
    })
}
