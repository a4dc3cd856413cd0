//! Router assembly and HTTP server startup.

use crate::{
    auth::{PasswordHasher, TokenAuthority},
    cli::globals::GlobalArgs,
    store::{FileStore, TOKENS, USERS},
};
use anyhow::{Context, Result};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub(crate) mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use openapi::openapi;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Documented routes plus the 404 fallback, with handler state attached.
/// Transport-level layers (tracing, request ids) are added in [`new`].
pub(crate) fn app(store: FileStore, authority: TokenAuthority, hasher: PasswordHasher) -> Router {
    let (router, _openapi) = router().split_for_parts();
    router
        .fallback(not_found)
        .layer(Extension(store))
        .layer(Extension(authority))
        .layer(Extension(hasher))
}

/// Start the server.
///
/// # Errors
/// Returns an error if the data directory cannot be prepared or the listener
/// fails to bind.
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let store = FileStore::new(globals.data_dir.clone());
    store
        .ensure_collections(&[USERS, TOKENS])
        .await
        .context("Failed to prepare the data directory")?;

    let authority = TokenAuthority::new(store.clone());
    let hasher = PasswordHasher::new(globals.hashing_secret.clone());

    let app = app(store, authority, hasher).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Unregistered paths answer 404 with an empty object body, the same shape
/// every other response carries.
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
