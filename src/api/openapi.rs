use super::handlers::{ping, tokens, users};
use utoipa::openapi::{InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated spec. The 404 fallback is intentionally not
/// documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut users_tag = Tag::new("users");
    users_tag.description = Some("User account records".to_string());

    let mut tokens_tag = Tag::new("tokens");
    tokens_tag.description = Some("Session token issuance and lifecycle".to_string());

    let mut ping_tag = Tag::new("ping");
    ping_tag.description = Some("Liveness probe".to_string());

    let mut openapi = cargo_openapi();
    openapi.tags = Some(vec![users_tag, tokens_tag, ping_tag]);

    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the
    // route to OpenAPI; handlers sharing a path combine into one method router.
    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(ping::ping))
        .routes(routes!(
            users::create_user,
            users::get_user,
            users::update_user,
            users::delete_user
        ))
        .routes(routes!(
            tokens::create_token,
            tokens::get_token,
            tokens::extend_token,
            tokens::delete_token
        ))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let identifier = env!("CARGO_PKG_LICENSE");
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    info.license = Some(license);

    OpenApiBuilder::new().info(info).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            spec.info.description.as_deref(),
            Some(env!("CARGO_PKG_DESCRIPTION"))
        );

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "users"));
        assert!(tags.iter().any(|tag| tag.name == "tokens"));
        assert!(spec.paths.paths.contains_key("/users"));
        assert!(spec.paths.paths.contains_key("/tokens"));
        assert!(spec.paths.paths.contains_key("/ping"));
    }
}
