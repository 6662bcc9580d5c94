//! OpenAPI document generation.
//!
//! Serves the generated document at `/openapi.json`.

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer session-token scheme referenced by handlers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The claro user directory API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "claro user directory API",
        description = "Identity synchronization between the external identity provider and the internal user store"
    ),
    paths(
        claro_api_identity::handlers::webhook::identity_webhook_handler,
        claro_api_identity::handlers::session::session_sync_handler,
    ),
    components(schemas(
        claro_api_identity::handlers::session::SessionSyncResponse,
        claro_api_identity::error::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags((name = "Identity", description = "Identity synchronization endpoints"))
)]
pub struct ApiDoc;

/// Router serving the OpenAPI JSON document.
pub fn openapi_routes() -> Router {
    Router::new().route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_contains_both_endpoints() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/identity-webhook"));
        assert!(paths.iter().any(|p| p.as_str() == "/session/sync"));
    }
}
