//! OpenAPI document and Swagger UI

use axum::response::Html;
use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{auth, events, users};
use crate::models::{
    AccessToken, Event, EventInput, RegisterUserRequest, RegistrationStatus, TokenObtainRequest,
    TokenPair, TokenRefreshRequest, UserResponse,
};

pub const OPENAPI_PATH: &str = "/docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Management API",
        version = "v1",
        description = "Create events and register attendance"
    ),
    paths(
        auth::obtain_token,
        auth::refresh_token,
        users::register_user,
        events::list_events,
        events::create_event,
        events::retrieve_event,
        events::update_event,
        events::partial_update_event,
        events::destroy_event,
        events::register_for_event,
    ),
    components(schemas(
        Event,
        EventInput,
        RegistrationStatus,
        RegisterUserRequest,
        UserResponse,
        TokenObtainRequest,
        TokenRefreshRequest,
        TokenPair,
        AccessToken,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "auth", description = "JWT issuance"),
        (name = "users", description = "Accounts"),
        (name = "events", description = "Events and registrations")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

const SWAGGER_UI: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <title>Event Management API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/docs/openapi.json",
                dom_id: "#swagger-ui",
                persistAuthorization: true,
            });
        };
    </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
