//! HTTP handlers and the route table

pub mod auth;
pub mod docs;
pub mod events;
pub mod extract;
pub mod health;
pub mod users;

use axum::extract::Request;
use axum::middleware;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{log_requests, rate_limit};
use crate::state::AppState;
use crate::utils::errors::EventManagementError;

/// Mount `handler` at `path` and at `path` without its trailing slash
fn route_both(router: Router<AppState>, path: &str, handler: MethodRouter<AppState>) -> Router<AppState> {
    let bare = path.trim_end_matches('/');
    router.route(path, handler.clone()).route(bare, handler)
}

async fn fallback(request: Request) -> EventManagementError {
    EventManagementError::UnknownPath(request.uri().path().to_string())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let mut tokens = Router::new();
    tokens = route_both(tokens, "/api/token/", post(auth::obtain_token));
    tokens = route_both(tokens, "/api/token/refresh/", post(auth::refresh_token));
    let tokens = tokens.route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let mut api = Router::new();
    api = route_both(api, "/api/users/register/", post(users::register_user));
    api = route_both(
        api,
        "/api/events/",
        get(events::list_events).post(events::create_event),
    );
    api = route_both(
        api,
        "/api/events/:id/",
        get(events::retrieve_event)
            .put(events::update_event)
            .patch(events::partial_update_event)
            .delete(events::destroy_event),
    );
    api = route_both(api, "/api/events/:id/register/", post(events::register_for_event));
    api = route_both(api, "/docs/", get(docs::swagger_ui));
    api = api
        .route(docs::OPENAPI_PATH, get(docs::openapi_json))
        .route("/health", get(health::health));

    api.merge(tokens)
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_requests)),
        )
        .with_state(state)
}
