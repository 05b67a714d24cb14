//! Event endpoints
//!
//! Handlers stay thin: extract, call [`EventService`](crate::services::EventService),
//! map the outcome to a status code.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::extract::EventId;
use crate::models::{Caller, Event, EventInput, EventQuery, RegistrationStatus};
use crate::services::Action;
use crate::state::AppState;
use crate::utils::errors::{EventManagementError, Result};

/// List events, optionally filtered by exact date, location or title
#[utoipa::path(
    get,
    path = "/api/events/",
    tag = "events",
    params(EventQuery),
    responses(
        (status = 200, description = "Events ordered by id", body = [Event]),
        (status = 400, description = "Unparseable filter value")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    caller: Caller,
    query: std::result::Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>> {
    let Query(query) = query.map_err(|e| EventManagementError::BadRequest(e.body_text()))?;
    let events = state.services.event_service.list(query, &caller).await?;
    Ok(Json(events))
}

/// Create an event organized by the caller
#[utoipa::path(
    post,
    path = "/api/events/",
    tag = "events",
    request_body = EventInput,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    caller: Caller,
    body: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>)> {
    let service = &state.services.event_service;
    service.authorize(Action::Create, &caller)?;
    let Json(input) = body?;

    let event = service.create(input, &caller).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Retrieve one event
#[utoipa::path(
    get,
    path = "/api/events/{id}/",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = Event),
        (status = 404, description = "No such event")
    )
)]
pub async fn retrieve_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    caller: Caller,
) -> Result<Json<Event>> {
    let event = state.services.event_service.retrieve(id, &caller).await?;
    Ok(Json(event))
}

async fn apply_update(
    state: &AppState,
    id: i64,
    caller: &Caller,
    body: std::result::Result<Json<EventInput>, JsonRejection>,
    partial: bool,
) -> Result<Json<Event>> {
    // The body is decoded here but judged after the existence and ownership checks
    let input = body.map(|Json(input)| input).map_err(EventManagementError::from);
    let event = state
        .services
        .event_service
        .update(id, input, partial, caller)
        .await?;
    Ok(Json(event))
}

/// Replace every field of an event
#[utoipa::path(
    put,
    path = "/api/events/{id}/",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    request_body = EventInput,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "No such event")
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    caller: Caller,
    body: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<Event>> {
    apply_update(&state, id, &caller, body, false).await
}

/// Change any subset of an event's fields
#[utoipa::path(
    patch,
    path = "/api/events/{id}/",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    request_body = EventInput,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "No such event")
    )
)]
pub async fn partial_update_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    caller: Caller,
    body: std::result::Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<Event>> {
    apply_update(&state, id, &caller, body, true).await
}

/// Delete an event and its registrations
#[utoipa::path(
    delete,
    path = "/api/events/{id}/",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not the organizer"),
        (status = 404, description = "No such event")
    )
)]
pub async fn destroy_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    caller: Caller,
) -> Result<StatusCode> {
    state.services.event_service.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register the caller for an event
#[utoipa::path(
    post,
    path = "/api/events/{id}/register/",
    tag = "events",
    params(("id" = i64, Path, description = "Event id")),
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Registered; a confirmation email is sent", body = RegistrationStatus),
        (status = 200, description = "Already registered", body = RegistrationStatus),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such event")
    )
)]
pub async fn register_for_event(
    State(state): State<AppState>,
    EventId(id): EventId,
    caller: Caller,
) -> Result<(StatusCode, Json<RegistrationStatus>)> {
    let outcome = state.services.event_service.register(id, &caller).await?;
    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.status())))
}
