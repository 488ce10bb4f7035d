use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
};

use super::dto::{
    AckResponse, CreateEventBody, EnrichedEvent, EventDetails, EventResponse, ListEventsQuery,
};
use super::repo::Event;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/:id", get(get_event).delete(delete_event))
        .route("/events/:id/join", post(join_event))
        .route("/events/:id/leave", delete(leave_event))
}

#[instrument(skip(state, payload))]
async fn create_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateEventBody>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.time.trim().is_empty()
        || payload.location.trim().is_empty()
    {
        return Err(ApiError::InvalidInput("Missing required fields".into()));
    }

    let event = Event::create(
        &state.db,
        user_id,
        payload.title.trim(),
        payload.description.trim(),
        payload.event_type,
        payload.date,
        payload.time.trim(),
        payload.location.trim(),
        payload.is_public,
    )
    .await?;

    info!(event_id = event.id, host_id = user_id, "event created");
    Ok((StatusCode::CREATED, Json(EventResponse { event })))
}

#[instrument(skip(state))]
async fn list_events(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListEventsQuery>,
) -> Result<Json<Vec<EnrichedEvent>>, ApiError> {
    let rows = Event::list_visible(
        &state.db,
        user_id,
        q.event_type,
        q.upcoming_only(),
        q.mine_only(),
    )
    .await?;
    Ok(Json(rows.into_iter().map(EnrichedEvent::from).collect()))
}

#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EventDetails>, ApiError> {
    let event = Event::find_with_meta(&state.db, id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    let attendees = Event::attendees(&state.db, id).await?;
    Ok(Json(EventDetails {
        event: event.into(),
        attendees,
    }))
}

#[instrument(skip(state))]
async fn join_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    if !Event::exists(&state.db, id).await? {
        return Err(ApiError::NotFound("Event not found".into()));
    }
    if !Event::add_attendee(&state.db, id, user_id).await? {
        return Err(ApiError::Conflict("Already attending this event".into()));
    }
    info!(event_id = id, user_id, "joined event");
    Ok(Json(AckResponse {
        message: "Successfully joined event".into(),
    }))
}

#[instrument(skip(state))]
async fn leave_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    if !Event::remove_attendee(&state.db, id, user_id).await? {
        return Err(ApiError::NotFound("Not attending this event".into()));
    }
    info!(event_id = id, user_id, "left event");
    Ok(Json(AckResponse {
        message: "Successfully left event".into(),
    }))
}

#[instrument(skip(state))]
async fn delete_event(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AckResponse>, ApiError> {
    // Non-hosts get the same 404 as a missing event; the response does not
    // reveal whether the event exists.
    if !Event::delete_by_host(&state.db, id, user_id).await? {
        warn!(event_id = id, user_id, "delete refused");
        return Err(ApiError::NotFound(
            "Event not found or not authorized".into(),
        ));
    }
    info!(event_id = id, host_id = user_id, "event deleted");
    Ok(Json(AckResponse {
        message: "Event deleted successfully".into(),
    }))
}
