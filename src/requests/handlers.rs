use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
    users::repo::{Availability, User},
};

use super::dto::{
    CreateRequestBody, Direction, EnrichedRequest, ListRequestsQuery, RequestResponse, RespondBody,
};
use super::repo::{CoffeeRequest, RequestStatus};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/:id/respond", put(respond_to_request))
}

#[instrument(skip(state, payload))]
async fn create_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<CreateRequestBody>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    if payload.location.trim().is_empty() || payload.time_options.is_empty() {
        return Err(ApiError::InvalidInput("Missing required fields".into()));
    }

    let recipient = User::find_by_id(&state.db, payload.to_user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if recipient.status == Availability::Busy {
        return Err(ApiError::InvalidInput(
            "User is not accepting requests".into(),
        ));
    }

    let request = CoffeeRequest::create(
        &state.db,
        user_id,
        payload.to_user_id,
        payload.location.trim(),
        &payload.time_options,
        payload.message.as_deref().unwrap_or(""),
    )
    .await?;

    info!(
        request_id = request.id,
        from = user_id,
        to = payload.to_user_id,
        "coffee request created"
    );
    Ok((StatusCode::CREATED, Json(RequestResponse { request })))
}

#[instrument(skip(state))]
async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListRequestsQuery>,
) -> Result<Json<Vec<EnrichedRequest>>, ApiError> {
    let sent_only = q.direction == Some(Direction::Sent);
    let received_only = q.direction == Some(Direction::Received);
    let rows =
        CoffeeRequest::list_for_user(&state.db, user_id, sent_only, received_only, q.status)
            .await?;
    Ok(Json(rows.into_iter().map(EnrichedRequest::from).collect()))
}

#[instrument(skip(state, payload))]
async fn respond_to_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<RespondBody>,
) -> Result<Json<RequestResponse>, ApiError> {
    let status = if payload.accepted {
        RequestStatus::Accepted
    } else {
        RequestStatus::Declined
    };

    let updated = CoffeeRequest::respond(
        &state.db,
        id,
        user_id,
        status,
        payload.response_message.as_deref().unwrap_or(""),
    )
    .await?;

    match updated {
        Some(request) => {
            info!(request_id = id, ?status, "coffee request settled");
            Ok(Json(RequestResponse { request }))
        }
        // The conditional update matched nothing: either the request is not
        // addressed to this caller, or it was already settled.
        None => match CoffeeRequest::find_for_recipient(&state.db, id, user_id).await? {
            Some(_) => {
                warn!(request_id = id, "response to settled request");
                Err(ApiError::InvalidInput("Request already responded to".into()))
            }
            None => Err(ApiError::NotFound(
                "Request not found or not authorized".into(),
            )),
        },
    }
}
