use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, ApiJson},
    state::AppState,
};

use super::dto::{
    ListUsersQuery, ProfileUser, PublicUser, UpdateProfileRequest, UpdatedProfileResponse,
};
use super::repo::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).put(update_profile))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListUsersQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list(&state.db, user_id, q.year.as_deref(), q.status).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UpdatedProfileResponse>, ApiError> {
    if id != user_id {
        return Err(ApiError::Forbidden("Can only update own profile".into()));
    }

    if payload.bio.is_none() && payload.status.is_none() && payload.avatar.is_none() {
        return Err(ApiError::InvalidInput("No fields to update".into()));
    }

    let user = User::update_profile(
        &state.db,
        user_id,
        payload.bio.as_deref(),
        payload.status,
        payload.avatar.as_ref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id, "profile updated");
    Ok(Json(UpdatedProfileResponse {
        user: ProfileUser::from(user),
    }))
}
