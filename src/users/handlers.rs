use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::{error::AppError, response::Outcome, state::AppState};

use super::{dto::PublicUser, services};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = services::list_users(state.users.as_ref()).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    services::get_user_by_id(state.users.as_ref(), id)
        .await?
        .map(|u| Json(PublicUser::from(u)))
        .ok_or(AppError::NotFound("User not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Outcome<PublicUser>, AppError> {
    let outcome = services::create_user(state.users.as_ref(), &payload).await?;
    Ok(outcome.map(PublicUser::from))
}
