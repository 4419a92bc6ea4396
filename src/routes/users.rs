//! Current-user profile routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::aggregates::{ProfileUpdate, User};
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::{AuthUser, VerifiedSubject};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_current_user).post(create_current_user).put(update_current_user))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: Option<String>,
    name: Option<String>,
}

/// Registers the caller's identity. Repeat calls are a no-op answered with an empty 200.
async fn create_current_user(
    State(state): State<AppState>,
    VerifiedSubject(subject): VerifiedSubject,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<Response> {
    let users = &state.stores().users;
    if users.find_by_subject(&subject).await?.is_some() {
        return Ok(StatusCode::OK.into_response());
    }

    let email = req
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
    let user = User::register(subject, email, req.name);
    users.insert(&user).await?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn get_current_user(State(state): State<AppState>, user: AuthUser) -> Result<Json<User>> {
    state
        .stores()
        .users
        .get(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn update_current_user(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> Result<Json<User>> {
    update.validate()?;
    let users = &state.stores().users;
    let mut current = users
        .get(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    current.apply(update);
    users.update(&current).await?;
    Ok(Json(current))
}
