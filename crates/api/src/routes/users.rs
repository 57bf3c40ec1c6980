//! User lookup and registration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{NewUser, User, UserId};
use record_store::RecordStore;
use serde::{Deserialize, Serialize};

use super::{AppState, CartResponse};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

// -- Response types --

/// A user as seen by clients. The credential hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub cart: CartResponse,
}

// -- Handlers --

/// GET /api/user/id/{id} — fetch a user by ID.
#[tracing::instrument(skip(state))]
pub async fn get_by_id<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id: UserId = id.parse()?;

    let user = state
        .identity
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {user_id}")))?;

    Ok(Json(user_response(&state, &user).await?))
}

/// GET /api/user/{username} — fetch a user by username.
#[tracing::instrument(skip(state))]
pub async fn get_by_username<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .identity
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {username}")))?;

    Ok(Json(user_response(&state, &user).await?))
}

/// POST /api/user/create — register a user together with an empty cart.
#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn create<S: RecordStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .identity
        .create_user(NewUser::new(
            req.username,
            req.password,
            req.confirm_password,
        ))
        .await?;

    Ok(Json(user_response(&state, &user).await?))
}

async fn user_response<S: RecordStore + Clone + 'static>(
    state: &AppState<S>,
    user: &User,
) -> Result<UserResponse, ApiError> {
    let cart = state.carts.get_cart(user.username().as_str()).await?;
    Ok(UserResponse {
        id: user.id().to_string(),
        username: user.username().to_string(),
        cart: CartResponse::from(&cart),
    })
}
