//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use roadwatch_core::storage::{EntityId, RepositoryError};
use roadwatch_core::user::{CreateUserRequest, RankEntry, UpdateUserRequest, User};

use crate::{handlers::AppError, state::AppState};

/// List all users (GET /api/users).
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.get_users().await?))
}

/// Leaderboard by coins (GET /api/users/ranklist).
pub async fn rank_list(State(state): State<AppState>) -> Result<Json<Vec<RankEntry>>, AppError> {
    Ok(Json(state.users.get_rank_list().await?))
}

/// Register a user (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.users.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<Json<User>, AppError> {
    Ok(Json(find_user(&state, id).await?))
}

/// Edit a user's email or nickname (PUT /api/users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let patch = payload.into_patch()?;
    let user = find_user(&state, id).await?;

    if !state.users.update_user(&user, patch).await? {
        return Err(anyhow::anyhow!("User {id} could not be updated").into());
    }

    tracing::info!(user_id = id, "Updated user");

    Ok(Json(find_user(&state, id).await?))
}

/// Delete a user (DELETE /api/users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<StatusCode, AppError> {
    let user = find_user(&state, id).await?;

    if !state.users.delete_user(&user).await {
        return Err(anyhow::anyhow!("User {id} could not be deleted").into());
    }

    tracing::info!(user_id = id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_user(state: &AppState, id: EntityId) -> Result<User, AppError> {
    state.users.get_user_by_id(id).await?.ok_or_else(|| {
        RepositoryError::NotFound {
            entity_type: "user",
            id: id.to_string(),
        }
        .into()
    })
}
