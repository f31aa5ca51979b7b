use axum::{extract::State, Json};

use roadwatch_core::user::Role;

use crate::{handlers::AppError, state::AppState};

/// List all roles (GET /api/roles).
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(state.roles.get_roles().await?))
}
