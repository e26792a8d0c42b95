use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::models::user::{Role, UserRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub role: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

/// POST /api/v1/profile
///
/// Creates the local profile for the authenticated identity. The identity
/// gateway is expected to forward an email with every request; a missing one
/// is its fault, not the client's.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let role = Role::parse(&req.role).ok_or_else(|| {
        AppError::Validation("Invalid role. Must be CANDIDATE or RECRUITER".to_string())
    })?;

    let email = user
        .email
        .ok_or_else(|| anyhow!("identity gateway sent no email for user {}", user.id))?;

    let created: UserRow =
        sqlx::query_as("INSERT INTO users (id, email, role) VALUES ($1, $2, $3) RETURNING *")
            .bind(&user.id)
            .bind(&email)
            .bind(role)
            .fetch_one(&state.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("Profile already exists".to_string())
                } else {
                    AppError::Database(e)
                }
            })?;

    info!("Created {:?} profile for user {}", created.role, created.id);

    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            id: created.id,
            email: created.email,
            role: created.role,
        }),
    ))
}

/// GET /api/v1/profile/role
pub async fn handle_get_role(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<RoleResponse>, AppError> {
    let role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;

    let role = role.ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(RoleResponse { role }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_response_serializes_role_as_screaming_snake() {
        let response = ProfileResponse {
            id: "user_1".to_string(),
            email: "a@b.c".to_string(),
            role: Role::Candidate,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["role"], "CANDIDATE");
    }
}
