use super::*;

use crate::dto::{AssignRoleRequest, RoleResponse};

pub async fn assign_role_handler(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AssignRoleRequest>,
) -> EnvelopeResult<RoleResponse> {
    let role = state
        .role_assignment_service
        .assign_role(UserId::new(user_id), RoleId::new(payload.role_id))
        .await?;

    Ok(Json(ApiEnvelope::success(RoleResponse::from(role))))
}

pub async fn remove_role_handler(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AssignRoleRequest>,
) -> EnvelopeResult<()> {
    state
        .role_assignment_service
        .remove_role(UserId::new(user_id), RoleId::new(payload.role_id))
        .await?;

    Ok(Json(ApiEnvelope::empty()))
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> EnvelopeResult<Vec<RoleResponse>> {
    let roles = state
        .role_assignment_service
        .list_user_roles(UserId::new(user_id))
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(ApiEnvelope::success(roles)))
}
