use super::*;

use crate::dto::{ChangeResponse, PermissionRequest, PermissionResponse};

pub async fn add_permission_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PermissionRequest>,
) -> EnvelopeResult<ChangeResponse> {
    let changed = state
        .role_service
        .add_permission(
            payload.role.as_str(),
            payload.path.as_str(),
            payload.method.as_str(),
        )
        .await?;

    Ok(Json(ApiEnvelope::success(ChangeResponse { changed })))
}

pub async fn remove_permission_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PermissionRequest>,
) -> EnvelopeResult<ChangeResponse> {
    let changed = state
        .role_service
        .remove_permission(
            payload.role.as_str(),
            payload.path.as_str(),
            payload.method.as_str(),
        )
        .await?;

    Ok(Json(ApiEnvelope::success(ChangeResponse { changed })))
}

pub async fn role_permissions_handler(
    State(state): State<AppState>,
    ApiPath(role_name): ApiPath<String>,
) -> EnvelopeResult<Vec<PermissionResponse>> {
    let permissions = state
        .role_service
        .role_permissions(role_name.as_str())?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(ApiEnvelope::success(permissions)))
}

pub async fn role_members_handler(
    State(state): State<AppState>,
    ApiPath(role_name): ApiPath<String>,
) -> EnvelopeResult<Vec<String>> {
    let members = state.role_service.role_members(role_name.as_str())?;

    Ok(Json(ApiEnvelope::success(members)))
}
