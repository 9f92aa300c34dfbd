use super::*;

use tierup_domain::Page;

use crate::dto::{PageQuery, RoleRequest, RoleResponse};

pub async fn create_role_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> EnvelopeResult<RoleResponse> {
    let role = state.role_service.create_role(payload.into()).await?;

    Ok(Json(ApiEnvelope::success(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    ApiPath(role_id): ApiPath<i64>,
) -> EnvelopeResult<RoleResponse> {
    let role = state.role_service.get_role(RoleId::new(role_id)).await?;

    Ok(Json(ApiEnvelope::success(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    ApiPath(role_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> EnvelopeResult<RoleResponse> {
    let role = state
        .role_service
        .update_role(RoleId::new(role_id), payload.into())
        .await?;

    Ok(Json(ApiEnvelope::success(RoleResponse::from(role))))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    ApiPath(role_id): ApiPath<i64>,
) -> EnvelopeResult<()> {
    state.role_service.delete_role(RoleId::new(role_id)).await?;

    Ok(Json(ApiEnvelope::empty()))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> EnvelopeResult<Page<RoleResponse>> {
    let page = state
        .role_service
        .list_roles(query.to_page_request())
        .await?;

    Ok(Json(ApiEnvelope::success(Page {
        list: page.list.into_iter().map(RoleResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    })))
}
