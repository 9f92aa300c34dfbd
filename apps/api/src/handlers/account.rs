use super::*;

use crate::dto::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    UpdateProfileRequest, UserResponse,
};

pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> EnvelopeResult<UserResponse> {
    let user = state.user_service.register(payload.into()).await?;

    Ok(Json(ApiEnvelope::success(UserResponse::from(user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> EnvelopeResult<LoginResponse> {
    let result = state
        .user_service
        .login(payload.username.as_str(), payload.password.as_str())
        .await?;

    Ok(Json(ApiEnvelope::success(LoginResponse::from(result))))
}

pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
) -> EnvelopeResult<ProfileResponse> {
    let profile = state
        .user_service
        .profile(UserId::new(subject.subject_id()))
        .await?;

    Ok(Json(ApiEnvelope::success(ProfileResponse::from(profile))))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> EnvelopeResult<UserResponse> {
    let user = state
        .user_service
        .update_profile(UserId::new(subject.subject_id()), payload.into())
        .await?;

    Ok(Json(ApiEnvelope::success(UserResponse::from(user))))
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthenticatedSubject>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> EnvelopeResult<()> {
    state
        .user_service
        .change_password(
            UserId::new(subject.subject_id()),
            payload.old_password.as_str(),
            payload.new_password.as_str(),
        )
        .await?;

    Ok(Json(ApiEnvelope::empty()))
}
