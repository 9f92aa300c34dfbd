use serde::{Deserialize, Serialize};
use tierup_application::{LoginResult, RegisterUserInput, UpdateProfileInput, UserProfile, UserRecord};

/// Incoming payload for self-registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl From<RegisterRequest> for RegisterUserInput {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username,
            password: value.password,
            nickname: value.nickname,
            email: value.email,
            phone: value.phone,
        }
    }
}

/// Incoming payload for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// API representation of a user. The credential hash is never serialised.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub phone: String,
    pub avatar: String,
    pub status: i16,
}

impl From<UserRecord> for UserResponse {
    fn from(value: UserRecord) -> Self {
        Self {
            id: value.id.value(),
            username: value.username,
            nickname: value.nickname,
            email: value.email,
            phone: value.phone,
            avatar: value.avatar,
            status: value.status.as_flag(),
        }
    }
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserResponse,
}

impl From<LoginResult> for LoginResponse {
    fn from(value: LoginResult) -> Self {
        Self {
            token: value.token.token,
            expires_at: value.token.expires_at,
            user: UserResponse::from(value.user),
        }
    }
}

/// The caller's profile with role names.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user: UserResponse::from(value.user),
            roles: value.roles.into_iter().map(|role| role.name.into()).collect(),
        }
    }
}

/// Incoming payload for profile edits. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfileInput {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            nickname: value.nickname,
            email: value.email,
            phone: value.phone,
            avatar: value.avatar,
        }
    }
}

/// Incoming payload for a password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}
