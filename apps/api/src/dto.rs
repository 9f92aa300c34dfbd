mod common;
mod roles;
mod users;

pub use common::{ApiEnvelope, ChangeResponse, HealthResponse, PageQuery};
pub use roles::{AssignRoleRequest, PermissionRequest, PermissionResponse, RoleRequest, RoleResponse};
pub use users::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileResponse, RegisterRequest,
    UpdateProfileRequest, UserResponse,
};
