use serde::{Deserialize, Serialize};
use tierup_application::SaveRoleInput;
use tierup_domain::{PolicyRule, Role};

/// Incoming payload for role creation and update.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl From<RoleRequest> for SaveRoleInput {
    fn from(value: RoleRequest) -> Self {
        Self {
            name: value.name,
            display_name: value.display_name,
            description: value.description,
        }
    }
}

/// API representation of a role.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.value(),
            name: value.name.into(),
            display_name: value.display_name,
            description: value.description,
        }
    }
}

/// Incoming payload for assigning or removing a user's role.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: i64,
}

/// A permission tuple as sent over the wire.
#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub role: String,
    pub path: String,
    pub method: String,
}

/// API representation of a permission tuple.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub role: String,
    pub path: String,
    pub method: String,
}

impl From<PolicyRule> for PermissionResponse {
    fn from(value: PolicyRule) -> Self {
        Self {
            role: value.subject().to_owned(),
            path: value.resource().to_owned(),
            method: value.action().to_owned(),
        }
    }
}
