use std::sync::Arc;

use tierup_application::{
    IdentityTokenService, PolicyEngine, RoleAssignmentService, RoleService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub role_service: RoleService,
    pub role_assignment_service: RoleAssignmentService,
    pub policy_engine: PolicyEngine,
    pub token_service: Arc<dyn IdentityTokenService>,
}
