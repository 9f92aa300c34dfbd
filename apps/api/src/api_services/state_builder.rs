use std::sync::Arc;

use sqlx::PgPool;
use tierup_application::{
    IdentityTokenService, PasswordHasher, PolicyEngine, PolicyRepository, PolicyStore,
    RoleAssignmentService, RoleRepository, RoleService, UserRepository, UserService,
};
use tierup_core::AppError;
use tierup_infrastructure::{
    PostgresPolicyRepository, PostgresRoleRepository, PostgresUserRepository,
};

use crate::state::AppState;

/// Storage adapters behind the application services.
pub struct RepositorySet {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub policies: Arc<dyn PolicyRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
            policies: Arc::new(PostgresPolicyRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use tierup_infrastructure::{
            InMemoryPolicyRepository, InMemoryRoleRepository, InMemoryUserRepository,
        };

        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            roles: Arc::new(InMemoryRoleRepository::new()),
            policies: Arc::new(InMemoryPolicyRepository::new()),
        }
    }
}

/// Wires the services and loads the policy model from durable storage.
pub async fn build_app_state(
    repositories: RepositorySet,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: Arc<dyn IdentityTokenService>,
) -> Result<AppState, AppError> {
    let policy_engine = PolicyEngine::new();
    let policy_store = PolicyStore::new(repositories.policies, policy_engine.clone());
    policy_store.load().await?;

    Ok(AppState {
        user_service: UserService::new(
            repositories.users.clone(),
            repositories.roles.clone(),
            password_hasher,
            token_service.clone(),
        ),
        role_service: RoleService::new(repositories.roles.clone(), policy_store.clone()),
        role_assignment_service: RoleAssignmentService::new(
            repositories.users,
            repositories.roles,
            policy_store,
        ),
        policy_engine,
        token_service,
    })
}
