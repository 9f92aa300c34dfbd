use tierup_application::SaveRoleInput;
use tierup_core::AppError;
use tierup_domain::UserId;
use tracing::info;

use crate::state::AppState;

/// Resource pattern granted to the administrator role.
pub const ADMIN_RESOURCE: &str = "/api/v1/*";

/// Ensures the administrator role exists with full API access and optionally
/// assigns it to one user. Safe to run on every start.
pub async fn bootstrap_admin(
    state: &AppState,
    admin_role_name: &str,
    admin_user_id: Option<i64>,
) -> Result<(), AppError> {
    let role = match state.role_service.find_role_by_name(admin_role_name).await? {
        Some(role) => role,
        None => {
            let role = state
                .role_service
                .create_role(SaveRoleInput {
                    name: admin_role_name.to_owned(),
                    display_name: "Administrator".to_owned(),
                    description: "Full access to the admin API".to_owned(),
                })
                .await?;
            info!(role = %role.name.as_str(), "administrator role created");
            role
        }
    };

    if state
        .role_service
        .add_permission(role.name.as_str(), ADMIN_RESOURCE, "*")
        .await?
    {
        info!(role = %role.name.as_str(), resource = ADMIN_RESOURCE, "administrator grant added");
    }

    if let Some(user_id) = admin_user_id {
        state
            .role_assignment_service
            .assign_role(UserId::new(user_id), role.id)
            .await?;
        info!(user_id, role = %role.name.as_str(), "administrator role assigned");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ADMIN_RESOURCE, bootstrap_admin};
    use crate::test_support::test_state;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let state = test_state().await;

        assert!(bootstrap_admin(&state, "admin", None).await.is_ok());
        assert!(bootstrap_admin(&state, "admin", None).await.is_ok());

        let grants = state
            .role_service
            .role_permissions("admin")
            .unwrap_or_default();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].resource(), ADMIN_RESOURCE);
        assert!(matches!(
            state.policy_engine.enforce("admin", "/api/v1/roles", "GET"),
            Ok(true)
        ));
    }

    #[tokio::test]
    async fn bootstrap_rejects_unknown_admin_user() {
        let state = test_state().await;

        let result = bootstrap_admin(&state, "admin", Some(404)).await;

        assert!(matches!(result, Err(tierup_core::AppError::NotFound(_))));
    }
}
