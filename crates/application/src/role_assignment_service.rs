//! Keeps relational role membership and grouping tuples consistent.
//!
//! Each operation writes `user_roles` first and the grouping tuple second.
//! A failed grouping write is retried once and then undone on the relational
//! side, so neither store reports success alone. Every sequence runs under
//! the policy store's membership gate, which role renames and deletes share.

use std::sync::Arc;

use tracing::{error, info, warn};

use tierup_core::{AppError, AppResult};
use tierup_domain::{Role, RoleId, UserId};

use crate::{PolicyStore, RoleRepository, UserRecord, UserRepository};

/// Application service that is the only writer of user-to-role groupings.
#[derive(Clone)]
pub struct RoleAssignmentService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    policy_store: PolicyStore,
}

impl RoleAssignmentService {
    /// Creates a new role assignment service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        policy_store: PolicyStore,
    ) -> Self {
        Self {
            user_repository,
            role_repository,
            policy_store,
        }
    }

    /// Grants a role to a user.
    ///
    /// Re-assigning an existing association succeeds and re-asserts the
    /// grouping tuple.
    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<Role> {
        let _memberships = self.policy_store.lock_memberships().await;
        let (user, role) = self.resolve(user_id, role_id).await?;
        let subject = user.id.as_subject();

        let inserted = self.role_repository.add_user_role(user.id, role.id).await?;

        if let Err(grouping_error) = self.add_grouping_with_retry(&subject, &role).await {
            if inserted {
                self.compensate(
                    self.role_repository.remove_user_role(user.id, role.id).await,
                    &subject,
                    &role,
                    "assign",
                )?;
            }
            return Err(grouping_error);
        }

        info!(user_id = %user.id, role = role.name.as_str(), "role assigned");
        Ok(role)
    }

    /// Revokes a role from a user.
    ///
    /// Removing an absent association succeeds and clears any stale grouping
    /// tuple.
    pub async fn remove_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let _memberships = self.policy_store.lock_memberships().await;
        let (user, role) = self.resolve(user_id, role_id).await?;
        let subject = user.id.as_subject();

        let removed = self
            .role_repository
            .remove_user_role(user.id, role.id)
            .await?;

        if let Err(grouping_error) = self.remove_grouping_with_retry(&subject, &role).await {
            if removed {
                self.compensate(
                    self.role_repository.add_user_role(user.id, role.id).await,
                    &subject,
                    &role,
                    "remove",
                )?;
            }
            return Err(grouping_error);
        }

        info!(user_id = %user.id, role = role.name.as_str(), "role removed");
        Ok(())
    }

    /// Lists the roles associated with a user.
    pub async fn list_user_roles(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        self.find_user(user_id).await?;
        self.role_repository.list_for_user(user_id).await
    }

    async fn resolve(&self, user_id: UserId, role_id: RoleId) -> AppResult<(UserRecord, Role)> {
        let user = self.find_user(user_id).await?;
        let role = self
            .role_repository
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))?;

        Ok((user, role))
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
    }

    async fn add_grouping_with_retry(&self, subject: &str, role: &Role) -> AppResult<()> {
        let role_name = role.name.as_str();
        match self.policy_store.add_grouping(subject, role_name).await {
            Ok(_) => Ok(()),
            Err(first_error) => {
                warn!(subject, role = role_name, error = %first_error, "grouping insert failed, retrying");
                self.policy_store
                    .add_grouping(subject, role_name)
                    .await
                    .map(|_| ())
            }
        }
    }

    async fn remove_grouping_with_retry(&self, subject: &str, role: &Role) -> AppResult<()> {
        let role_name = role.name.as_str();
        match self.policy_store.remove_grouping(subject, role_name).await {
            Ok(_) => Ok(()),
            Err(first_error) => {
                warn!(subject, role = role_name, error = %first_error, "grouping delete failed, retrying");
                self.policy_store
                    .remove_grouping(subject, role_name)
                    .await
                    .map(|_| ())
            }
        }
    }

    fn compensate(
        &self,
        outcome: AppResult<bool>,
        subject: &str,
        role: &Role,
        operation: &str,
    ) -> AppResult<()> {
        match outcome {
            Ok(_) => {
                warn!(
                    subject,
                    role = role.name.as_str(),
                    operation,
                    "grouping write failed, user_roles change rolled back"
                );
                Ok(())
            }
            Err(rollback_error) => {
                error!(
                    subject,
                    role = role.name.as_str(),
                    operation,
                    error = %rollback_error,
                    "user_roles and policy store diverged"
                );
                Err(AppError::Internal(format!(
                    "role {operation} for subject {subject} left membership inconsistent"
                )))
            }
        }
    }
}
