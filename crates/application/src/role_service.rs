use std::sync::Arc;

use tracing::{error, info, warn};

use tierup_core::{AppError, AppResult, NonEmptyString};
use tierup_domain::{
    GroupingField, Page, PageRequest, PolicyField, PolicyRule, ROLE_DESCRIPTION_MAX_LENGTH,
    ROLE_DISPLAY_NAME_MAX_LENGTH, Role, RoleId, RoleName,
};

use crate::{PolicyStore, RoleInput, RoleRepository};

/// Caller-supplied role fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
}

impl SaveRoleInput {
    fn validate(self) -> AppResult<RoleInput> {
        let display_name = NonEmptyString::new(self.display_name)
            .map_err(|_| AppError::Validation("display_name must not be empty".to_owned()))?;
        let description = self.description.trim().to_owned();
        ensure_max_length("display_name", display_name.as_str(), ROLE_DISPLAY_NAME_MAX_LENGTH)?;
        ensure_max_length("description", &description, ROLE_DESCRIPTION_MAX_LENGTH)?;

        Ok(RoleInput {
            name: RoleName::new(self.name)?,
            display_name: display_name.into(),
            description,
        })
    }
}

fn ensure_max_length(field: &str, value: &str, max_length: usize) -> AppResult<()> {
    if value.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {max_length} characters"
        )));
    }
    Ok(())
}

/// Application service for role records and the grants attached to them.
///
/// The role name is the subject in the policy store, so renames and deletes
/// carry the matching tuples along.
#[derive(Clone)]
pub struct RoleService {
    role_repository: Arc<dyn RoleRepository>,
    policy_store: PolicyStore,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(role_repository: Arc<dyn RoleRepository>, policy_store: PolicyStore) -> Self {
        Self {
            role_repository,
            policy_store,
        }
    }

    /// Creates a role with a unique name.
    pub async fn create_role(&self, input: SaveRoleInput) -> AppResult<Role> {
        let input = input.validate()?;
        self.ensure_name_available(&input.name, None).await?;

        let role = self.role_repository.create(&input).await?;
        info!(role_id = %role.id, role = role.name.as_str(), "role created");
        Ok(role)
    }

    /// Returns one role.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))
    }

    /// Finds a role by name.
    pub async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.role_repository.find_by_name(name.trim()).await
    }

    /// Replaces a role's fields. A rename moves the role's tuples to the new
    /// name; if that fails the relational rename is undone.
    pub async fn update_role(&self, role_id: RoleId, input: SaveRoleInput) -> AppResult<Role> {
        let input = input.validate()?;
        let _memberships = self.policy_store.lock_memberships().await;
        let existing = self.get_role(role_id).await?;
        let renamed = existing.name != input.name;

        if renamed {
            self.ensure_name_available(&input.name, Some(role_id)).await?;
        }

        let updated = self.role_repository.update(role_id, &input).await?;
        if !renamed {
            return Ok(updated);
        }

        if let Err(rename_error) = self
            .policy_store
            .rename_subject(existing.name.as_str(), updated.name.as_str())
            .await
        {
            let previous = RoleInput {
                name: existing.name.clone(),
                display_name: existing.display_name.clone(),
                description: existing.description.clone(),
            };

            return match self.role_repository.update(role_id, &previous).await {
                Ok(_) => {
                    warn!(role_id = %role_id, error = %rename_error, "policy rename failed, role rename rolled back");
                    Err(rename_error)
                }
                Err(rollback_error) => {
                    error!(
                        role_id = %role_id,
                        from = existing.name.as_str(),
                        to = updated.name.as_str(),
                        error = %rollback_error,
                        "role table and policy store diverged after rename"
                    );
                    Err(AppError::Internal(format!(
                        "rename of role {role_id} left policy subjects inconsistent"
                    )))
                }
            };
        }

        info!(
            role_id = %role_id,
            from = existing.name.as_str(),
            to = updated.name.as_str(),
            "role renamed"
        );
        Ok(updated)
    }

    /// Deletes a role together with every tuple naming it.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let _memberships = self.policy_store.lock_memberships().await;
        let role = self.get_role(role_id).await?;
        let purged = self.policy_store.purge_subject(role.name.as_str()).await?;

        match self.role_repository.delete(role_id).await {
            Ok(_) => {
                info!(role_id = %role_id, role = role.name.as_str(), "role deleted");
                Ok(())
            }
            Err(delete_error) => match self.policy_store.restore(purged).await {
                Ok(()) => {
                    warn!(role_id = %role_id, error = %delete_error, "role delete failed, policy tuples restored");
                    Err(delete_error)
                }
                Err(restore_error) => {
                    error!(
                        role_id = %role_id,
                        role = role.name.as_str(),
                        error = %restore_error,
                        "role kept but its policy tuples were lost"
                    );
                    Err(AppError::Internal(format!(
                        "delete of role {role_id} left policy tuples inconsistent"
                    )))
                }
            },
        }
    }

    /// Lists roles one page at a time.
    pub async fn list_roles(&self, page: PageRequest) -> AppResult<Page<Role>> {
        self.role_repository.list(page).await
    }

    /// Grants `method` on `path` to an existing role. Returns `false` if the
    /// grant already existed.
    pub async fn add_permission(&self, role: &str, path: &str, method: &str) -> AppResult<bool> {
        let _memberships = self.policy_store.lock_memberships().await;
        let role = self
            .find_role_by_name(role)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{}' not found", role.trim())))?;

        self.policy_store
            .add_policy(role.name.as_str(), path, method)
            .await
    }

    /// Revokes a grant. Returns `false` if it did not exist.
    pub async fn remove_permission(&self, role: &str, path: &str, method: &str) -> AppResult<bool> {
        self.policy_store.remove_policy(role, path, method).await
    }

    /// Lists the grants held directly by a role.
    pub fn role_permissions(&self, role: &str) -> AppResult<Vec<PolicyRule>> {
        self.policy_store
            .filtered_policies(PolicyField::Subject, role)
    }

    /// Lists the subjects grouped into a role by the policy store.
    pub fn role_members(&self, role: &str) -> AppResult<Vec<String>> {
        Ok(self
            .policy_store
            .filtered_groupings(GroupingField::Role, role)?
            .into_iter()
            .map(|rule| rule.user().to_owned())
            .collect())
    }

    async fn ensure_name_available(&self, name: &RoleName, owner: Option<RoleId>) -> AppResult<()> {
        match self.role_repository.find_by_name(name.as_str()).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::Conflict(format!(
                "role name '{}' already exists",
                name.as_str()
            ))),
            _ => Ok(()),
        }
    }
}
