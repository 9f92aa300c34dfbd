//! PostgreSQL-backed role and `user_roles` repository.

use async_trait::async_trait;
use sqlx::PgPool;

use tierup_application::{RoleInput, RoleRepository};
use tierup_core::{AppError, AppResult};
use tierup_domain::{Page, PageRequest, Role, RoleId, RoleName, UserId};

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    display_name: String,
    description: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoleId::new(row.id),
            name: RoleName::new(row.name)?,
            display_name: row.display_name,
            description: row.description,
        })
    }
}

fn into_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    rows.into_iter().map(Role::try_from).collect()
}

mod definitions;
mod memberships;

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_by_id_impl(role_id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_by_name_impl(name).await
    }

    async fn create(&self, input: &RoleInput) -> AppResult<Role> {
        self.create_impl(input).await
    }

    async fn update(&self, role_id: RoleId, input: &RoleInput) -> AppResult<Role> {
        self.update_impl(role_id, input).await
    }

    async fn delete(&self, role_id: RoleId) -> AppResult<bool> {
        self.delete_impl(role_id).await
    }

    async fn list(&self, page: PageRequest) -> AppResult<Page<Role>> {
        self.list_impl(page).await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        self.list_for_user_impl(user_id).await
    }

    async fn add_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        self.add_user_role_impl(user_id, role_id).await
    }

    async fn remove_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        self.remove_user_role_impl(user_id, role_id).await
    }
}

fn role_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("role name already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[cfg(test)]
mod tests;
