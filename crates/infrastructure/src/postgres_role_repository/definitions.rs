use super::*;

impl PostgresRoleRepository {
    pub(super) async fn find_by_id_impl(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by id: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn find_by_name_impl(&self, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?;

        row.map(Role::try_from).transpose()
    }

    pub(super) async fn create_impl(&self, input: &RoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            INSERT INTO roles (name, display_name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, display_name, description
            "#,
        )
        .bind(input.name.as_str())
        .bind(&input.display_name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| role_conflict_or_internal(error, "create role"))?;

        Role::try_from(row)
    }

    pub(super) async fn update_impl(&self, role_id: RoleId, input: &RoleInput) -> AppResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET name = $2, display_name = $3, description = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, name, display_name, description
            "#,
        )
        .bind(role_id.value())
        .bind(input.name.as_str())
        .bind(&input.display_name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| role_conflict_or_internal(error, "update role"))?;

        row.map(Role::try_from)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("role {role_id} not found")))
    }

    pub(super) async fn delete_impl(&self, role_id: RoleId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id.value())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn list_impl(&self, page: PageRequest) -> AppResult<Page<Role>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count roles: {error}")))?;

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, display_name, description
            FROM roles
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(Page {
            list: into_roles(rows)?,
            total,
            page: page.page(),
            page_size: page.page_size(),
        })
    }
}
