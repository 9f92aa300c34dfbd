use super::*;

impl PostgresRoleRepository {
    pub(super) async fn list_for_user_impl(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.display_name, r.description
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        into_roles(rows)
    }

    pub(super) async fn add_user_role_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.value())
        .bind(role_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| match &error {
            sqlx::Error::Database(database_error)
                if database_error.is_foreign_key_violation() =>
            {
                AppError::NotFound(format!("user {user_id} or role {role_id} not found"))
            }
            _ => AppError::Internal(format!("failed to assign user role: {error}")),
        })?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn remove_user_role_impl(
        &self,
        user_id: UserId,
        role_id: RoleId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.value())
        .bind(role_id.value())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove user role: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
