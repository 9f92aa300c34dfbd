use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(&self, user: NewUser) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, nickname, email, phone, status)
            VALUES ($1, $2, $3, LOWER($4), $5, $6)
            RETURNING id, username, password_hash, nickname, email, phone, avatar, status
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(UserStatus::Active.as_flag())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| unique_conflict_or_internal(error, "create user"))?;

        Ok(row.into())
    }

    pub(super) async fn update_profile_impl(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET nickname = COALESCE($2, nickname),
                email = COALESCE(LOWER($3), email),
                phone = COALESCE($4, phone),
                avatar = COALESCE($5, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, password_hash, nickname, email, phone, avatar, status
            "#,
        )
        .bind(user_id.value())
        .bind(update.nickname.as_deref())
        .bind(update.email.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.avatar.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| unique_conflict_or_internal(error, "update user profile"))?;

        row.map(UserRecord::from)
            .ok_or_else(|| AppError::NotFound(format!("user {user_id} not found")))
    }

    pub(super) async fn update_password_impl(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.value())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {user_id} not found")));
        }

        Ok(())
    }
}
