use super::*;

impl PostgresPolicyRepository {
    pub(super) async fn insert_tuple_impl(
        &self,
        ptype: &str,
        v0: &str,
        v1: &str,
        v2: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO casbin_rule (ptype, v0, v1, v2)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (ptype, v0, v1, v2) DO NOTHING
            "#,
        )
        .bind(ptype)
        .bind(v0)
        .bind(v1)
        .bind(v2)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert policy rule: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    pub(super) async fn delete_tuple_impl(
        &self,
        ptype: &str,
        v0: &str,
        v1: &str,
        v2: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM casbin_rule
            WHERE ptype = $1 AND v0 = $2 AND v1 = $3 AND v2 = $4
            "#,
        )
        .bind(ptype)
        .bind(v0)
        .bind(v1)
        .bind(v2)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete policy rule: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
