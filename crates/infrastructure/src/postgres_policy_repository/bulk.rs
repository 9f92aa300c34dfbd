use super::*;

impl PostgresPolicyRepository {
    pub(super) async fn rename_subject_impl(&self, old: &str, new: &str) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO casbin_rule (ptype, v0, v1, v2)
            SELECT ptype, $2, v1, v2
            FROM casbin_rule
            WHERE ptype = 'p' AND v0 = $1
            ON CONFLICT (ptype, v0, v1, v2) DO NOTHING
            "#,
        )
        .bind(old)
        .bind(new)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to rename policy subject: {error}")))?;

        // Groupings between the old and new name would become self-references.
        sqlx::query(
            r#"
            INSERT INTO casbin_rule (ptype, v0, v1, v2)
            SELECT ptype,
                   CASE WHEN v0 = $1 THEN $2 ELSE v0 END,
                   CASE WHEN v1 = $1 THEN $2 ELSE v1 END,
                   v2
            FROM casbin_rule
            WHERE ptype = 'g'
              AND (v0 = $1 OR v1 = $1)
              AND NOT (v0 IN ($1, $2) AND v1 IN ($1, $2))
            ON CONFLICT (ptype, v0, v1, v2) DO NOTHING
            "#,
        )
        .bind(old)
        .bind(new)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to rename grouping subject: {error}"))
        })?;

        sqlx::query(
            r#"
            DELETE FROM casbin_rule
            WHERE (ptype = 'p' AND v0 = $1)
               OR (ptype = 'g' AND (v0 = $1 OR v1 = $1))
            "#,
        )
        .bind(old)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove renamed policy rules: {error}"))
        })?;

        commit(transaction, "policy subject rename").await
    }

    pub(super) async fn delete_rules_impl(&self, rules: &PurgedRules) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for (ptype, v0, v1, v2) in tuples(rules) {
            sqlx::query(
                r#"
                DELETE FROM casbin_rule
                WHERE ptype = $1 AND v0 = $2 AND v1 = $3 AND v2 = $4
                "#,
            )
            .bind(ptype)
            .bind(v0)
            .bind(v1)
            .bind(v2)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete policy rules: {error}"))
            })?;
        }

        commit(transaction, "policy rule deletion").await
    }

    pub(super) async fn insert_rules_impl(&self, rules: &PurgedRules) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for (ptype, v0, v1, v2) in tuples(rules) {
            sqlx::query(
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
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to insert policy rules: {error}"))
            })?;
        }

        commit(transaction, "policy rule insertion").await
    }
}

fn tuples(rules: &PurgedRules) -> impl Iterator<Item = (&'static str, &str, &str, &str)> {
    let policies = rules
        .policies
        .iter()
        .map(|rule| (POLICY_TYPE, rule.subject(), rule.resource(), rule.action()));
    let groupings = rules
        .groupings
        .iter()
        .map(|rule| (GROUPING_TYPE, rule.user(), rule.role(), ""));

    policies.chain(groupings)
}
