//! PostgreSQL-backed policy tuple storage.
//!
//! Tuples live in a casbin-compatible `casbin_rule` table: `ptype = 'p'`
//! rows hold `(subject, resource, action)` and `ptype = 'g'` rows hold
//! `(user, role)` with an empty `v2`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use tierup_application::PolicyRepository;
use tierup_core::{AppError, AppResult};
use tierup_domain::{GroupingRule, PolicyRule, PurgedRules};

const POLICY_TYPE: &str = "p";
const GROUPING_TYPE: &str = "g";

/// PostgreSQL implementation of the policy repository port.
#[derive(Clone)]
pub struct PostgresPolicyRepository {
    pool: PgPool,
}

impl PostgresPolicyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    v0: String,
    v1: String,
    v2: String,
}

mod bulk;
mod tuples;

#[async_trait]
impl PolicyRepository for PostgresPolicyRepository {
    async fn load_policies(&self) -> AppResult<Vec<PolicyRule>> {
        let rows = self.load_rows(POLICY_TYPE).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match PolicyRule::new(row.v0, row.v1, row.v2) {
                Ok(rule) => Some(rule),
                Err(error) => {
                    warn!(error = %error, "skipping malformed policy row");
                    None
                }
            })
            .collect())
    }

    async fn load_groupings(&self) -> AppResult<Vec<GroupingRule>> {
        let rows = self.load_rows(GROUPING_TYPE).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match GroupingRule::new(row.v0, row.v1) {
                Ok(rule) => Some(rule),
                Err(error) => {
                    warn!(error = %error, "skipping malformed grouping row");
                    None
                }
            })
            .collect())
    }

    async fn insert_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        self.insert_tuple_impl(POLICY_TYPE, rule.subject(), rule.resource(), rule.action())
            .await
    }

    async fn delete_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        self.delete_tuple_impl(POLICY_TYPE, rule.subject(), rule.resource(), rule.action())
            .await
    }

    async fn insert_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        self.insert_tuple_impl(GROUPING_TYPE, rule.user(), rule.role(), "")
            .await
    }

    async fn delete_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        self.delete_tuple_impl(GROUPING_TYPE, rule.user(), rule.role(), "")
            .await
    }

    async fn rename_subject(&self, old: &str, new: &str) -> AppResult<()> {
        self.rename_subject_impl(old, new).await
    }

    async fn delete_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        self.delete_rules_impl(rules).await
    }

    async fn insert_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        self.insert_rules_impl(rules).await
    }
}

impl PostgresPolicyRepository {
    async fn load_rows(&self, ptype: &str) -> AppResult<Vec<RuleRow>> {
        sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT v0, v1, v2
            FROM casbin_rule
            WHERE ptype = $1
            ORDER BY id
            "#,
        )
        .bind(ptype)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load policy rules: {error}")))
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start policy transaction: {error}"))
        })
    }
}

async fn commit(transaction: Transaction<'_, Postgres>, operation: &str) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit {operation}: {error}")))
}
