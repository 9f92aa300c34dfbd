use async_trait::async_trait;

use tierup_core::AppResult;
use tierup_domain::{GroupingRule, PolicyRule, PurgedRules};

/// Durable storage for permission and grouping tuples.
///
/// Inserts and deletes report whether a row changed so idempotent calls are
/// distinguishable from real writes.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Reads every stored permission tuple.
    async fn load_policies(&self) -> AppResult<Vec<PolicyRule>>;

    /// Reads every stored grouping tuple.
    async fn load_groupings(&self) -> AppResult<Vec<GroupingRule>>;

    /// Stores one permission tuple. Returns `false` if it already existed.
    async fn insert_policy(&self, rule: &PolicyRule) -> AppResult<bool>;

    /// Deletes one permission tuple. Returns `false` if it was absent.
    async fn delete_policy(&self, rule: &PolicyRule) -> AppResult<bool>;

    /// Stores one grouping tuple. Returns `false` if it already existed.
    async fn insert_grouping(&self, rule: &GroupingRule) -> AppResult<bool>;

    /// Deletes one grouping tuple. Returns `false` if it was absent.
    async fn delete_grouping(&self, rule: &GroupingRule) -> AppResult<bool>;

    /// Rewrites every tuple naming `old` to name `new`, in one transaction.
    async fn rename_subject(&self, old: &str, new: &str) -> AppResult<()>;

    /// Deletes a set of tuples in one transaction.
    async fn delete_rules(&self, rules: &PurgedRules) -> AppResult<()>;

    /// Inserts a set of tuples in one transaction, skipping existing rows.
    async fn insert_rules(&self, rules: &PurgedRules) -> AppResult<()>;
}
