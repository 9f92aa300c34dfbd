use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use tierup_core::AppResult;
use tierup_domain::{GroupingField, GroupingRule, PolicyField, PolicyModel, PolicyRule, PurgedRules};

use crate::{PolicyEngine, PolicyRepository};

/// Write-through store for permission and grouping tuples.
///
/// Every mutation is persisted first and then applied to the engine's model.
/// Mutations are serialised so durable order matches in-memory order.
/// Clones share both the writer gate and the membership gate.
#[derive(Clone)]
pub struct PolicyStore {
    repository: Arc<dyn PolicyRepository>,
    engine: PolicyEngine,
    writer: Arc<Mutex<()>>,
    memberships: Arc<Mutex<()>>,
}

impl PolicyStore {
    /// Creates a store that writes through to `repository` and publishes
    /// changes to `engine`.
    #[must_use]
    pub fn new(repository: Arc<dyn PolicyRepository>, engine: PolicyEngine) -> Self {
        Self {
            repository,
            engine,
            writer: Arc::new(Mutex::new(())),
            memberships: Arc::new(Mutex::new(())),
        }
    }

    /// Serialises sequences that touch both relational membership and the
    /// grouping tuples of a role. Held across every step and compensation.
    pub(crate) async fn lock_memberships(&self) -> MutexGuard<'_, ()> {
        self.memberships.lock().await
    }

    /// Returns the engine this store publishes to.
    #[must_use]
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Replaces the in-memory model with every persisted tuple.
    pub async fn load(&self) -> AppResult<()> {
        let _writer = self.writer.lock().await;
        let policies = self.repository.load_policies().await?;
        let groupings = self.repository.load_groupings().await?;
        let (policy_count, grouping_count) = (policies.len(), groupings.len());

        let model = PolicyModel::from_rules(policies, groupings);
        self.engine.apply(|current| *current = model)?;

        info!(
            policies = policy_count,
            groupings = grouping_count,
            "policy model loaded"
        );
        Ok(())
    }

    /// Grants `action` on `resource` to `subject`. Returns `false` if the
    /// grant already existed.
    pub async fn add_policy(&self, subject: &str, resource: &str, action: &str) -> AppResult<bool> {
        let rule = PolicyRule::new(subject, resource, action)?;
        let _writer = self.writer.lock().await;

        let inserted = self.repository.insert_policy(&rule).await?;
        let added = self.engine.apply(|model| model.add_policy(rule))?;
        Ok(inserted || added)
    }

    /// Revokes a grant. Returns `false` if it did not exist.
    pub async fn remove_policy(
        &self,
        subject: &str,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let rule = PolicyRule::new(subject, resource, action)?;
        let _writer = self.writer.lock().await;

        let deleted = self.repository.delete_policy(&rule).await?;
        let removed = self.engine.apply(|model| model.remove_policy(&rule))?;
        Ok(deleted || removed)
    }

    /// Makes `user` inherit the grants of `role`. Returns `false` if the
    /// grouping already existed.
    pub async fn add_grouping(&self, user: &str, role: &str) -> AppResult<bool> {
        let rule = GroupingRule::new(user, role)?;
        let _writer = self.writer.lock().await;

        let inserted = self.repository.insert_grouping(&rule).await?;
        let added = self.engine.apply(|model| model.add_grouping(rule))?;
        Ok(inserted || added)
    }

    /// Removes a grouping. Returns `false` if it did not exist.
    pub async fn remove_grouping(&self, user: &str, role: &str) -> AppResult<bool> {
        let rule = GroupingRule::new(user, role)?;
        let _writer = self.writer.lock().await;

        let deleted = self.repository.delete_grouping(&rule).await?;
        let removed = self.engine.apply(|model| model.remove_grouping(&rule))?;
        Ok(deleted || removed)
    }

    /// Returns permission tuples whose `field` equals `value`.
    pub fn filtered_policies(&self, field: PolicyField, value: &str) -> AppResult<Vec<PolicyRule>> {
        self.engine
            .inspect(|model| model.filtered_policies(field, value.trim()))
    }

    /// Returns grouping tuples whose `field` equals `value`.
    pub fn filtered_groupings(
        &self,
        field: GroupingField,
        value: &str,
    ) -> AppResult<Vec<GroupingRule>> {
        self.engine
            .inspect(|model| model.filtered_groupings(field, value.trim()))
    }

    /// Renames a subject in every tuple, atomically in the durable store.
    pub async fn rename_subject(&self, old: &str, new: &str) -> AppResult<()> {
        if old == new {
            return Ok(());
        }

        let _writer = self.writer.lock().await;
        self.repository.rename_subject(old, new).await?;
        self.engine.apply(|model| model.rename_subject(old, new))?;

        info!(from = old, to = new, "policy subject renamed");
        Ok(())
    }

    /// Removes every tuple naming `subject` and returns them for a later
    /// [`Self::restore`].
    pub async fn purge_subject(&self, subject: &str) -> AppResult<PurgedRules> {
        let _writer = self.writer.lock().await;
        let rules = self.engine.inspect(|model| model.rules_referencing(subject))?;
        if rules.is_empty() {
            return Ok(rules);
        }

        self.repository.delete_rules(&rules).await?;
        let purged = self.engine.apply(|model| model.purge_subject(subject))?;

        info!(
            subject,
            policies = purged.policies.len(),
            groupings = purged.groupings.len(),
            "policy subject purged"
        );
        Ok(purged)
    }

    /// Puts back tuples removed by [`Self::purge_subject`].
    pub async fn restore(&self, rules: PurgedRules) -> AppResult<()> {
        if rules.is_empty() {
            return Ok(());
        }

        let _writer = self.writer.lock().await;
        self.repository.insert_rules(&rules).await?;
        self.engine.apply(|model| model.restore(rules))?;
        Ok(())
    }
}
