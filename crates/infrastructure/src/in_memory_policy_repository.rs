use async_trait::async_trait;
use tokio::sync::RwLock;

use tierup_application::PolicyRepository;
use tierup_core::AppResult;
use tierup_domain::{GroupingRule, PolicyModel, PolicyRule, PurgedRules};

/// In-memory policy tuple storage for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    rules: RwLock<PolicyModel>,
}

impl InMemoryPolicyRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn load_policies(&self) -> AppResult<Vec<PolicyRule>> {
        Ok(self.rules.read().await.policies())
    }

    async fn load_groupings(&self) -> AppResult<Vec<GroupingRule>> {
        Ok(self.rules.read().await.groupings())
    }

    async fn insert_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        Ok(self.rules.write().await.add_policy(rule.clone()))
    }

    async fn delete_policy(&self, rule: &PolicyRule) -> AppResult<bool> {
        Ok(self.rules.write().await.remove_policy(rule))
    }

    async fn insert_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        Ok(self.rules.write().await.add_grouping(rule.clone()))
    }

    async fn delete_grouping(&self, rule: &GroupingRule) -> AppResult<bool> {
        Ok(self.rules.write().await.remove_grouping(rule))
    }

    async fn rename_subject(&self, old: &str, new: &str) -> AppResult<()> {
        self.rules.write().await.rename_subject(old, new);
        Ok(())
    }

    async fn delete_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        let mut stored = self.rules.write().await;
        for rule in &rules.policies {
            stored.remove_policy(rule);
        }
        for rule in &rules.groupings {
            stored.remove_grouping(rule);
        }
        Ok(())
    }

    async fn insert_rules(&self, rules: &PurgedRules) -> AppResult<()> {
        self.rules.write().await.restore(rules.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tierup_application::PolicyRepository;
    use tierup_domain::{GroupingRule, PolicyRule};

    use super::InMemoryPolicyRepository;

    #[tokio::test]
    async fn rename_rewrites_subjects_and_roles() {
        let repository = InMemoryPolicyRepository::new();
        let (Ok(policy), Ok(grouping)) = (
            PolicyRule::new("editor", "/api/v1/role", "post"),
            GroupingRule::new("7", "editor"),
        ) else {
            panic!("fixtures should be valid");
        };

        assert!(matches!(repository.insert_policy(&policy).await, Ok(true)));
        assert!(matches!(repository.insert_policy(&policy).await, Ok(false)));
        assert!(matches!(repository.insert_grouping(&grouping).await, Ok(true)));
        assert!(repository.rename_subject("editor", "author").await.is_ok());

        let policies = repository.load_policies().await.unwrap_or_default();
        let groupings = repository.load_groupings().await.unwrap_or_default();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].subject(), "author");
        assert_eq!(policies[0].action(), "POST");
        assert_eq!(groupings.len(), 1);
        assert_eq!(groupings[0].role(), "author");
    }
}
