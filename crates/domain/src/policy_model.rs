use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::policy::{GroupingField, GroupingRule, PolicyField, PolicyRule};

/// Every tuple that referenced one subject, as removed by
/// [`PolicyModel::purge_subject`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgedRules {
    /// Permission tuples granted to the subject.
    pub policies: Vec<PolicyRule>,
    /// Grouping tuples naming the subject on either side.
    pub groupings: Vec<GroupingRule>,
}

impl PurgedRules {
    /// Returns whether nothing was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty() && self.groupings.is_empty()
    }
}

/// In-memory authorization model: permission tuples plus grouping tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    policies: BTreeSet<PolicyRule>,
    groupings: BTreeSet<GroupingRule>,
}

impl PolicyModel {
    /// Builds a model from persisted tuples. Duplicates collapse.
    #[must_use]
    pub fn from_rules(
        policies: impl IntoIterator<Item = PolicyRule>,
        groupings: impl IntoIterator<Item = GroupingRule>,
    ) -> Self {
        Self {
            policies: policies.into_iter().collect(),
            groupings: groupings.into_iter().collect(),
        }
    }

    /// Adds a permission tuple. Returns `false` when already present.
    pub fn add_policy(&mut self, rule: PolicyRule) -> bool {
        self.policies.insert(rule)
    }

    /// Removes a permission tuple. Returns `false` when absent.
    pub fn remove_policy(&mut self, rule: &PolicyRule) -> bool {
        self.policies.remove(rule)
    }

    /// Returns whether the permission tuple is present.
    #[must_use]
    pub fn has_policy(&self, rule: &PolicyRule) -> bool {
        self.policies.contains(rule)
    }

    /// Adds a grouping tuple. Returns `false` when already present.
    pub fn add_grouping(&mut self, rule: GroupingRule) -> bool {
        self.groupings.insert(rule)
    }

    /// Removes a grouping tuple. Returns `false` when absent.
    pub fn remove_grouping(&mut self, rule: &GroupingRule) -> bool {
        self.groupings.remove(rule)
    }

    /// Returns whether the grouping tuple is present.
    #[must_use]
    pub fn has_grouping(&self, rule: &GroupingRule) -> bool {
        self.groupings.contains(rule)
    }

    /// Returns permission tuples whose `field` equals `value`.
    #[must_use]
    pub fn filtered_policies(&self, field: PolicyField, value: &str) -> Vec<PolicyRule> {
        self.policies
            .iter()
            .filter(|rule| field.value_of(rule) == value)
            .cloned()
            .collect()
    }

    /// Returns grouping tuples whose `field` equals `value`.
    #[must_use]
    pub fn filtered_groupings(&self, field: GroupingField, value: &str) -> Vec<GroupingRule> {
        self.groupings
            .iter()
            .filter(|rule| field.value_of(rule) == value)
            .cloned()
            .collect()
    }

    /// Returns the subject and every role it reaches through groupings.
    ///
    /// Cycles terminate because each subject is visited once.
    #[must_use]
    pub fn subject_closure(&self, subject: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::from([subject.to_owned()]);
        let mut pending = VecDeque::from([subject.to_owned()]);

        while let Some(current) = pending.pop_front() {
            for grouping in self.groupings.iter().filter(|rule| rule.user() == current) {
                if visited.insert(grouping.role().to_owned()) {
                    pending.push_back(grouping.role().to_owned());
                }
            }
        }

        visited
    }

    /// Decides whether `subject` may perform `action` on `resource`.
    ///
    /// Grants only; anything not granted is denied.
    #[must_use]
    pub fn enforce(&self, subject: &str, resource: &str, action: &str) -> bool {
        let candidates = self.subject_closure(subject);

        self.policies.iter().any(|rule| {
            candidates.contains(rule.subject()) && rule.grants(resource, action)
        })
    }

    /// Returns every tuple naming `subject`, without removing anything.
    #[must_use]
    pub fn rules_referencing(&self, subject: &str) -> PurgedRules {
        PurgedRules {
            policies: self.filtered_policies(PolicyField::Subject, subject),
            groupings: self
                .groupings
                .iter()
                .filter(|rule| rule.user() == subject || rule.role() == subject)
                .cloned()
                .collect(),
        }
    }

    /// Removes every tuple naming `subject` and returns what was removed.
    pub fn purge_subject(&mut self, subject: &str) -> PurgedRules {
        let purged = self.rules_referencing(subject);
        for rule in &purged.policies {
            self.policies.remove(rule);
        }
        for rule in &purged.groupings {
            self.groupings.remove(rule);
        }

        purged
    }

    /// Puts back tuples previously returned by [`Self::purge_subject`].
    pub fn restore(&mut self, purged: PurgedRules) {
        self.policies.extend(purged.policies);
        self.groupings.extend(purged.groupings);
    }

    /// Rewrites every occurrence of `old` as a subject to `new`.
    ///
    /// Grouping tuples that would become self-referencing are dropped.
    pub fn rename_subject(&mut self, old: &str, new: &str) {
        let purged = self.purge_subject(old);

        for rule in purged.policies {
            self.policies.insert(rule.with_subject(new));
        }

        for rule in purged.groupings {
            let renamed = rule.renamed(old, new);
            if renamed.user() != renamed.role() {
                self.groupings.insert(renamed);
            }
        }
    }

    /// Returns every permission tuple.
    #[must_use]
    pub fn policies(&self) -> Vec<PolicyRule> {
        self.policies.iter().cloned().collect()
    }

    /// Returns every grouping tuple.
    #[must_use]
    pub fn groupings(&self) -> Vec<GroupingRule> {
        self.groupings.iter().cloned().collect()
    }
}
