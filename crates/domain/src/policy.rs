//! Policy tuples and the matching rules applied during enforcement.
//!
//! Resource patterns support:
//! - exact paths (`/api/v1/roles`);
//! - `*` on its own, matching every path;
//! - a trailing `*` segment matching one or more remaining segments, the
//!   first of which must be non-empty (`/api/v1/role/*` matches
//!   `/api/v1/role/7` and `/api/v1/role/7/x`, not `/api/v1/role` or
//!   `/api/v1/role/`);
//! - `:name` or `{name}` segments, and `*` in any other position, matching
//!   exactly one non-empty segment.
//!
//! Actions compare case-insensitively; `*` matches any action.

use serde::{Deserialize, Serialize};
use tierup_core::{AppError, AppResult, NonEmptyString};

/// Wildcard accepted for whole-path resources and actions.
pub const WILDCARD: &str = "*";

/// Longest accepted subject, grouping user or grouping role.
pub const POLICY_SUBJECT_MAX_LENGTH: usize = 100;
/// Longest accepted resource pattern.
pub const POLICY_RESOURCE_MAX_LENGTH: usize = 255;
/// Longest accepted action.
pub const POLICY_ACTION_MAX_LENGTH: usize = 16;

/// Permission tuple `(subject, resource, action)` expressing a grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyRule {
    subject: String,
    resource: String,
    action: String,
}

impl PolicyRule {
    /// Creates a normalised permission tuple.
    ///
    /// Subject and resource are trimmed, the resource must be `*` or start
    /// with `/`, the action is upper-cased.
    pub fn new(
        subject: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> AppResult<Self> {
        let subject = NonEmptyString::new(subject)
            .map_err(|_| AppError::Validation("policy subject must not be empty".to_owned()))?;
        ensure_max_length("policy subject", subject.as_str(), POLICY_SUBJECT_MAX_LENGTH)?;
        let resource = normalize_resource(resource.into())?;
        let action = normalize_action(action.into())?;

        Ok(Self {
            subject: subject.into(),
            resource,
            action,
        })
    }

    /// Returns the granted subject (role name or user id string).
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the resource path pattern.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the upper-cased action.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns the same grant held by another subject.
    #[must_use]
    pub fn with_subject(&self, subject: &str) -> Self {
        Self {
            subject: subject.to_owned(),
            resource: self.resource.clone(),
            action: self.action.clone(),
        }
    }

    /// Returns whether this grant covers the requested resource and action.
    #[must_use]
    pub fn grants(&self, resource: &str, action: &str) -> bool {
        action_matches(&self.action, action) && resource_matches(&self.resource, resource)
    }
}

/// Grouping tuple `(user, role)`: `user` inherits every grant of `role`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupingRule {
    user: String,
    role: String,
}

impl GroupingRule {
    /// Creates a grouping tuple. Both sides are trimmed and must differ.
    pub fn new(user: impl Into<String>, role: impl Into<String>) -> AppResult<Self> {
        let user = NonEmptyString::new(user)
            .map_err(|_| AppError::Validation("grouping user must not be empty".to_owned()))?;
        let role = NonEmptyString::new(role)
            .map_err(|_| AppError::Validation("grouping role must not be empty".to_owned()))?;
        ensure_max_length("grouping user", user.as_str(), POLICY_SUBJECT_MAX_LENGTH)?;
        ensure_max_length("grouping role", role.as_str(), POLICY_SUBJECT_MAX_LENGTH)?;

        if user == role {
            return Err(AppError::Validation(format!(
                "subject '{}' cannot be grouped into itself",
                user.as_str()
            )));
        }

        Ok(Self {
            user: user.into(),
            role: role.into(),
        })
    }

    /// Returns the inheriting subject.
    #[must_use]
    pub fn user(&self) -> &str {
        self.user.as_str()
    }

    /// Returns the inherited role subject.
    #[must_use]
    pub fn role(&self) -> &str {
        self.role.as_str()
    }

    pub(crate) fn renamed(&self, old: &str, new: &str) -> Self {
        let swap = |value: &str| {
            if value == old {
                new.to_owned()
            } else {
                value.to_owned()
            }
        };

        Self {
            user: swap(&self.user),
            role: swap(&self.role),
        }
    }
}

/// Field position used to filter permission tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyField {
    /// Position 0.
    Subject,
    /// Position 1.
    Resource,
    /// Position 2.
    Action,
}

impl PolicyField {
    pub(crate) fn value_of<'a>(&self, rule: &'a PolicyRule) -> &'a str {
        match self {
            Self::Subject => rule.subject(),
            Self::Resource => rule.resource(),
            Self::Action => rule.action(),
        }
    }
}

/// Field position used to filter grouping tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingField {
    /// Position 0.
    User,
    /// Position 1.
    Role,
}

impl GroupingField {
    pub(crate) fn value_of<'a>(&self, rule: &'a GroupingRule) -> &'a str {
        match self {
            Self::User => rule.user(),
            Self::Role => rule.role(),
        }
    }
}

fn ensure_max_length(field: &str, value: &str, max_length: usize) -> AppResult<()> {
    if value.chars().count() > max_length {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {max_length} characters"
        )));
    }
    Ok(())
}

fn normalize_resource(value: String) -> AppResult<String> {
    let trimmed = value.trim();
    ensure_max_length("policy resource", trimmed, POLICY_RESOURCE_MAX_LENGTH)?;
    if trimmed == WILDCARD {
        return Ok(trimmed.to_owned());
    }

    if !trimmed.starts_with('/') {
        return Err(AppError::Validation(format!(
            "policy resource '{trimmed}' must start with '/' or be '*'"
        )));
    }

    Ok(trimmed.to_owned())
}

fn normalize_action(value: String) -> AppResult<String> {
    let trimmed = value.trim();
    ensure_max_length("policy action", trimmed, POLICY_ACTION_MAX_LENGTH)?;
    if trimmed == WILDCARD {
        return Ok(trimmed.to_owned());
    }

    if trimmed.is_empty() || !trimmed.chars().all(|character| character.is_ascii_alphabetic()) {
        return Err(AppError::Validation(format!(
            "policy action '{trimmed}' must be an HTTP method or '*'"
        )));
    }

    Ok(trimmed.to_ascii_uppercase())
}

/// Returns whether `action` satisfies the stored action pattern.
#[must_use]
pub fn action_matches(pattern: &str, action: &str) -> bool {
    pattern == WILDCARD || pattern.eq_ignore_ascii_case(action)
}

/// Returns whether `path` satisfies the stored resource pattern.
#[must_use]
pub fn resource_matches(pattern: &str, path: &str) -> bool {
    if pattern == WILDCARD || pattern == path {
        return true;
    }

    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    let last_index = pattern_segments.len() - 1;

    for (index, pattern_segment) in pattern_segments.iter().enumerate() {
        if index == last_index && *pattern_segment == WILDCARD && index > 0 {
            return path_segments
                .get(index)
                .is_some_and(|segment| !segment.is_empty());
        }

        let Some(path_segment) = path_segments.get(index) else {
            return false;
        };

        if is_single_segment_placeholder(pattern_segment) {
            if path_segment.is_empty() {
                return false;
            }
            continue;
        }

        if pattern_segment != path_segment {
            return false;
        }
    }

    pattern_segments.len() == path_segments.len()
}

fn is_single_segment_placeholder(segment: &str) -> bool {
    segment == WILDCARD
        || (segment.len() > 1 && segment.starts_with(':'))
        || (segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}'))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use tierup_core::AppError;

    use super::{
        GroupingRule, POLICY_ACTION_MAX_LENGTH, POLICY_RESOURCE_MAX_LENGTH,
        POLICY_SUBJECT_MAX_LENGTH, PolicyRule, action_matches, resource_matches,
    };

    #[test]
    fn resource_pattern_table() {
        let cases = [
            ("/api/v1/roles", "/api/v1/roles", true),
            ("/api/v1/roles", "/api/v1/roles/", false),
            ("/api/v1/roles", "/api/v1/role", false),
            ("*", "/anything/at/all", true),
            ("/api/v1/role/*", "/api/v1/role/7", true),
            ("/api/v1/role/*", "/api/v1/role/7/users", true),
            ("/api/v1/role/*", "/api/v1/role", false),
            ("/api/v1/role/*", "/api/v1/role/", false),
            ("/api/v1/role/*", "/api/v1/roles", false),
            ("/api/v1/role/:id", "/api/v1/role/7", true),
            ("/api/v1/role/:id", "/api/v1/role/7/users", false),
            ("/api/v1/role/:id", "/api/v1/role/", false),
            ("/api/v1/user/{id}/role", "/api/v1/user/9/role", true),
            ("/api/v1/user/{id}/role", "/api/v1/user/9/roles", false),
            ("/api/v1/*/role", "/api/v1/user/role", true),
            ("/api/v1/*", "/api/v1/user/9/role", true),
        ];

        for (pattern, path, expected) in cases {
            assert_eq!(
                resource_matches(pattern, path),
                expected,
                "pattern '{pattern}' against '{path}'"
            );
        }
    }

    #[test]
    fn action_matching_is_case_insensitive() {
        assert!(action_matches("POST", "post"));
        assert!(action_matches("*", "DELETE"));
        assert!(!action_matches("GET", "POST"));
    }

    #[test]
    fn policy_rule_normalises_fields() {
        let rule = PolicyRule::new(" editor ", " /api/v1/role ", "post");
        let rule = rule.unwrap_or_else(|error| panic!("unexpected error: {error}"));
        assert_eq!(rule.subject(), "editor");
        assert_eq!(rule.resource(), "/api/v1/role");
        assert_eq!(rule.action(), "POST");
    }

    #[test]
    fn policy_rule_rejects_relative_resource() {
        assert!(PolicyRule::new("editor", "api/v1/role", "GET").is_err());
        assert!(PolicyRule::new("editor", "/api/v1/role", "G E T").is_err());
        assert!(PolicyRule::new("", "/api/v1/role", "GET").is_err());
    }

    #[test]
    fn grouping_rejects_self_reference() {
        assert!(GroupingRule::new("admin", "admin").is_err());
    }

    #[test]
    fn tuples_longer_than_their_columns_are_rejected() {
        let long_path = format!("/{}", "a".repeat(POLICY_RESOURCE_MAX_LENGTH));
        let long_action = "A".repeat(POLICY_ACTION_MAX_LENGTH + 1);
        let long_subject = "s".repeat(POLICY_SUBJECT_MAX_LENGTH + 1);

        assert!(matches!(
            PolicyRule::new("editor", long_path, "GET"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PolicyRule::new("editor", "/api/v1/role", long_action),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            PolicyRule::new(long_subject.as_str(), "/api/v1/role", "GET"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            GroupingRule::new("7", long_subject),
            Err(AppError::Validation(_))
        ));
        assert!(
            PolicyRule::new("editor", "/api/v1/role", "A".repeat(POLICY_ACTION_MAX_LENGTH)).is_ok()
        );
    }

    proptest! {
        #[test]
        fn literal_pattern_matches_itself(segments in proptest::collection::vec("[a-z0-9]{1,8}", 1..6)) {
            let path = format!("/{}", segments.join("/"));
            prop_assert!(resource_matches(&path, &path));
        }

        #[test]
        fn trailing_wildcard_matches_every_child(
            prefix in proptest::collection::vec("[a-z]{1,6}", 1..4),
            child in proptest::collection::vec("[a-z0-9]{1,6}", 1..4),
        ) {
            let pattern = format!("/{}/*", prefix.join("/"));
            let path = format!("/{}/{}", prefix.join("/"), child.join("/"));
            prop_assert!(resource_matches(&pattern, &path));
            let parent = format!("/{}", prefix.join("/"));
            prop_assert!(!resource_matches(&pattern, &parent));
        }
    }
}
