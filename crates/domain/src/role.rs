use serde::{Deserialize, Serialize};
use tierup_core::{AppError, AppResult};

/// Numeric identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from a stored value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Minimum role name length.
pub const ROLE_NAME_MIN_LENGTH: usize = 2;

/// Maximum role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 50;

/// Maximum role display name length.
pub const ROLE_DISPLAY_NAME_MAX_LENGTH: usize = 100;

/// Maximum role description length.
pub const ROLE_DESCRIPTION_MAX_LENGTH: usize = 200;

/// Unique role name, used as the role's subject in the policy store.
///
/// Must not parse as an integer so it can never collide with a user subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let char_count = trimmed.chars().count();

        if !(ROLE_NAME_MIN_LENGTH..=ROLE_NAME_MAX_LENGTH).contains(&char_count) {
            return Err(AppError::Validation(format!(
                "role name must be between {ROLE_NAME_MIN_LENGTH} and {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "role name must not contain whitespace".to_owned(),
            ));
        }

        if trimmed.parse::<i64>().is_ok() {
            return Err(AppError::Validation(
                "role name must not be numeric".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the validated role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique name; join key into the policy store.
    pub name: RoleName,
    /// Human readable name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::RoleName;

    #[test]
    fn role_name_is_trimmed() {
        let name = RoleName::new(" editor ");
        assert_eq!(name.map(String::from).unwrap_or_default(), "editor");
    }

    #[test]
    fn numeric_role_name_is_rejected() {
        assert!(RoleName::new("42").is_err());
    }

    #[test]
    fn role_name_length_is_bounded() {
        assert!(RoleName::new("a").is_err());
        assert!(RoleName::new("a".repeat(51)).is_err());
    }
}
