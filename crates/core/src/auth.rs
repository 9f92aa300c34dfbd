use serde::{Deserialize, Serialize};

/// Caller identity resolved from a validated identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSubject {
    subject_id: i64,
    display_name: String,
}

impl AuthenticatedSubject {
    /// Creates an authenticated subject from token claims.
    #[must_use]
    pub fn new(subject_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            subject_id,
            display_name: display_name.into(),
        }
    }

    /// Returns the numeric subject identifier.
    #[must_use]
    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    /// Returns the display name carried in the token.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the subject string presented to the policy engine.
    #[must_use]
    pub fn policy_subject(&self) -> String {
        self.subject_id.to_string()
    }
}
