use tierup_core::{AppResult, AuthenticatedSubject};

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Signed identity token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded bearer token.
    pub token: String,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: i64,
}

/// Port for issuing and validating stateless identity tokens.
pub trait IdentityTokenService: Send + Sync {
    /// Issues a token for a subject. Fails only on signing misconfiguration.
    fn issue(&self, subject_id: i64, subject_name: &str) -> AppResult<IssuedToken>;

    /// Validates a token and returns the subject it names.
    ///
    /// Malformed, badly signed and expired tokens all fail with
    /// `AppError::Unauthorized`.
    fn validate(&self, token: &str) -> AppResult<AuthenticatedSubject>;
}
