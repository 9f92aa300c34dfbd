//! User account application service.
//!
//! Owns registration, login (token issue), own-profile reads and updates,
//! and password changes. Unknown usernames and wrong passwords produce the
//! same generic error.

mod login;
mod password;
mod profile;
mod registration;

use std::sync::Arc;

use tierup_domain::Role;

use crate::{
    IdentityTokenService, IssuedToken, PasswordHasher, RoleRepository, UserRecord, UserRepository,
};

/// Parameters for user registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserInput {
    /// Login name, 3-50 characters.
    pub username: String,
    /// Plaintext password, 6-100 characters.
    pub password: String,
    /// Optional nickname.
    pub nickname: String,
    /// Unique email address.
    pub email: String,
    /// Optional phone number.
    pub phone: String,
}

/// Parameters for an own-profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProfileInput {
    /// New nickname.
    pub nickname: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Bearer token for subsequent requests.
    pub token: IssuedToken,
    /// The signed-in user.
    pub user: UserRecord,
}

/// User record together with its relational roles.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// The user row.
    pub user: UserRecord,
    /// Roles associated through `user_roles`.
    pub roles: Vec<Role>,
}

/// Application service for user accounts.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_service: Arc<dyn IdentityTokenService>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_service: Arc<dyn IdentityTokenService>,
    ) -> Self {
        Self {
            user_repository,
            role_repository,
            password_hasher,
            token_service,
        }
    }
}
