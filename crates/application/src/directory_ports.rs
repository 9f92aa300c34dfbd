//! Ports for user and role persistence.

use async_trait::async_trait;

use tierup_core::AppResult;
use tierup_domain::{Page, PageRequest, Role, RoleId, RoleName, UserId, UserStatus};

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Display nickname.
    pub nickname: String,
    /// Unique email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Avatar URL.
    pub avatar: String,
    /// Whether the account may sign in.
    pub status: UserStatus,
}

/// Values for a user row about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Display nickname.
    pub nickname: String,
    /// Unique email address.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
}

/// Editable profile fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfileUpdate {
    /// New nickname.
    pub nickname: Option<String>,
    /// New email address, already validated.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Finds a user by login name.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Creates a user. Unique violations surface as `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Applies a profile update and returns the stored row.
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> AppResult<UserRecord>;

    /// Replaces the stored password hash.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;
}

/// Full set of writable role fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInput {
    /// Unique role name.
    pub name: RoleName,
    /// Human readable name.
    pub display_name: String,
    /// Free-form description.
    pub description: String,
}

/// Repository port for roles and the `user_roles` association.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by identifier.
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by its unique name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Creates a role. A taken name surfaces as `AppError::Conflict`.
    async fn create(&self, input: &RoleInput) -> AppResult<Role>;

    /// Replaces every writable field of a role.
    async fn update(&self, role_id: RoleId, input: &RoleInput) -> AppResult<Role>;

    /// Deletes a role and its associations. Returns `false` if absent.
    async fn delete(&self, role_id: RoleId) -> AppResult<bool>;

    /// Lists roles ordered by identifier.
    async fn list(&self, page: PageRequest) -> AppResult<Page<Role>>;

    /// Lists the roles associated with a user.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Associates a user with a role. Returns `false` if already associated.
    async fn add_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Removes an association. Returns `false` if it was absent.
    async fn remove_user_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;
}
