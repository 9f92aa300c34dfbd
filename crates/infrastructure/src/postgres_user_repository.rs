//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use tierup_application::{NewUser, UserProfileUpdate, UserRecord, UserRepository};
use tierup_core::{AppError, AppResult};
use tierup_domain::{UserId, UserStatus};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    nickname: String,
    email: String,
    phone: String,
    avatar: String,
    status: i16,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            password_hash: row.password_hash,
            nickname: row.nickname,
            email: row.email,
            phone: row.phone,
            avatar: row.avatar,
            status: UserStatus::from_flag(row.status),
        }
    }
}

mod account;
mod lookup;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_username_impl(username).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        self.create_impl(user).await
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserProfileUpdate,
    ) -> AppResult<UserRecord> {
        self.update_profile_impl(user_id, update).await
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.update_password_impl(user_id, password_hash).await
    }
}

fn unique_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        let message = match database_error.constraint() {
            Some(constraint) if constraint.contains("email") => "email already exists",
            Some(constraint) if constraint.contains("username") => "username already exists",
            _ => "user already exists",
        };
        return AppError::Conflict(message.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
